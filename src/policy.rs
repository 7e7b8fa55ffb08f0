/// Tunable constants shared by normalization, fallback, calling and
/// interpretation. None of these are derived from a statistical model;
/// `default_v1` reproduces the values the lab pipeline has been run with.
#[derive(Debug, Clone)]
pub struct CallerPolicy {
    pub min_depth: f64,
    pub fallback_enabled: bool,
    pub fallback_fraction: f64,
    pub min_reference_samples: usize,
    pub min_training_samples: usize,
    pub confidence_floor: f64,
    pub unbounded_span: f64,
    pub defensive_confidence: f64,
    pub defensive_low_z: f64,
    pub quality_mean_weight: f64,
    pub quality_min_weight: f64,
    pub pass_score: f64,
    pub warning_score: f64,
    pub smn1_tolerance: f64,
    pub smn2_tolerance: f64,
    pub strong_evidence_depth: f64,
    pub strong_evidence_confidence: f64,
}

impl CallerPolicy {
    pub fn default_v1() -> Self {
        Self {
            min_depth: 10.0,
            fallback_enabled: true,
            fallback_fraction: 0.5,
            min_reference_samples: 3,
            min_training_samples: 10,
            confidence_floor: 0.1,
            unbounded_span: 2.0,
            defensive_confidence: 0.5,
            defensive_low_z: -3.0,
            quality_mean_weight: 0.7,
            quality_min_weight: 0.3,
            pass_score: 0.8,
            warning_score: 0.5,
            smn1_tolerance: 1.0,
            smn2_tolerance: 1.5,
            strong_evidence_depth: 20.0,
            strong_evidence_confidence: 0.5,
        }
    }
}

impl Default for CallerPolicy {
    fn default() -> Self {
        Self::default_v1()
    }
}
