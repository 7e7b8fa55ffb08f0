use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMeta {
    pub depth_path: String,
    pub truth_path: Option<String>,
    pub region_counts_path: Option<String>,
    pub n_samples: u64,
    pub n_records: u64,
    pub n_reference: u64,
    pub reference_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExonNorm {
    pub exon_id: String,
    pub ref_mean: f64,
    pub ref_std: f64,
    pub n_reference: u64,
    pub degenerate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdValues {
    pub homozygous_deletion: f64,
    pub heterozygous_deletion: f64,
    pub normal_lower: f64,
    pub normal_upper: f64,
    pub heterozygous_duplication: f64,
    pub homozygous_duplication: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdPerformance {
    pub mcc: f64,
    pub f1_macro: f64,
    pub accuracy: f64,
    pub n_samples: u64,
    pub n_observations: u64,
    pub confusion_matrix: Vec<Vec<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdInfo {
    pub version: u32,
    pub source: String,
    pub is_initial: bool,
    pub created_at: String,
    pub source_hash: Option<String>,
    pub values: ThresholdValues,
    pub performance: Option<ThresholdPerformance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExonCall {
    pub exon_id: String,
    pub z_score: f64,
    pub copy_number: u8,
    pub confidence: f64,
    pub call_basis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackEvidence {
    pub region_id: String,
    pub read_count: u64,
    pub mean_depth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quality {
    pub quality_score: f64,
    pub quality_flag: String,
    pub exon_consistency: bool,
    pub fallback_used: bool,
    pub fallback_regions: Vec<FallbackEvidence>,
    pub qc_flags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinical {
    pub gene_a_copy_number: f64,
    pub gene_b_copy_number: f64,
    pub risk_category: String,
    pub severity_prediction: String,
    pub confidence_tier: String,
    pub evidence_strength: String,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleReport {
    pub sample_id: String,
    pub sample_type: String,
    pub calls: Vec<ExonCall>,
    pub quality: Option<Quality>,
    pub clinical: Option<Clinical>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleErrorEntry {
    pub sample_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: u64,
    pub passed: u64,
    pub degraded: u64,
    pub failed: u64,
    pub fallback_used: u64,
    pub risk_counts: BTreeMap<String, u64>,
    pub threshold_version: u32,
    pub sample_errors: Vec<SampleErrorEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmnCnvV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input_meta: InputMeta,
    pub thresholds: Option<ThresholdInfo>,
    pub normalization: Vec<ExonNorm>,
    pub samples: Vec<SampleReport>,
    pub summary: BatchSummary,
    pub warnings: Vec<String>,
}

impl SmnCnvV1 {
    pub fn empty(tool_version: &str, depth_path: &str) -> Self {
        Self {
            tool: "kira-smncnv".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            input_meta: InputMeta {
                depth_path: depth_path.to_string(),
                truth_path: None,
                region_counts_path: None,
                n_samples: 0,
                n_records: 0,
                n_reference: 0,
                reference_fallback: false,
            },
            thresholds: None,
            normalization: Vec::new(),
            samples: Vec::new(),
            summary: BatchSummary::default(),
            warnings: Vec::new(),
        }
    }
}
