mod probe;
mod regions;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::depth::{CRITICAL_EXONS, ExonDepthRecord, Gene};
use crate::policy::CallerPolicy;

pub use probe::{RegionProbe, StaticRegionCounts, load_region_counts, parse_region_counts};
pub use regions::{FALLBACK_REGIONS, FallbackRegion, RegionScope, find_region, regions_to_try};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionEvidence {
    pub region_id: String,
    pub read_count: u64,
    pub mean_depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExonProblem {
    NoReads,
    LowCoverage,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackOutcome {
    pub sample_id: String,
    pub problematic: Vec<(String, ExonProblem)>,
    pub fallback_used: bool,
    pub evidence: Vec<RegionEvidence>,
    pub qc_flags: Vec<String>,
}

impl FallbackOutcome {
    pub fn exhausted(&self) -> bool {
        self.fallback_used && self.evidence.is_empty()
    }
}

pub fn classify_exon(record: Option<&ExonDepthRecord>, min_depth: f64) -> Option<ExonProblem> {
    match record {
        None => Some(ExonProblem::Missing),
        Some(r) if !r.reads_detected => Some(ExonProblem::NoReads),
        Some(r) if r.mean_depth < min_depth => Some(ExonProblem::LowCoverage),
        Some(_) => None,
    }
}

pub fn needs_fallback(problematic_count: usize, policy: &CallerPolicy) -> bool {
    problematic_count as f64 / CRITICAL_EXONS.len() as f64 >= policy.fallback_fraction
}

/// Decides whether a sample's primary exons can carry the call and, when they
/// cannot, collects auxiliary region evidence. Never alters copy numbers.
pub fn assess_sample(
    sample_id: &str,
    records: &[&ExonDepthRecord],
    policy: &CallerPolicy,
    probe: &dyn RegionProbe,
) -> FallbackOutcome {
    let mut problematic = Vec::new();
    let mut qc_flags = Vec::new();
    for exon_id in CRITICAL_EXONS {
        let rec = records.iter().copied().find(|r| r.exon_id == exon_id);
        if let Some(problem) = classify_exon(rec, policy.min_depth) {
            qc_flags.push(match problem {
                ExonProblem::NoReads => format!("NO_READS:{}", exon_id),
                ExonProblem::LowCoverage => format!("LOW_COVERAGE:{}", exon_id),
                ExonProblem::Missing => format!("MISSING:{}", exon_id),
            });
            problematic.push((exon_id.to_string(), problem));
        }
    }

    let active = policy.fallback_enabled && needs_fallback(problematic.len(), policy);
    if !active {
        return FallbackOutcome {
            sample_id: sample_id.to_string(),
            problematic,
            fallback_used: false,
            evidence: Vec::new(),
            qc_flags,
        };
    }

    let genes: Vec<Gene> = Gene::ALL
        .into_iter()
        .filter(|g| {
            problematic
                .iter()
                .any(|(exon, _)| Gene::of_exon(exon) == Some(*g))
        })
        .collect();
    info!(
        sample_id,
        problematic = problematic.len(),
        "primary exon coverage insufficient, probing fallback regions"
    );

    let mut evidence = Vec::new();
    for region in regions_to_try(&genes) {
        match probe.probe(sample_id, region) {
            Ok(ev) if ev.read_count > 0 => {
                qc_flags.push(format!(
                    "FALLBACK_SUCCESS:{} ({} reads)",
                    ev.region_id, ev.read_count
                ));
                evidence.push(ev);
            }
            Ok(_) => debug!(sample_id, region = region.region_id, "fallback region has no reads"),
            Err(err) => warn!(
                sample_id,
                region = region.region_id,
                error = %err,
                "fallback probe failed"
            ),
        }
    }
    if evidence.is_empty() {
        qc_flags.push("FALLBACK_EXHAUSTED".to_string());
    }

    FallbackOutcome {
        sample_id: sample_id.to_string(),
        problematic,
        fallback_used: true,
        evidence,
        qc_flags,
    }
}
