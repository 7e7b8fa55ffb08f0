use serde::Serialize;

use crate::caller::CopyNumberCall;
use crate::fallback::{FallbackOutcome, RegionEvidence};
use crate::math::stats::{mean, min};
use crate::policy::CallerPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityFlag {
    Pass,
    Warning,
    Fail,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::Pass => "PASS",
            QualityFlag::Warning => "WARNING",
            QualityFlag::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleQuality {
    pub sample_id: String,
    pub quality_score: f64,
    pub quality_flag: QualityFlag,
    pub exon_consistency: bool,
    pub fallback_used: bool,
    pub fallback_regions: Vec<RegionEvidence>,
    pub qc_flags: Vec<String>,
}

/// Weighted blend of mean and worst per-exon confidence; 0 with no calls.
pub fn quality_score(confidences: &[f64], policy: &CallerPolicy) -> f64 {
    if confidences.is_empty() {
        return 0.0;
    }
    let score = policy.quality_mean_weight * mean(confidences)
        + policy.quality_min_weight * min(confidences);
    score.clamp(0.0, 1.0)
}

fn copy_number_of(calls: &[&CopyNumberCall], exon_id: &str) -> Option<f64> {
    calls
        .iter()
        .find(|c| c.exon_id == exon_id)
        .map(|c| c.copy_number as f64)
}

/// Exon 7 and exon 8 of each gene must agree within the gene's tolerance.
/// A missing critical call breaks consistency.
pub fn exon_consistency(calls: &[&CopyNumberCall], policy: &CallerPolicy) -> bool {
    let pairs = [
        ("SMN1_exon7", "SMN1_exon8", policy.smn1_tolerance),
        ("SMN2_exon7", "SMN2_exon8", policy.smn2_tolerance),
    ];
    pairs.iter().all(|(e7, e8, tol)| {
        match (copy_number_of(calls, e7), copy_number_of(calls, e8)) {
            (Some(a), Some(b)) => (a - b).abs() <= *tol,
            _ => false,
        }
    })
}

pub fn quality_flag(score: f64, consistent: bool, policy: &CallerPolicy) -> QualityFlag {
    if score >= policy.pass_score && consistent {
        QualityFlag::Pass
    } else if score >= policy.warning_score {
        QualityFlag::Warning
    } else {
        QualityFlag::Fail
    }
}

/// Fallback can only lower a flag: exhausted evidence fails the sample,
/// rescued samples are capped at WARNING.
pub fn apply_fallback(flag: QualityFlag, fallback: Option<&FallbackOutcome>) -> QualityFlag {
    match fallback {
        Some(f) if f.fallback_used && f.evidence.is_empty() => QualityFlag::Fail,
        Some(f) if f.fallback_used => flag.max(QualityFlag::Warning),
        _ => flag,
    }
}

pub fn assess_quality(
    sample_id: &str,
    calls: &[&CopyNumberCall],
    fallback: Option<&FallbackOutcome>,
    policy: &CallerPolicy,
) -> SampleQuality {
    let confidences: Vec<f64> = calls.iter().map(|c| c.confidence).collect();
    let score = quality_score(&confidences, policy);
    let consistent = exon_consistency(calls, policy);
    let flag = apply_fallback(quality_flag(score, consistent, policy), fallback);

    let mut qc_flags = fallback.map(|f| f.qc_flags.clone()).unwrap_or_default();
    if !consistent {
        qc_flags.push("EXON_INCONSISTENT".to_string());
    }
    SampleQuality {
        sample_id: sample_id.to_string(),
        quality_score: score,
        quality_flag: flag,
        exon_consistency: consistent,
        fallback_used: fallback.is_some_and(|f| f.fallback_used),
        fallback_regions: fallback.map(|f| f.evidence.clone()).unwrap_or_default(),
        qc_flags,
    }
}
