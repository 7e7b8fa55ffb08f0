use anyhow::{Result, anyhow};
use serde::Serialize;

use crate::caller::{CopyNumberCall, QualityFlag};
use crate::depth::{CRITICAL_EXONS, ExonDepthRecord};
use crate::policy::CallerPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Affected,
    Carrier,
    Normal,
    Uncertain,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Affected,
        RiskCategory::Carrier,
        RiskCategory::Normal,
        RiskCategory::Uncertain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Affected => "AFFECTED",
            RiskCategory::Carrier => "CARRIER",
            RiskCategory::Normal => "NORMAL",
            RiskCategory::Uncertain => "UNCERTAIN",
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            RiskCategory::Affected => "SMN1 absent on both exons, consistent with SMA affected status",
            RiskCategory::Carrier => "single SMN1 copy, consistent with SMA carrier status",
            RiskCategory::Normal => "two SMN1 copies, no SMA risk indicated",
            RiskCategory::Uncertain => "SMN1 copy number above two, atypical pattern",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Severe,
    Intermediate,
    MildModerate,
    Mild,
    NotApplicable,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Severe => "Severe (SMA Type I)",
            Severity::Intermediate => "Intermediate (SMA Type II)",
            Severity::MildModerate => "Mild-Moderate (SMA Type III)",
            Severity::Mild => "Mild (SMA Type IV)",
            Severity::NotApplicable => "Not applicable",
        }
    }
}

/// Upper bounds (exclusive) on the SMN2 average; the last band is open.
pub const SEVERITY_BANDS: [(f64, Severity); 4] = [
    (1.5, Severity::Severe),
    (2.5, Severity::Intermediate),
    (3.5, Severity::MildModerate),
    (f64::INFINITY, Severity::Mild),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvidenceStrength {
    Strong,
    Moderate,
    Limited,
    Weak,
}

impl EvidenceStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceStrength::Strong => "STRONG",
            EvidenceStrength::Moderate => "MODERATE",
            EvidenceStrength::Limited => "LIMITED",
            EvidenceStrength::Weak => "WEAK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "HIGH",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::Low => "LOW",
            ConfidenceTier::VeryLow => "VERY_LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalAssessment {
    pub sample_id: String,
    pub gene_a_copy_number: f64,
    pub gene_b_copy_number: f64,
    pub risk_category: RiskCategory,
    pub severity_prediction: Severity,
    pub confidence_tier: ConfidenceTier,
    pub evidence_strength: EvidenceStrength,
    pub interpretation: String,
}

pub fn risk_category(smn1_avg: f64) -> RiskCategory {
    if smn1_avg < 0.5 {
        RiskCategory::Affected
    } else if smn1_avg < 1.5 {
        RiskCategory::Carrier
    } else if smn1_avg < 2.5 {
        RiskCategory::Normal
    } else {
        RiskCategory::Uncertain
    }
}

pub fn predict_severity(risk: RiskCategory, smn2_avg: f64) -> Severity {
    if risk != RiskCategory::Affected {
        return Severity::NotApplicable;
    }
    SEVERITY_BANDS
        .iter()
        .find(|(upper, _)| smn2_avg < *upper)
        .map(|(_, s)| *s)
        .unwrap_or(Severity::Mild)
}

/// Counts critical exons with detected reads, adequate depth and a confident
/// call.
pub fn evidence_strength(
    calls: &[&CopyNumberCall],
    depth: &[&ExonDepthRecord],
    policy: &CallerPolicy,
) -> EvidenceStrength {
    let supported = CRITICAL_EXONS
        .iter()
        .filter(|exon| {
            let rec = depth.iter().find(|r| r.exon_id == **exon);
            let call = calls.iter().find(|c| c.exon_id == **exon);
            match (rec, call) {
                (Some(r), Some(c)) => {
                    r.reads_detected
                        && r.mean_depth >= policy.strong_evidence_depth
                        && c.confidence >= policy.strong_evidence_confidence
                }
                _ => false,
            }
        })
        .count();
    match supported {
        4.. => EvidenceStrength::Strong,
        3 => EvidenceStrength::Moderate,
        2 => EvidenceStrength::Limited,
        _ => EvidenceStrength::Weak,
    }
}

pub fn confidence_tier(flag: QualityFlag, evidence: EvidenceStrength) -> ConfidenceTier {
    use EvidenceStrength::*;
    match (flag, evidence) {
        (QualityFlag::Pass, Strong) => ConfidenceTier::High,
        (QualityFlag::Pass | QualityFlag::Warning, Strong | Moderate) => ConfidenceTier::Medium,
        (QualityFlag::Pass | QualityFlag::Warning, Limited) => ConfidenceTier::Low,
        _ => ConfidenceTier::VeryLow,
    }
}

fn exon_copy_number(calls: &[&CopyNumberCall], exon_id: &str) -> Result<f64> {
    calls
        .iter()
        .find(|c| c.exon_id == exon_id)
        .map(|c| c.copy_number as f64)
        .ok_or_else(|| anyhow!("missing call for {}", exon_id))
}

/// Combines the four critical calls of one sample into a risk assessment.
/// Fails when any critical call is missing.
pub fn interpret(
    sample_id: &str,
    calls: &[&CopyNumberCall],
    depth: &[&ExonDepthRecord],
    flag: QualityFlag,
    policy: &CallerPolicy,
) -> Result<ClinicalAssessment> {
    let smn1 = (exon_copy_number(calls, "SMN1_exon7")? + exon_copy_number(calls, "SMN1_exon8")?)
        / 2.0;
    let smn2 = (exon_copy_number(calls, "SMN2_exon7")? + exon_copy_number(calls, "SMN2_exon8")?)
        / 2.0;
    let risk = risk_category(smn1);
    let severity = predict_severity(risk, smn2);
    let evidence = evidence_strength(calls, depth, policy);
    let mut interpretation = risk.interpretation().to_string();
    if severity != Severity::NotApplicable {
        interpretation.push_str(&format!("; predicted {}", severity.as_str()));
    }
    Ok(ClinicalAssessment {
        sample_id: sample_id.to_string(),
        gene_a_copy_number: smn1,
        gene_b_copy_number: smn2,
        risk_category: risk,
        severity_prediction: severity,
        confidence_tier: confidence_tier(flag, evidence),
        evidence_strength: evidence,
        interpretation,
    })
}
