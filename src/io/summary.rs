use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::caller::QualityFlag;
use crate::clinical::RiskCategory;
use crate::ctx::Ctx;
use crate::schema::v1::{BatchSummary, SampleErrorEntry};

pub fn build_batch_summary(ctx: &Ctx) -> BatchSummary {
    let count = |flag: QualityFlag| {
        ctx.quality
            .iter()
            .filter(|q| q.quality_flag == flag)
            .count() as u64
    };
    let mut risk_counts: BTreeMap<String, u64> = RiskCategory::ALL
        .iter()
        .map(|r| (r.as_str().to_string(), 0))
        .collect();
    for a in &ctx.assessments {
        *risk_counts
            .entry(a.risk_category.as_str().to_string())
            .or_default() += 1;
    }
    BatchSummary {
        total: ctx.sample_ids().len() as u64,
        passed: count(QualityFlag::Pass),
        degraded: count(QualityFlag::Warning),
        failed: count(QualityFlag::Fail),
        fallback_used: ctx.quality.iter().filter(|q| q.fallback_used).count() as u64,
        risk_counts,
        threshold_version: ctx.active_thresholds.as_ref().map_or(0, |t| t.version),
        sample_errors: ctx
            .sample_errors
            .iter()
            .map(|e| SampleErrorEntry {
                sample_id: e.sample_id.clone(),
                message: e.message.clone(),
            })
            .collect(),
    }
}

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let set = ctx
        .active_thresholds
        .as_ref()
        .context("active thresholds missing")?;
    let source = ctx.threshold_source.map_or("unknown", |s| s.as_str());
    let summary = build_batch_summary(ctx);

    let mut out = String::new();
    out.push_str(&format!("kira-smncnv v{}\n", version));
    out.push_str(&format!(
        "Samples: {} (pass={}, warning={}, fail={}, fallback={})\n",
        summary.total, summary.passed, summary.degraded, summary.failed, summary.fallback_used
    ));
    out.push_str(&format!("Thresholds: v{} ({})\n", set.version, source));
    if let Some(perf) = &set.performance {
        out.push_str(&format!(
            "Calibration: MCC={:.4} F1={:.4} accuracy={:.4} (n={})\n",
            perf.mcc, perf.f1_macro, perf.accuracy, perf.n_samples
        ));
    }
    let risks: Vec<String> = summary
        .risk_counts
        .iter()
        .filter(|(_, n)| **n > 0)
        .map(|(k, n)| format!("{}={}", k, n))
        .collect();
    if risks.is_empty() {
        out.push_str("Risk: none\n");
    } else {
        out.push_str(&format!("Risk: {}\n", risks.join(", ")));
    }
    if !summary.sample_errors.is_empty() {
        out.push_str(&format!("Sample errors: {}\n", summary.sample_errors.len()));
        for e in &summary.sample_errors {
            out.push_str(&format!("- {}: {}\n", e.sample_id, e.message));
        }
    }

    Ok(out)
}
