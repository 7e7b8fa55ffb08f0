use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::depth::SampleType;
use crate::io::summary::build_batch_summary;
use crate::schema::v1::{
    Clinical, ExonCall, ExonNorm, FallbackEvidence, Quality, SampleReport, SmnCnvV1,
    ThresholdInfo, ThresholdPerformance, ThresholdValues,
};

pub fn build_report(ctx: &Ctx) -> Result<SmnCnvV1> {
    let batch = ctx.batch.as_ref().context("depth batch missing")?;
    let mut report = SmnCnvV1::empty(
        env!("CARGO_PKG_VERSION"),
        &ctx.depth_path.display().to_string(),
    );

    report.input_meta.truth_path = ctx.truth_path.as_ref().map(|p| p.display().to_string());
    report.input_meta.region_counts_path = ctx
        .region_counts_path
        .as_ref()
        .map(|p| p.display().to_string());
    report.input_meta.n_samples = batch.by_sample().len() as u64;
    report.input_meta.n_records = batch.records.len() as u64;
    report.input_meta.n_reference = batch.count_samples(SampleType::Reference) as u64;

    if let Some(norm) = &ctx.normalization {
        report.input_meta.reference_fallback = norm.reference_fallback;
        report.normalization = norm
            .stats
            .iter()
            .map(|s| ExonNorm {
                exon_id: s.exon_id.clone(),
                ref_mean: s.ref_mean,
                ref_std: s.ref_std,
                n_reference: s.n_reference as u64,
                degenerate: s.degenerate,
            })
            .collect();
    }

    report.thresholds = ctx.active_thresholds.as_ref().map(|set| {
        let t = &set.thresholds;
        ThresholdInfo {
            version: set.version,
            source: ctx
                .threshold_source
                .map_or("unknown", |s| s.as_str())
                .to_string(),
            is_initial: set.is_initial,
            created_at: set.created_at.to_rfc3339(),
            source_hash: set.source_hash.clone(),
            values: ThresholdValues {
                homozygous_deletion: t.homozygous_deletion,
                heterozygous_deletion: t.heterozygous_deletion,
                normal_lower: t.normal_lower,
                normal_upper: t.normal_upper,
                heterozygous_duplication: t.heterozygous_duplication,
                homozygous_duplication: t.homozygous_duplication,
            },
            performance: set.performance.as_ref().map(|p| ThresholdPerformance {
                mcc: p.mcc,
                f1_macro: p.f1_macro,
                accuracy: p.accuracy,
                n_samples: p.n_samples as u64,
                n_observations: p.n_observations as u64,
                confusion_matrix: p.confusion_matrix.clone(),
            }),
        }
    });

    let types = batch.sample_types();
    for sample_id in ctx.sample_ids() {
        let calls = ctx
            .calls_for(&sample_id)
            .into_iter()
            .map(|c| ExonCall {
                exon_id: c.exon_id.clone(),
                z_score: c.z_score,
                copy_number: c.copy_number,
                confidence: c.confidence,
                call_basis: c.call_basis.as_str().to_string(),
            })
            .collect();
        let quality = ctx.quality_for(&sample_id).map(|q| Quality {
            quality_score: q.quality_score,
            quality_flag: q.quality_flag.as_str().to_string(),
            exon_consistency: q.exon_consistency,
            fallback_used: q.fallback_used,
            fallback_regions: q
                .fallback_regions
                .iter()
                .map(|r| FallbackEvidence {
                    region_id: r.region_id.clone(),
                    read_count: r.read_count,
                    mean_depth: r.mean_depth,
                })
                .collect(),
            qc_flags: q.qc_flags.clone(),
        });
        let clinical = ctx.assessment_for(&sample_id).map(|a| Clinical {
            gene_a_copy_number: a.gene_a_copy_number,
            gene_b_copy_number: a.gene_b_copy_number,
            risk_category: a.risk_category.as_str().to_string(),
            severity_prediction: a.severity_prediction.as_str().to_string(),
            confidence_tier: a.confidence_tier.as_str().to_string(),
            evidence_strength: a.evidence_strength.as_str().to_string(),
            interpretation: a.interpretation.clone(),
        });
        let error = ctx
            .sample_errors
            .iter()
            .find(|e| e.sample_id == sample_id)
            .map(|e| e.message.clone());
        report.samples.push(SampleReport {
            sample_type: types
                .get(sample_id.as_str())
                .map_or("unknown", |t| t.as_str())
                .to_string(),
            sample_id,
            calls,
            quality,
            clinical,
            error,
        });
    }

    report.summary = build_batch_summary(ctx);
    report.warnings = ctx.warnings.clone();
    Ok(report)
}

pub fn write_json(path: &Path, ctx: &Ctx) -> Result<()> {
    let report = build_report(ctx)?;
    crate::io::write_json(path, &report)
}
