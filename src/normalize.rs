use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::depth::{DepthBatch, ExonDepthRecord, SampleType};
use crate::math::stats::{mean, sample_std, z_score};
use crate::policy::CallerPolicy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreRecord {
    pub sample_id: String,
    pub exon_id: String,
    pub z_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExonNormStats {
    pub exon_id: String,
    pub ref_mean: f64,
    pub ref_std: f64,
    pub n_reference: usize,
    pub degenerate: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Normalization {
    pub zscores: Vec<ZScoreRecord>,
    pub stats: Vec<ExonNormStats>,
    /// True when too few reference samples forced the whole batch to act as
    /// the reference cohort.
    pub reference_fallback: bool,
    pub warnings: Vec<String>,
}

impl Normalization {
    pub fn zscores_for<'a>(&'a self, sample_id: &'a str) -> impl Iterator<Item = &'a ZScoreRecord> {
        self.zscores.iter().filter(move |z| z.sample_id == sample_id)
    }
}

/// Standardizes mean depth per exon against the reference cohort.
pub fn normalize_depth(batch: &DepthBatch, policy: &CallerPolicy) -> Normalization {
    let mut warnings = Vec::new();
    let n_reference = batch.count_samples(SampleType::Reference);
    let reference_fallback = n_reference < policy.min_reference_samples;
    if reference_fallback {
        let msg = format!(
            "only {} reference samples (< {}), normalizing against the full batch",
            n_reference, policy.min_reference_samples
        );
        warn!("{}", msg);
        warnings.push(msg);
    }

    let mut per_exon: BTreeMap<&str, Vec<&ExonDepthRecord>> = BTreeMap::new();
    for rec in &batch.records {
        per_exon.entry(rec.exon_id.as_str()).or_default().push(rec);
    }

    let mut zscores = Vec::with_capacity(batch.records.len());
    let mut stats = Vec::with_capacity(per_exon.len());
    for (exon_id, recs) in per_exon {
        let reference: Vec<f64> = recs
            .iter()
            .filter(|r| reference_fallback || r.sample_type == SampleType::Reference)
            .map(|r| r.mean_depth)
            .collect();
        let ref_mean = mean(&reference);
        let ref_std = sample_std(&reference);
        let degenerate = ref_std == 0.0;
        if degenerate {
            let msg = format!(
                "exon {} has zero reference variance ({} values), z set to 0",
                exon_id,
                reference.len()
            );
            warn!("{}", msg);
            warnings.push(msg);
        }

        for rec in recs {
            zscores.push(ZScoreRecord {
                sample_id: rec.sample_id.clone(),
                exon_id: exon_id.to_string(),
                z_score: z_score(rec.mean_depth, ref_mean, ref_std),
            });
        }
        stats.push(ExonNormStats {
            exon_id: exon_id.to_string(),
            ref_mean,
            ref_std,
            n_reference: reference.len(),
            degenerate,
        });
    }

    zscores.sort_by(|a, b| {
        a.sample_id
            .cmp(&b.sample_id)
            .then_with(|| a.exon_id.cmp(&b.exon_id))
    });

    info!(
        exons = stats.len(),
        zscores = zscores.len(),
        reference_fallback,
        "normalization_ready"
    );

    Normalization {
        zscores,
        stats,
        reference_fallback,
        warnings,
    }
}
