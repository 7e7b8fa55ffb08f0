pub mod quality;

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::normalize::ZScoreRecord;
use crate::policy::CallerPolicy;
use crate::thresholds::{IntervalTable, ThresholdSet};

pub use quality::{QualityFlag, SampleQuality, assess_quality};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallBasis {
    Interval,
    Defensive,
}

impl CallBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallBasis::Interval => "interval",
            CallBasis::Defensive => "defensive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyNumberCall {
    pub sample_id: String,
    pub exon_id: String,
    pub z_score: f64,
    pub copy_number: u8,
    pub confidence: f64,
    pub call_basis: CallBasis,
}

/// Read-only view over one threshold set. Cheap to share across workers.
pub struct CopyNumberCaller<'a> {
    set: &'a ThresholdSet,
    table: IntervalTable,
    policy: &'a CallerPolicy,
}

impl<'a> CopyNumberCaller<'a> {
    pub fn new(set: &'a ThresholdSet, policy: &'a CallerPolicy) -> Self {
        Self {
            set,
            table: set.thresholds.interval_table(),
            policy,
        }
    }

    pub fn threshold_version(&self) -> u32 {
        self.set.version
    }

    /// Copy number, confidence and basis for one z-score. With an ordered set
    /// every finite z lands in a bucket and takes the `classify` copy number;
    /// non-finite z takes the defensive path.
    pub fn call_z(&self, z: f64) -> (u8, f64, CallBasis) {
        match self.table.find(z) {
            Some(bucket) => (
                self.set.thresholds.classify(z),
                bucket.confidence(z, self.policy),
                CallBasis::Interval,
            ),
            None => {
                let cn = if z < self.policy.defensive_low_z { 0 } else { 4 };
                debug!(z, cn, "z-score outside every interval, defensive call");
                (cn, self.policy.defensive_confidence, CallBasis::Defensive)
            }
        }
    }

    pub fn call(&self, record: &ZScoreRecord) -> CopyNumberCall {
        let (copy_number, confidence, call_basis) = self.call_z(record.z_score);
        CopyNumberCall {
            sample_id: record.sample_id.clone(),
            exon_id: record.exon_id.clone(),
            z_score: record.z_score,
            copy_number,
            confidence,
            call_basis,
        }
    }

    /// Calls grouped per sample; samples run in parallel, output is ordered by
    /// `(sample_id, exon_id)` regardless of scheduling.
    pub fn call_batch(&self, zscores: &[ZScoreRecord], threads: usize) -> Result<Vec<CopyNumberCall>> {
        let mut by_sample: BTreeMap<&str, Vec<&ZScoreRecord>> = BTreeMap::new();
        for z in zscores {
            by_sample.entry(z.sample_id.as_str()).or_default().push(z);
        }
        let groups: Vec<Vec<&ZScoreRecord>> = by_sample.into_values().collect();

        #[cfg(feature = "mt")]
        let per_sample: Vec<Vec<CopyNumberCall>> = {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
            pool.install(|| {
                groups
                    .par_iter()
                    .map(|g| g.iter().map(|z| self.call(z)).collect())
                    .collect()
            })
        };

        #[cfg(not(feature = "mt"))]
        let per_sample: Vec<Vec<CopyNumberCall>> = {
            let _ = threads;
            groups
                .iter()
                .map(|g| g.iter().map(|z| self.call(z)).collect())
                .collect()
        };

        let mut calls: Vec<CopyNumberCall> = per_sample.into_iter().flatten().collect();
        calls.sort_by(|a, b| {
            a.sample_id
                .cmp(&b.sample_id)
                .then_with(|| a.exon_id.cmp(&b.exon_id))
        });
        Ok(calls)
    }
}
