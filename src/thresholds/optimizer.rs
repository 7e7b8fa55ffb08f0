use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use anyhow::Result;
use tracing::{info, warn};

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::math::metrics::{ConfusionMatrix, is_constant};
use crate::normalize::ZScoreRecord;
use crate::policy::CallerPolicy;
use crate::thresholds::truth::TruthLabel;
use crate::thresholds::{Performance, ThresholdSet, ThresholdStore, Thresholds};

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub sample_id: String,
    pub exon_id: String,
    pub z_score: f64,
    pub truth: u8,
}

/// Inner join of z-scores and labels on `(sample_id, exon_id)`, in z-score order.
pub fn pair_observations(zscores: &[ZScoreRecord], labels: &[TruthLabel]) -> Vec<Observation> {
    let by_key: HashMap<(&str, &str), u8> = labels
        .iter()
        .map(|l| ((l.sample_id.as_str(), l.exon_id.as_str()), l.copy_number))
        .collect();
    zscores
        .iter()
        .filter(|z| z.z_score.is_finite())
        .filter_map(|z| {
            by_key
                .get(&(z.sample_id.as_str(), z.exon_id.as_str()))
                .map(|&truth| Observation {
                    sample_id: z.sample_id.clone(),
                    exon_id: z.exon_id.clone(),
                    z_score: z.z_score,
                    truth,
                })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

impl GridAxis {
    pub fn value(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }
}

pub const HOMOZYGOUS_DELETION_AXIS: GridAxis = GridAxis {
    start: -3.5,
    step: 0.25,
    count: 8,
};
pub const HETEROZYGOUS_DELETION_AXIS: GridAxis = GridAxis {
    start: -2.0,
    step: 0.25,
    count: 6,
};
pub const NORMAL_HALF_WIDTH_AXIS: GridAxis = GridAxis {
    start: 1.0,
    step: 0.25,
    count: 6,
};
pub const HETEROZYGOUS_DUPLICATION_AXIS: GridAxis = GridAxis {
    start: 2.0,
    step: 0.25,
    count: 6,
};
pub const DUPLICATION_GAP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub rank: usize,
    pub thresholds: Thresholds,
}

/// Every grid point in canonical nested order, ranks assigned before any
/// ordering filter so they stay stable.
pub fn candidates() -> Vec<Candidate> {
    let mut out = Vec::with_capacity(
        HOMOZYGOUS_DELETION_AXIS.count
            * HETEROZYGOUS_DELETION_AXIS.count
            * NORMAL_HALF_WIDTH_AXIS.count
            * HETEROZYGOUS_DUPLICATION_AXIS.count,
    );
    let mut rank = 0usize;
    for a in 0..HOMOZYGOUS_DELETION_AXIS.count {
        for b in 0..HETEROZYGOUS_DELETION_AXIS.count {
            for c in 0..NORMAL_HALF_WIDTH_AXIS.count {
                for d in 0..HETEROZYGOUS_DUPLICATION_AXIS.count {
                    let w = NORMAL_HALF_WIDTH_AXIS.value(c);
                    let het_dup = HETEROZYGOUS_DUPLICATION_AXIS.value(d);
                    out.push(Candidate {
                        rank,
                        thresholds: Thresholds {
                            homozygous_deletion: HOMOZYGOUS_DELETION_AXIS.value(a),
                            heterozygous_deletion: HETEROZYGOUS_DELETION_AXIS.value(b),
                            normal_lower: -w,
                            normal_upper: w,
                            heterozygous_duplication: het_dup,
                            homozygous_duplication: het_dup + DUPLICATION_GAP,
                        },
                    });
                    rank += 1;
                }
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub rank: usize,
    pub mcc: f64,
    pub thresholds: Thresholds,
}

/// Greater MCC wins, equal MCC goes to the lower rank. Total over finite
/// scores, so any reduction order gives the same winner.
pub fn prefer(incumbent: Scored, challenger: Scored) -> Scored {
    match challenger.mcc.partial_cmp(&incumbent.mcc) {
        Some(Ordering::Greater) => challenger,
        Some(Ordering::Equal) if challenger.rank < incumbent.rank => challenger,
        _ => incumbent,
    }
}

fn score(candidate: &Candidate, obs: &[Observation]) -> Option<Scored> {
    if !candidate.thresholds.is_ordered() {
        return None;
    }
    let preds: Vec<u8> = obs
        .iter()
        .map(|o| candidate.thresholds.classify(o.z_score))
        .collect();
    if is_constant(&preds) {
        return None;
    }
    let cm = ConfusionMatrix::from_pairs(obs.iter().map(|o| o.truth).zip(preds));
    let mcc = cm.mcc();
    if !mcc.is_finite() {
        return None;
    }
    Some(Scored {
        rank: candidate.rank,
        mcc,
        thresholds: candidate.thresholds,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    InsufficientSamples { found: usize, required: usize },
    ConstantTruth,
    NoScorableCandidate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InsufficientSamples { found, required } => write!(
                f,
                "insufficient labelled samples ({} found, {} required)",
                found, required
            ),
            SkipReason::ConstantTruth => write!(f, "ground truth has a single copy-number class"),
            SkipReason::NoScorableCandidate => {
                write!(f, "no threshold candidate produced a defined MCC")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeOutcome {
    Optimized {
        thresholds: Thresholds,
        performance: Performance,
    },
    Skipped {
        reason: SkipReason,
    },
}

pub fn distinct_samples(obs: &[Observation]) -> usize {
    obs.iter()
        .map(|o| o.sample_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Exhaustive grid search for the MCC-maximizing threshold set.
pub fn optimize(
    obs: &[Observation],
    policy: &CallerPolicy,
    threads: usize,
) -> Result<OptimizeOutcome> {
    let n_samples = distinct_samples(obs);
    if n_samples < policy.min_training_samples {
        return Ok(OptimizeOutcome::Skipped {
            reason: SkipReason::InsufficientSamples {
                found: n_samples,
                required: policy.min_training_samples,
            },
        });
    }
    let truth: Vec<u8> = obs.iter().map(|o| o.truth).collect();
    if is_constant(&truth) {
        return Ok(OptimizeOutcome::Skipped {
            reason: SkipReason::ConstantTruth,
        });
    }

    let grid = candidates();

    #[cfg(feature = "mt")]
    let best = {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
        pool.install(|| {
            grid.par_iter()
                .filter_map(|c| score(c, obs))
                .reduce_with(prefer)
        })
    };

    #[cfg(not(feature = "mt"))]
    let best = {
        let _ = threads;
        grid.iter().filter_map(|c| score(c, obs)).reduce(prefer)
    };

    let Some(best) = best else {
        return Ok(OptimizeOutcome::Skipped {
            reason: SkipReason::NoScorableCandidate,
        });
    };
    let performance = evaluate(&best.thresholds, obs);
    info!(
        rank = best.rank,
        mcc = performance.mcc,
        accuracy = performance.accuracy,
        candidates = grid.len(),
        "threshold search finished"
    );
    Ok(OptimizeOutcome::Optimized {
        thresholds: best.thresholds,
        performance,
    })
}

pub fn evaluate(thresholds: &Thresholds, obs: &[Observation]) -> Performance {
    let cm = ConfusionMatrix::from_pairs(
        obs.iter()
            .map(|o| (o.truth, thresholds.classify(o.z_score))),
    );
    Performance {
        mcc: cm.mcc(),
        f1_macro: cm.f1_macro(),
        accuracy: cm.accuracy(),
        n_samples: distinct_samples(obs),
        n_observations: obs.len(),
        confusion_matrix: cm.to_rows(),
    }
}

pub fn should_retrain(current: Option<&ThresholdSet>, source_hash: &str, force: bool) -> bool {
    if force {
        return true;
    }
    match current {
        Some(set) => set.source_hash.as_deref() != Some(source_hash),
        None => true,
    }
}

/// Optimizes and, on success, appends the winner to the store. Skips are
/// logged and return `None`; store failures propagate.
pub fn retrain(
    store: &ThresholdStore,
    obs: &[Observation],
    source_hash: &str,
    policy: &CallerPolicy,
    threads: usize,
) -> Result<Option<ThresholdSet>> {
    match optimize(obs, policy, threads)? {
        OptimizeOutcome::Optimized {
            thresholds,
            performance,
        } => {
            let set = store.append(
                thresholds,
                Some(performance),
                Some(source_hash.to_string()),
                false,
            )?;
            Ok(Some(set))
        }
        OptimizeOutcome::Skipped { reason } => {
            warn!(reason = %reason, "threshold optimization skipped, keeping current set");
            Ok(None)
        }
    }
}
