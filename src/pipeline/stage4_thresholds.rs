use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::ctx::{Ctx, ThresholdSource};
use crate::pipeline::Stage;
use crate::thresholds::optimizer::{pair_observations, retrain, should_retrain};
use crate::thresholds::{ThresholdSet, ThresholdStore};

pub struct Stage4Thresholds;

impl Stage4Thresholds {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Thresholds {
    fn name(&self) -> &'static str {
        "stage4_thresholds"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let store = ThresholdStore::open(&ctx.threshold_dir);

        if let Some(truth) = &ctx.truth {
            // Corruption here aborts the run: retraining on top of a broken
            // history would mint a version with no valid predecessor.
            let current = store
                .load_current()
                .context("threshold store unusable for optimization")?;
            if should_retrain(current.as_ref(), &truth.source_hash, ctx.force_retrain) {
                let norm = ctx.normalization.as_ref().context("z-scores missing")?;
                let obs = pair_observations(&norm.zscores, &truth.labels);
                info!(observations = obs.len(), "retraining thresholds");
                if let Some(set) = retrain(
                    &store,
                    &obs,
                    &truth.source_hash,
                    &ctx.policy,
                    ctx.threads,
                )? {
                    info!(version = set.version, "thresholds_retrained");
                    ctx.active_thresholds = Some(set);
                    ctx.threshold_source = Some(ThresholdSource::Retrained);
                    return Ok(());
                }
                ctx.warnings
                    .push("threshold optimization skipped, current thresholds kept".to_string());
            } else {
                info!("ground truth unchanged since last calibration, not retraining");
            }
        }

        let (set, source) = match store.load_or_init() {
            Ok((set, true)) => (set, ThresholdSource::Initialized),
            Ok((set, false)) => (set, ThresholdSource::Stored),
            Err(err) => {
                let msg = format!(
                    "threshold store {} unusable, calling with built-in defaults: {:#}",
                    store.dir().display(),
                    err
                );
                warn!("{}", msg);
                ctx.warnings.push(msg);
                (ThresholdSet::builtin_default(), ThresholdSource::BuiltinDefault)
            }
        };
        info!(
            version = set.version,
            source = source.as_str(),
            "thresholds_ready"
        );
        ctx.active_thresholds = Some(set);
        ctx.threshold_source = Some(source);
        Ok(())
    }
}
