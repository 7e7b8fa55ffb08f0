use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::depth::{SampleType, load_depth_tsv};
use crate::fallback::load_region_counts;
use crate::pipeline::Stage;
use crate::thresholds::truth::load_truth;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let (batch, warnings) = load_depth_tsv(&ctx.depth_path)
            .with_context(|| format!("failed to load depth table {}", ctx.depth_path.display()))?;
        if batch.is_empty() {
            bail!("depth table {} has no usable rows", ctx.depth_path.display());
        }
        ctx.warnings.extend(warnings);
        info!(
            depth = %ctx.depth_path.display(),
            records = batch.records.len(),
            samples = batch.by_sample().len(),
            reference = batch.count_samples(SampleType::Reference),
            "depth_loaded"
        );
        ctx.batch = Some(batch);

        if let Some(path) = ctx.truth_path.clone() {
            match load_truth(&path) {
                Ok(truth) => {
                    info!(
                        truth = %path.display(),
                        labels = truth.labels.len(),
                        source_hash = %truth.source_hash,
                        "ground_truth_loaded"
                    );
                    ctx.truth = Some(truth);
                }
                Err(err) => {
                    let msg = format!(
                        "ground truth {} unusable, thresholds will not be retrained: {:#}",
                        path.display(),
                        err
                    );
                    warn!("{}", msg);
                    ctx.warnings.push(msg);
                }
            }
        }

        if let Some(path) = ctx.region_counts_path.clone() {
            match load_region_counts(&path) {
                Ok(counts) => {
                    info!(
                        region_counts = %path.display(),
                        entries = counts.len(),
                        "region_counts_loaded"
                    );
                    ctx.region_counts = counts;
                }
                Err(err) => {
                    let msg = format!(
                        "region counts {} unusable, fallback regions will report no reads: {:#}",
                        path.display(),
                        err
                    );
                    warn!("{}", msg);
                    ctx.warnings.push(msg);
                }
            }
        }

        Ok(())
    }
}
