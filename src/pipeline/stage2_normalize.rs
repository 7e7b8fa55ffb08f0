use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::normalize::normalize_depth;
use crate::pipeline::Stage;

pub struct Stage2Normalize;

impl Stage2Normalize {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Normalize {
    fn name(&self) -> &'static str {
        "stage2_normalize"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let batch = ctx.batch.as_ref().context("depth batch missing")?;
        let norm = normalize_depth(batch, &ctx.policy);
        let degenerate = norm.stats.iter().filter(|s| s.degenerate).count();
        info!(
            zscores = norm.zscores.len(),
            exons = norm.stats.len(),
            degenerate,
            reference_fallback = norm.reference_fallback,
            "zscores_ready"
        );
        ctx.warnings.extend(norm.warnings.iter().cloned());
        ctx.normalization = Some(norm);
        Ok(())
    }
}
