use anyhow::{Context, Result};
use tracing::info;

use crate::caller::{CallBasis, CopyNumberCaller};
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage5Call;

impl Stage5Call {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Call {
    fn name(&self) -> &'static str {
        "stage5_call"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let norm = ctx.normalization.as_ref().context("z-scores missing")?;
        let set = ctx
            .active_thresholds
            .as_ref()
            .context("active thresholds missing")?;
        let caller = CopyNumberCaller::new(set, &ctx.policy);
        let calls = caller.call_batch(&norm.zscores, ctx.threads)?;
        let defensive = calls
            .iter()
            .filter(|c| c.call_basis == CallBasis::Defensive)
            .count();
        info!(
            calls = calls.len(),
            defensive,
            threshold_version = caller.threshold_version(),
            "calls_ready"
        );
        ctx.calls = calls;
        Ok(())
    }
}
