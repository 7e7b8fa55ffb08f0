use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::fallback::assess_sample;
use crate::pipeline::Stage;

pub struct Stage3Fallback;

impl Stage3Fallback {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Fallback {
    fn name(&self) -> &'static str {
        "stage3_fallback"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let batch = ctx.batch.as_ref().context("depth batch missing")?;
        let mut outcomes = BTreeMap::new();
        for (sample_id, records) in batch.by_sample() {
            let outcome = assess_sample(sample_id, &records, &ctx.policy, &ctx.region_counts);
            outcomes.insert(sample_id.to_string(), outcome);
        }
        let activated = outcomes.values().filter(|o| o.fallback_used).count();
        let exhausted = outcomes.values().filter(|o| o.exhausted()).count();
        info!(
            samples = outcomes.len(),
            activated,
            exhausted,
            enabled = ctx.policy.fallback_enabled,
            "fallback_ready"
        );
        ctx.fallback = outcomes;
        Ok(())
    }
}
