use anyhow::Result;
use tracing::info;

use crate::caller::{QualityFlag, assess_quality};
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage6Quality;

impl Stage6Quality {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Quality {
    fn name(&self) -> &'static str {
        "stage6_quality"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let mut quality = Vec::new();
        for sample_id in ctx.sample_ids() {
            let calls = ctx.calls_for(&sample_id);
            let fallback = ctx.fallback.get(&sample_id);
            quality.push(assess_quality(&sample_id, &calls, fallback, &ctx.policy));
        }
        let count = |flag: QualityFlag| quality.iter().filter(|q| q.quality_flag == flag).count();
        info!(
            pass = count(QualityFlag::Pass),
            warning = count(QualityFlag::Warning),
            fail = count(QualityFlag::Fail),
            "quality_ready"
        );
        ctx.quality = quality;
        Ok(())
    }
}
