use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clinical::interpret;
use crate::ctx::{Ctx, SampleError};
use crate::pipeline::Stage;

pub struct Stage7Clinical;

impl Stage7Clinical {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage7Clinical {
    fn name(&self) -> &'static str {
        "stage7_clinical"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let batch = ctx.batch.as_ref().context("depth batch missing")?;
        let by_sample = batch.by_sample();
        let mut assessments = Vec::new();
        let mut errors = Vec::new();
        for (sample_id, depth) in &by_sample {
            let calls = ctx.calls_for(sample_id);
            let Some(quality) = ctx.quality_for(sample_id) else {
                errors.push(SampleError {
                    sample_id: sample_id.to_string(),
                    message: "quality assessment missing".to_string(),
                });
                continue;
            };
            match interpret(sample_id, &calls, depth, quality.quality_flag, &ctx.policy) {
                Ok(a) => assessments.push(a),
                Err(err) => {
                    warn!(sample_id = *sample_id, error = %err, "clinical interpretation failed");
                    errors.push(SampleError {
                        sample_id: sample_id.to_string(),
                        message: format!("{:#}", err),
                    });
                }
            }
        }
        info!(
            assessed = assessments.len(),
            errors = errors.len(),
            "clinical_ready"
        );
        ctx.assessments = assessments;
        ctx.sample_errors.extend(errors);
        Ok(())
    }
}
