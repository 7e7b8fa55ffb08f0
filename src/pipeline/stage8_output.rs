use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage8Output;

impl Stage8Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage8Output {
    fn name(&self) -> &'static str {
        "stage8_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.write_json {
            json_writer::write_json(&ctx.output.json_path, ctx)?;
            info!(path = %ctx.output.json_path.display(), "json_written");
        }
        if ctx.write_tsv {
            tsv_writer::write_zscores(&ctx.output.zscores_path, ctx)?;
            tsv_writer::write_calls(&ctx.output.calls_path, ctx)?;
            tsv_writer::write_samples(&ctx.output.samples_path, ctx)?;
            info!(out_dir = %ctx.output.out_dir.display(), "tsv_written");
        }
        Ok(())
    }
}
