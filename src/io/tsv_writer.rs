use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn write_zscores(path: &Path, ctx: &Ctx) -> Result<()> {
    let norm = ctx.normalization.as_ref().context("z-scores missing")?;
    let mut w = create(path)?;
    writeln!(w, "sample_id\texon_id\tz_score")?;
    for z in &norm.zscores {
        writeln!(w, "{}\t{}\t{:.6}", z.sample_id, z.exon_id, z.z_score)?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_calls(path: &Path, ctx: &Ctx) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "sample_id\texon_id\tz_score\tcopy_number\tconfidence\tcall_basis"
    )?;
    for c in &ctx.calls {
        writeln!(
            w,
            "{}\t{}\t{:.6}\t{}\t{:.6}\t{}",
            c.sample_id,
            c.exon_id,
            c.z_score,
            c.copy_number,
            c.confidence,
            c.call_basis.as_str()
        )?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_samples(path: &Path, ctx: &Ctx) -> Result<()> {
    let mut w = create(path)?;
    writeln!(
        w,
        "sample_id\tquality_score\tquality_flag\texon_consistency\tfallback_used\tSMN1_cn\tSMN2_cn\trisk_category\tseverity\tconfidence_tier\tqc_flags"
    )?;
    for q in &ctx.quality {
        let assessment = ctx.assessment_for(&q.sample_id);
        let qc_flags = if q.qc_flags.is_empty() {
            "-".to_string()
        } else {
            q.qc_flags.join(";")
        };
        match assessment {
            Some(a) => writeln!(
                w,
                "{}\t{:.6}\t{}\t{}\t{}\t{:.1}\t{:.1}\t{}\t{}\t{}\t{}",
                q.sample_id,
                q.quality_score,
                q.quality_flag.as_str(),
                q.exon_consistency,
                q.fallback_used,
                a.gene_a_copy_number,
                a.gene_b_copy_number,
                a.risk_category.as_str(),
                a.severity_prediction.as_str(),
                a.confidence_tier.as_str(),
                qc_flags
            )?,
            None => writeln!(
                w,
                "{}\t{:.6}\t{}\t{}\t{}\tNA\tNA\tNA\tNA\tNA\t{}",
                q.sample_id,
                q.quality_score,
                q.quality_flag.as_str(),
                q.exon_consistency,
                q.fallback_used,
                qc_flags
            )?,
        }
    }
    w.flush()?;
    Ok(())
}
