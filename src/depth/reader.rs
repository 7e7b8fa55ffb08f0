use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::depth::{DepthBatch, ExonDepthRecord, SampleType};
use crate::io::read_to_string_maybe_gz;

const REQUIRED_COLUMNS: [&str; 4] = ["sample_id", "exon_id", "mean_depth", "reads_detected"];

/// Loads the per-exon depth table written by the depth extractor.
/// Returns the batch together with the row-level problems that were skipped.
pub fn load_depth_tsv(path: &Path) -> Result<(DepthBatch, Vec<String>)> {
    let content = read_to_string_maybe_gz(path)
        .with_context(|| format!("failed to read depth table {}", path.display()))?;
    parse_depth_tsv(&content, &path.display().to_string())
}

pub fn parse_depth_tsv(content: &str, source: &str) -> Result<(DepthBatch, Vec<String>)> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.starts_with('#'));

    let (_, header) = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("{}: depth table is empty", source))?;
    let columns: HashMap<&str, usize> = header
        .split('\t')
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();
    for name in REQUIRED_COLUMNS {
        if !columns.contains_key(name) {
            bail!("{}: missing required column '{}'", source, name);
        }
    }

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut declared: HashMap<String, SampleType> = HashMap::new();

    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        match parse_row(&fields, &columns) {
            Ok(mut rec) => {
                let key = (rec.sample_id.clone(), rec.exon_id.clone());
                if !seen.insert(key) {
                    let msg = format!(
                        "{}:{} duplicate record for {}/{}, keeping the first",
                        source, line_no, rec.sample_id, rec.exon_id
                    );
                    warn!("{}", msg);
                    warnings.push(msg);
                    continue;
                }
                let first = *declared
                    .entry(rec.sample_id.clone())
                    .or_insert(rec.sample_type);
                if first != rec.sample_type {
                    let msg = format!(
                        "{}:{} sample {} declared as {} but earlier rows say {}, keeping the first",
                        source,
                        line_no,
                        rec.sample_id,
                        rec.sample_type.as_str(),
                        first.as_str()
                    );
                    warn!("{}", msg);
                    warnings.push(msg);
                    rec.sample_type = first;
                }
                records.push(rec);
            }
            Err(err) => {
                let msg = format!("{}:{} skipped: {}", source, line_no, err);
                warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }

    Ok((DepthBatch::new(records), warnings))
}

fn parse_row(fields: &[&str], columns: &HashMap<&str, usize>) -> Result<ExonDepthRecord> {
    let get = |name: &str| -> Option<&str> {
        columns
            .get(name)
            .and_then(|&i| fields.get(i).copied())
            .filter(|v| !v.is_empty())
    };
    let sample_id = get("sample_id").context("empty sample_id")?;
    let exon_id = get("exon_id").context("empty exon_id")?;

    let mean_depth = parse_depth(get("mean_depth").context("empty mean_depth")?, "mean_depth")?;
    let median_depth = match get("median_depth") {
        Some(v) => parse_depth(v, "median_depth")?,
        None => mean_depth,
    };
    let reads_detected = parse_bool(get("reads_detected").context("empty reads_detected")?)?;
    let positions_covered = match get("positions_covered") {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("invalid positions_covered '{}'", v))?,
        None => 0,
    };
    let total_positions = match get("total_positions") {
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("invalid total_positions '{}'", v))?,
        None => 0,
    };

    Ok(ExonDepthRecord {
        sample_id: sample_id.to_string(),
        sample_type: get("sample_type").map_or(SampleType::Unknown, SampleType::parse),
        exon_id: exon_id.to_string(),
        mean_depth,
        median_depth,
        positions_covered,
        total_positions,
        reads_detected,
    })
}

fn parse_depth(value: &str, name: &str) -> Result<f64> {
    let v: f64 = value
        .parse()
        .with_context(|| format!("invalid {} '{}'", name, value))?;
    if !v.is_finite() || v < 0.0 {
        bail!("{} must be a finite non-negative number, got '{}'", name, value);
    }
    Ok(v)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        other => bail!("invalid reads_detected '{}'", other),
    }
}
