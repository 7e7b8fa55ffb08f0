use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::fallback::{FallbackRegion, RegionEvidence, find_region};
use crate::io::read_to_string_maybe_gz;

/// Source of read evidence for auxiliary regions. The production source is
/// the external depth extractor; the engine only sees this seam.
pub trait RegionProbe {
    fn probe(&self, sample_id: &str, region: &FallbackRegion) -> Result<RegionEvidence>;
}

/// Region read counts precomputed by the extractor. Absent entries report
/// zero reads.
#[derive(Debug, Clone, Default)]
pub struct StaticRegionCounts {
    counts: HashMap<(String, String), (u64, f64)>,
}

impl StaticRegionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample_id: &str, region_id: &str, read_count: u64, mean_depth: f64) {
        self.counts.insert(
            (sample_id.to_string(), region_id.to_string()),
            (read_count, mean_depth),
        );
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl RegionProbe for StaticRegionCounts {
    fn probe(&self, sample_id: &str, region: &FallbackRegion) -> Result<RegionEvidence> {
        let (read_count, mean_depth) = self
            .counts
            .get(&(sample_id.to_string(), region.region_id.to_string()))
            .copied()
            .unwrap_or((0, 0.0));
        Ok(RegionEvidence {
            region_id: region.region_id.to_string(),
            read_count,
            mean_depth,
        })
    }
}

pub fn load_region_counts(path: &Path) -> Result<StaticRegionCounts> {
    let content = read_to_string_maybe_gz(path)
        .with_context(|| format!("failed to read region counts {}", path.display()))?;
    parse_region_counts(&content, &path.display().to_string())
}

pub fn parse_region_counts(content: &str, source: &str) -> Result<StaticRegionCounts> {
    let mut out = StaticRegionCounts::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("sample_id") {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        if parts.len() != 4 {
            bail!("{}:{} malformed TSV (expected 4 columns)", source, line_no);
        }
        if find_region(parts[1]).is_none() {
            bail!("{}:{} unknown fallback region '{}'", source, line_no, parts[1]);
        }
        let read_count: u64 = parts[2]
            .parse()
            .with_context(|| format!("{}:{} invalid read_count", source, line_no))?;
        let mean_depth: f64 = parts[3]
            .parse()
            .with_context(|| format!("{}:{} invalid mean_depth", source, line_no))?;
        out.insert(parts[0], parts[1], read_count, mean_depth);
    }
    Ok(out)
}
