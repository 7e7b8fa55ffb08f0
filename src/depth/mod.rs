mod reader;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use reader::{load_depth_tsv, parse_depth_tsv};

/// Exons that carry the SMA call, in report order.
pub const CRITICAL_EXONS: [&str; 4] = ["SMN1_exon7", "SMN1_exon8", "SMN2_exon7", "SMN2_exon8"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    Reference,
    Test,
    Unknown,
}

impl SampleType {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "reference" | "ref" | "control" => Self::Reference,
            "test" | "case" => Self::Test,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Test => "test",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gene {
    #[serde(rename = "SMN1")]
    Smn1,
    #[serde(rename = "SMN2")]
    Smn2,
}

impl Gene {
    pub const ALL: [Gene; 2] = [Gene::Smn1, Gene::Smn2];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Smn1 => "SMN1",
            Self::Smn2 => "SMN2",
        }
    }

    pub fn exon_ids(&self) -> [&'static str; 2] {
        match self {
            Self::Smn1 => [CRITICAL_EXONS[0], CRITICAL_EXONS[1]],
            Self::Smn2 => [CRITICAL_EXONS[2], CRITICAL_EXONS[3]],
        }
    }

    pub fn of_exon(exon_id: &str) -> Option<Gene> {
        Self::ALL
            .into_iter()
            .find(|gene| gene.exon_ids().contains(&exon_id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExonDepthRecord {
    pub sample_id: String,
    pub sample_type: SampleType,
    pub exon_id: String,
    pub mean_depth: f64,
    pub median_depth: f64,
    pub positions_covered: u64,
    pub total_positions: u64,
    pub reads_detected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DepthBatch {
    pub records: Vec<ExonDepthRecord>,
}

impl DepthBatch {
    pub fn new(records: Vec<ExonDepthRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records grouped per sample, both levels in lexical order.
    pub fn by_sample(&self) -> BTreeMap<&str, Vec<&ExonDepthRecord>> {
        let mut out: BTreeMap<&str, Vec<&ExonDepthRecord>> = BTreeMap::new();
        for rec in &self.records {
            out.entry(rec.sample_id.as_str()).or_default().push(rec);
        }
        for recs in out.values_mut() {
            recs.sort_by(|a, b| a.exon_id.cmp(&b.exon_id));
        }
        out
    }

    pub fn sample_types(&self) -> BTreeMap<&str, SampleType> {
        self.records
            .iter()
            .map(|r| (r.sample_id.as_str(), r.sample_type))
            .collect()
    }

    pub fn exon_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.records.iter().map(|r| r.exon_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn count_samples(&self, sample_type: SampleType) -> usize {
        self.sample_types()
            .values()
            .filter(|t| **t == sample_type)
            .count()
    }

    pub fn record(&self, sample_id: &str, exon_id: &str) -> Option<&ExonDepthRecord> {
        self.records
            .iter()
            .find(|r| r.sample_id == sample_id && r.exon_id == exon_id)
    }
}
