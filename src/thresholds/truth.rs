//! MLPA ground-truth table parsing.
//!
//! Copy-number cells are classified by [`TruthValue::parse`] in a fixed
//! precedence: missing, textual category, integral copy number, dosage
//! ratio, unrecognized. Missing and unrecognized values default to 2.
//! Only a bare digit string is a copy number; any other number, including
//! `1.0` or `2.0`, is read as a dosage ratio.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MlpaCategory {
    HomozygousDeletion,
    HeterozygousDeletion,
    Normal,
    HeterozygousDuplication,
    HomozygousDuplication,
}

impl MlpaCategory {
    pub fn copy_number(&self) -> u8 {
        match self {
            Self::HomozygousDeletion => 0,
            Self::HeterozygousDeletion => 1,
            Self::Normal => 2,
            Self::HeterozygousDuplication => 3,
            Self::HomozygousDuplication => 4,
        }
    }

    fn from_normalized(text: &str) -> Option<Self> {
        let cat = match text {
            "homo del" | "homozygous del" | "homozygous deletion" => Self::HomozygousDeletion,
            "hetro del" | "hetero del" | "het del" | "heterozygous del"
            | "heterozygous deletion" => Self::HeterozygousDeletion,
            "normal" => Self::Normal,
            "hetro dup" | "hetero dup" | "het dup" | "heterozygous dup"
            | "heterozygous duplication" => Self::HeterozygousDuplication,
            "homo dup" | "homozygous dup" | "homozygous duplication" => {
                Self::HomozygousDuplication
            }
            _ => return None,
        };
        Some(cat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TruthValue {
    Missing,
    Category(MlpaCategory),
    CopyNumber(u8),
    DosageRatio(f64),
    Unrecognized(String),
}

impl TruthValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("nan")
        {
            return Self::Missing;
        }

        let normalized = normalize_text(trimmed);
        if let Some(cat) = MlpaCategory::from_normalized(&normalized) {
            return Self::Category(cat);
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            let cn = trimmed.parse::<u64>().map_or(4, |v| v.min(4));
            return Self::CopyNumber(cn as u8);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Self::DosageRatio(v),
            _ => Self::Unrecognized(trimmed.to_string()),
        }
    }

    pub fn copy_number(&self) -> u8 {
        match self {
            Self::Missing | Self::Unrecognized(_) => 2,
            Self::Category(cat) => cat.copy_number(),
            Self::CopyNumber(cn) => *cn,
            Self::DosageRatio(r) => {
                if *r < 0.7 {
                    1
                } else if *r < 1.3 {
                    2
                } else if *r < 1.9 {
                    3
                } else {
                    4
                }
            }
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.to_ascii_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct TruthLabel {
    pub sample_id: String,
    pub exon_id: String,
    pub copy_number: u8,
    pub confidence: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GroundTruth {
    pub labels: Vec<TruthLabel>,
    pub source_hash: String,
}

/// `SMN1-7` becomes `SMN1_exon7`; keys already in exon-id form pass through.
pub fn gene_exon_to_exon_id(key: &str) -> Option<String> {
    let key = key.trim();
    if key.contains("_exon") {
        return Some(key.to_string());
    }
    let (gene, exon) = key.rsplit_once('-')?;
    if gene.is_empty() || exon.is_empty() || !exon.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}_exon{}", gene.to_ascii_uppercase(), exon))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn load_truth(path: &Path) -> Result<GroundTruth> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read ground truth {}", path.display()))?;
    let content = std::str::from_utf8(&bytes)
        .with_context(|| format!("ground truth {} is not UTF-8", path.display()))?;
    let labels = parse_truth_tsv(content, &path.display().to_string())?;
    Ok(GroundTruth {
        labels,
        source_hash: sha256_hex(&bytes),
    })
}

pub fn parse_truth_tsv(content: &str, source: &str) -> Result<Vec<TruthLabel>> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.starts_with('#'));
    let (_, header) = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("{}: ground truth table is empty", source))?;
    let columns: HashMap<&str, usize> = header
        .split('\t')
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();
    let col = |name: &str| -> Result<usize> {
        columns
            .get(name)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("{}: missing required column '{}'", source, name))
    };
    let sample_col = col("sample_id")?;
    let gene_col = col("gene")?;
    let cn_col = col("copy_number")?;
    let conf_col = columns.get("confidence").copied();

    let mut labels: Vec<TruthLabel> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut current_sample: Option<String> = None;
    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        let field = |i: usize| fields.get(i).copied().unwrap_or("");

        let sample = field(sample_col);
        if !sample.is_empty() {
            current_sample = Some(sample.to_string());
        }
        let Some(sample_id) = current_sample.clone() else {
            bail!("{}:{} row has no sample_id and no preceding sample", source, line_no);
        };

        let gene = field(gene_col);
        if gene.is_empty() {
            continue;
        }
        let Some(exon_id) = gene_exon_to_exon_id(gene) else {
            warn!(
                "{}:{} unrecognized gene/exon key '{}', row skipped",
                source, line_no, gene
            );
            continue;
        };

        let value = TruthValue::parse(field(cn_col));
        if let TruthValue::Unrecognized(raw) = &value {
            debug!(
                "{}:{} unrecognized copy number '{}', defaulting to 2",
                source, line_no, raw
            );
        }

        if !seen.insert((sample_id.clone(), exon_id.clone())) {
            warn!(
                "{}:{} duplicate label for {}/{}, keeping the first",
                source, line_no, sample_id, exon_id
            );
            continue;
        }

        labels.push(TruthLabel {
            sample_id,
            exon_id,
            copy_number: value.copy_number(),
            confidence: conf_col
                .map(field)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        });
    }
    Ok(labels)
}
