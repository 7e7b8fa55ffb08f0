use std::fs;

use kira_smncnv::thresholds::truth::{
    MlpaCategory, TruthValue, gene_exon_to_exon_id, load_truth, parse_truth_tsv, sha256_hex,
};
use tempfile::TempDir;

#[test]
fn value_precedence() {
    assert_eq!(TruthValue::parse(""), TruthValue::Missing);
    assert_eq!(TruthValue::parse("NA"), TruthValue::Missing);
    assert_eq!(
        TruthValue::parse("Homo_Del"),
        TruthValue::Category(MlpaCategory::HomozygousDeletion)
    );
    assert_eq!(
        TruthValue::parse("hetro  del"),
        TruthValue::Category(MlpaCategory::HeterozygousDeletion)
    );
    assert_eq!(
        TruthValue::parse("Het-Dup"),
        TruthValue::Category(MlpaCategory::HeterozygousDuplication)
    );
    assert_eq!(TruthValue::parse("3"), TruthValue::CopyNumber(3));
    assert_eq!(TruthValue::parse("7"), TruthValue::CopyNumber(4));
    assert_eq!(TruthValue::parse("0.45"), TruthValue::DosageRatio(0.45));
    assert_eq!(TruthValue::parse("2.0"), TruthValue::DosageRatio(2.0));
    assert_eq!(TruthValue::parse("1.0"), TruthValue::DosageRatio(1.0));
    assert!(matches!(TruthValue::parse("unclear"), TruthValue::Unrecognized(_)));
}

#[test]
fn value_copy_numbers() {
    assert_eq!(TruthValue::Missing.copy_number(), 2);
    assert_eq!(TruthValue::parse("homozygous duplication").copy_number(), 4);
    assert_eq!(TruthValue::parse("normal").copy_number(), 2);
    assert_eq!(TruthValue::parse("0").copy_number(), 0);
    assert_eq!(TruthValue::parse("0.5").copy_number(), 1);
    assert_eq!(TruthValue::parse("1.05").copy_number(), 2);
    assert_eq!(TruthValue::parse("1.5").copy_number(), 3);
    assert_eq!(TruthValue::parse("1.85").copy_number(), 3);
    assert_eq!(TruthValue::parse("2.5").copy_number(), 4);
    assert_eq!(TruthValue::parse("1.0").copy_number(), 2);
    assert_eq!(TruthValue::parse("2.0").copy_number(), 4);
    assert_eq!(TruthValue::parse("1").copy_number(), 1);
    assert_eq!(TruthValue::parse("???").copy_number(), 2);
}

#[test]
fn gene_exon_keys() {
    assert_eq!(gene_exon_to_exon_id("SMN1-7").as_deref(), Some("SMN1_exon7"));
    assert_eq!(gene_exon_to_exon_id("smn2-8").as_deref(), Some("SMN2_exon8"));
    assert_eq!(
        gene_exon_to_exon_id("SMN2_exon7").as_deref(),
        Some("SMN2_exon7")
    );
    assert_eq!(gene_exon_to_exon_id("SMN1"), None);
    assert_eq!(gene_exon_to_exon_id("SMN1-x"), None);
}

#[test]
fn blank_sample_rows_continue_previous_sample() {
    let content = "sample_id\tgene\tcopy_number\tconfidence\n\
S1\tSMN1-7\thomo del\thigh\n\
\tSMN1-8\t0\t\n\
S2\tSMN1-7\t1.02\tlow\n\
S2\tSMN1-7\t3\t\n";
    let labels = parse_truth_tsv(content, "mem").unwrap();
    assert_eq!(labels.len(), 3);
    assert_eq!(labels[1].sample_id, "S1");
    assert_eq!(labels[1].exon_id, "SMN1_exon8");
    assert_eq!(labels[1].copy_number, 0);
    assert_eq!(labels[0].confidence.as_deref(), Some("high"));
    assert_eq!(labels[1].confidence, None);
    assert_eq!(labels[2].copy_number, 2);
}

#[test]
fn leading_blank_sample_is_an_error() {
    let content = "sample_id\tgene\tcopy_number\n\tSMN1-7\t2\n";
    assert!(parse_truth_tsv(content, "mem").is_err());
}

#[test]
fn missing_columns_are_an_error() {
    let content = "sample\tgene\tcopy_number\nS1\tSMN1-7\t2\n";
    assert!(parse_truth_tsv(content, "mem").is_err());
}

#[test]
fn hash_covers_raw_bytes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("truth.tsv");
    let content = "sample_id\tgene\tcopy_number\nS1\tSMN1-7\t2\n";
    fs::write(&path, content).unwrap();
    let truth = load_truth(&path).unwrap();
    assert_eq!(truth.labels.len(), 1);
    assert_eq!(truth.source_hash, sha256_hex(content.as_bytes()));
    assert_eq!(truth.source_hash.len(), 64);
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}
