use std::fs;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use kira_smncnv::depth::{SampleType, load_depth_tsv, parse_depth_tsv};
use tempfile::TempDir;

const HEADER: &str = "sample_id\tsample_type\texon_id\tmean_depth\tmedian_depth\tpositions_covered\ttotal_positions\treads_detected\n";

#[test]
fn parses_all_columns() {
    let content = format!(
        "{}S1\treference\tSMN1_exon7\t45.5\t44\t111\t111\ttrue\nS1\treference\tSMN1_exon8\t40\t40\t100\t111\tyes\n",
        HEADER
    );
    let (batch, warnings) = parse_depth_tsv(&content, "mem").unwrap();
    assert!(warnings.is_empty());
    assert_eq!(batch.records.len(), 2);
    let rec = batch.record("S1", "SMN1_exon7").unwrap();
    assert_eq!(rec.sample_type, SampleType::Reference);
    assert!((rec.mean_depth - 45.5).abs() < 1e-12);
    assert_eq!(rec.positions_covered, 111);
    assert!(rec.reads_detected);
}

#[test]
fn optional_columns_default() {
    let content = "sample_id\texon_id\tmean_depth\treads_detected\nS1\tSMN2_exon7\t12\t0\n";
    let (batch, _) = parse_depth_tsv(content, "mem").unwrap();
    let rec = batch.record("S1", "SMN2_exon7").unwrap();
    assert_eq!(rec.sample_type, SampleType::Unknown);
    assert!((rec.median_depth - 12.0).abs() < 1e-12);
    assert!(!rec.reads_detected);
}

#[test]
fn bad_rows_are_skipped_with_warnings() {
    let content = format!(
        "{}S1\ttest\tSMN1_exon7\tabc\t1\t1\t1\ttrue\nS1\ttest\tSMN1_exon8\t-3\t1\t1\t1\ttrue\nS1\ttest\tSMN2_exon7\t30\t30\t1\t1\tmaybe\nS2\ttest\tSMN1_exon7\t30\t30\t1\t1\ttrue\nS2\ttest\tSMN1_exon7\t31\t30\t1\t1\ttrue\n",
        HEADER
    );
    let (batch, warnings) = parse_depth_tsv(&content, "mem").unwrap();
    assert_eq!(batch.records.len(), 1);
    assert_eq!(warnings.len(), 4);
    assert!(warnings.iter().any(|w| w.contains("duplicate")));
    assert!((batch.record("S2", "SMN1_exon7").unwrap().mean_depth - 30.0).abs() < 1e-12);
}

#[test]
fn missing_required_column_is_an_error() {
    let content = "sample_id\texon_id\tmean_depth\nS1\tSMN1_exon7\t10\n";
    let err = parse_depth_tsv(content, "mem").unwrap_err();
    assert!(err.to_string().contains("reads_detected"));
}

#[test]
fn reads_gzipped_tables() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("depth.tsv.gz");
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b"sample_id\texon_id\tmean_depth\treads_detected\nS1\tSMN1_exon7\t20\ttrue\n")
        .unwrap();
    fs::write(&path, enc.finish().unwrap()).unwrap();

    let (batch, warnings) = load_depth_tsv(&path).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(batch.records.len(), 1);
}

#[test]
fn missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(load_depth_tsv(&tmp.path().join("absent.tsv")).is_err());
}

#[test]
fn conflicting_sample_type_keeps_the_first_declaration() {
    let content = "sample_id\tsample_type\texon_id\tmean_depth\treads_detected\n\
S1\treference\tSMN1_exon7\t30\ttrue\n\
S1\ttest\tSMN1_exon8\t30\ttrue\n\
S2\ttest\tSMN1_exon7\t30\ttrue\n";
    let (batch, warnings) = parse_depth_tsv(content, "mem").unwrap();
    assert_eq!(batch.records.len(), 3);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("S1"));
    assert!(
        batch
            .records
            .iter()
            .filter(|r| r.sample_id == "S1")
            .all(|r| r.sample_type == SampleType::Reference)
    );
    assert_eq!(batch.count_samples(SampleType::Reference), 1);
}
