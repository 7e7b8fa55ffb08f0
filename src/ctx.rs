use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::caller::{CopyNumberCall, SampleQuality};
use crate::clinical::ClinicalAssessment;
use crate::depth::DepthBatch;
use crate::fallback::{FallbackOutcome, StaticRegionCounts};
use crate::normalize::Normalization;
use crate::policy::CallerPolicy;
use crate::thresholds::ThresholdSet;
use crate::thresholds::truth::GroundTruth;

/// Where the thresholds used for calling came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    Stored,
    Initialized,
    Retrained,
    BuiltinDefault,
}

impl ThresholdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdSource::Stored => "stored",
            ThresholdSource::Initialized => "initialized",
            ThresholdSource::Retrained => "retrained",
            ThresholdSource::BuiltinDefault => "builtin_default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleError {
    pub sample_id: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub zscores_path: PathBuf,
    pub calls_path: PathBuf,
    pub samples_path: PathBuf,
}

#[derive(Debug)]
pub struct Ctx {
    pub depth_path: PathBuf,
    pub threshold_dir: PathBuf,
    pub truth_path: Option<PathBuf>,
    pub region_counts_path: Option<PathBuf>,
    pub policy: CallerPolicy,
    pub force_retrain: bool,
    pub write_json: bool,
    pub write_tsv: bool,
    pub threads: usize,
    pub batch: Option<DepthBatch>,
    pub truth: Option<GroundTruth>,
    pub region_counts: StaticRegionCounts,
    pub normalization: Option<Normalization>,
    pub fallback: BTreeMap<String, FallbackOutcome>,
    pub active_thresholds: Option<ThresholdSet>,
    pub threshold_source: Option<ThresholdSource>,
    pub calls: Vec<CopyNumberCall>,
    pub quality: Vec<SampleQuality>,
    pub assessments: Vec<ClinicalAssessment>,
    pub sample_errors: Vec<SampleError>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
}

impl Ctx {
    pub fn new(
        depth_path: PathBuf,
        out_dir: PathBuf,
        threshold_dir: PathBuf,
        truth_path: Option<PathBuf>,
        region_counts_path: Option<PathBuf>,
        policy: CallerPolicy,
        write_json: bool,
        write_tsv: bool,
    ) -> Self {
        let json_path = out_dir.join("smncnv.json");
        let zscores_path = out_dir.join("zscores.tsv");
        let calls_path = out_dir.join("calls.tsv");
        let samples_path = out_dir.join("samples.tsv");
        Self {
            depth_path,
            threshold_dir,
            truth_path,
            region_counts_path,
            policy,
            force_retrain: false,
            write_json,
            write_tsv,
            threads: 0,
            batch: None,
            truth: None,
            region_counts: StaticRegionCounts::new(),
            normalization: None,
            fallback: BTreeMap::new(),
            active_thresholds: None,
            threshold_source: None,
            calls: Vec::new(),
            quality: Vec::new(),
            assessments: Vec::new(),
            sample_errors: Vec::new(),
            warnings: Vec::new(),
            output: OutputPaths {
                out_dir,
                json_path,
                zscores_path,
                calls_path,
                samples_path,
            },
        }
    }

    pub fn calls_for<'a>(&'a self, sample_id: &'a str) -> Vec<&'a CopyNumberCall> {
        self.calls
            .iter()
            .filter(|c| c.sample_id == sample_id)
            .collect()
    }

    pub fn quality_for(&self, sample_id: &str) -> Option<&SampleQuality> {
        self.quality.iter().find(|q| q.sample_id == sample_id)
    }

    pub fn assessment_for(&self, sample_id: &str) -> Option<&ClinicalAssessment> {
        self.assessments.iter().find(|a| a.sample_id == sample_id)
    }

    pub fn sample_ids(&self) -> Vec<String> {
        self.batch
            .as_ref()
            .map(|b| b.by_sample().keys().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }
}
