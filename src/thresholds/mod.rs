mod interval;
pub mod optimizer;
pub mod store;
pub mod truth;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use interval::{Bucket, IntervalTable};
pub use store::ThresholdStore;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub homozygous_deletion: f64,
    pub heterozygous_deletion: f64,
    pub normal_lower: f64,
    pub normal_upper: f64,
    pub heterozygous_duplication: f64,
    pub homozygous_duplication: f64,
}

/// The one default table. Every component that needs thresholds before a
/// store exists starts from here.
pub const DEFAULT_THRESHOLDS: Thresholds = Thresholds {
    homozygous_deletion: -2.0,
    heterozygous_deletion: -0.5,
    normal_lower: -0.5,
    normal_upper: 0.5,
    heterozygous_duplication: 2.0,
    homozygous_duplication: 3.0,
};

impl Thresholds {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.homozygous_deletion,
            self.heterozygous_deletion,
            self.normal_lower,
            self.normal_upper,
            self.heterozygous_duplication,
            self.homozygous_duplication,
        ]
    }

    /// hd < het_del <= normal_lower < normal_upper <= het_dup < homo_dup
    pub fn is_ordered(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
            && self.homozygous_deletion < self.heterozygous_deletion
            && self.heterozygous_deletion <= self.normal_lower
            && self.normal_lower < self.normal_upper
            && self.normal_upper <= self.heterozygous_duplication
            && self.heterozygous_duplication < self.homozygous_duplication
    }

    pub fn validate(&self) -> Result<()> {
        if !self.is_ordered() {
            bail!("threshold ordering violated: {:?}", self.as_array());
        }
        Ok(())
    }

    /// Z-score to copy number. Shared by optimizer scoring and calling.
    pub fn classify(&self, z: f64) -> u8 {
        if z <= self.homozygous_deletion {
            0
        } else if z <= self.heterozygous_deletion {
            1
        } else if self.normal_lower < z && z <= self.normal_upper {
            2
        } else if z <= self.heterozygous_duplication {
            3
        } else {
            4
        }
    }

    pub fn interval_table(&self) -> IntervalTable {
        IntervalTable::from_thresholds(self)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        DEFAULT_THRESHOLDS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub mcc: f64,
    pub f1_macro: f64,
    pub accuracy: f64,
    pub n_samples: usize,
    pub n_observations: usize,
    pub confusion_matrix: Vec<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub thresholds: Thresholds,
    pub performance: Option<Performance>,
    pub source_hash: Option<String>,
    #[serde(default)]
    pub is_initial: bool,
}

impl ThresholdSet {
    /// Unpersisted defaults used when no store can be read. Version 0 never
    /// appears on disk.
    pub fn builtin_default() -> Self {
        Self {
            version: 0,
            created_at: DateTime::<Utc>::default(),
            thresholds: DEFAULT_THRESHOLDS,
            performance: None,
            source_hash: None,
            is_initial: true,
        }
    }
}
