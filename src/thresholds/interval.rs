use crate::policy::CallerPolicy;
use crate::thresholds::Thresholds;

/// Bucket `z_min < z <= z_max`, closed on the same side as
/// [`Thresholds::classify`]. The extreme buckets use infinities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub copy_number: u8,
    pub z_min: f64,
    pub z_max: f64,
}

impl Bucket {
    pub fn contains(&self, z: f64) -> bool {
        z.is_finite() && self.z_min < z && z <= self.z_max
    }

    fn is_empty(&self) -> bool {
        self.z_min >= self.z_max
    }

    /// Distance of `z` from the nearest bucket edge relative to half the
    /// bucket width, floored so a call is never reported with zero confidence.
    pub fn confidence(&self, z: f64, policy: &CallerPolicy) -> f64 {
        let raw = match (self.z_min.is_finite(), self.z_max.is_finite()) {
            (false, true) => (z - self.z_max).abs() / policy.unbounded_span,
            (true, false) => (z - self.z_min).abs() / policy.unbounded_span,
            (true, true) => {
                let half = (self.z_max - self.z_min) / 2.0;
                if half <= 0.0 {
                    0.0
                } else {
                    (z - self.z_min).abs().min((z - self.z_max).abs()) / half
                }
            }
            (false, false) => 1.0,
        };
        raw.clamp(policy.confidence_floor, 1.0)
    }
}

/// Partition of the real line that mirrors `classify` region by region.
/// For an ordered set the buckets are disjoint and cover every finite z.
/// The stretch between `heterozygous_deletion` and `normal_lower`, when the
/// two differ, gets its own bucket with the copy number `classify` gives it.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTable {
    buckets: Vec<Bucket>,
}

impl IntervalTable {
    pub fn from_thresholds(t: &Thresholds) -> Self {
        let edges = [
            f64::NEG_INFINITY,
            t.homozygous_deletion,
            t.heterozygous_deletion,
            t.normal_lower,
            t.normal_upper,
            t.heterozygous_duplication,
            f64::INFINITY,
        ];
        let buckets = edges
            .windows(2)
            .map(|w| Bucket {
                copy_number: t.classify(representative_point(w[0], w[1])),
                z_min: w[0],
                z_max: w[1],
            })
            .filter(|b| !b.is_empty())
            .collect();
        Self { buckets }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn find(&self, z: f64) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.contains(z))
    }
}

/// A point of `(lo, hi]`, used to label a region with the copy
/// number `classify` assigns to all of it.
fn representative_point(lo: f64, hi: f64) -> f64 {
    if hi.is_finite() { hi } else { lo + 1.0 }
}
