//! Multiclass classification metrics over copy-number labels 0..=4.

pub const N_CLASSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    /// Rows are truth, columns are predictions.
    pub counts: [[u64; N_CLASSES]; N_CLASSES],
}

impl ConfusionMatrix {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut m = Self::default();
        for (truth, pred) in pairs {
            let t = (truth as usize).min(N_CLASSES - 1);
            let p = (pred as usize).min(N_CLASSES - 1);
            m.counts[t][p] += 1;
        }
        m
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn correct(&self) -> u64 {
        (0..N_CLASSES).map(|k| self.counts[k][k]).sum()
    }

    fn truth_totals(&self) -> [u64; N_CLASSES] {
        let mut t = [0u64; N_CLASSES];
        for (k, row) in self.counts.iter().enumerate() {
            t[k] = row.iter().sum();
        }
        t
    }

    fn pred_totals(&self) -> [u64; N_CLASSES] {
        let mut p = [0u64; N_CLASSES];
        for row in &self.counts {
            for (k, v) in row.iter().enumerate() {
                p[k] += v;
            }
        }
        p
    }

    /// Gorodkin's multiclass MCC. Returns 0.0 when either marginal is
    /// concentrated on a single class.
    pub fn mcc(&self) -> f64 {
        let s = self.total() as f64;
        let c = self.correct() as f64;
        let t = self.truth_totals();
        let p = self.pred_totals();
        let pt: f64 = (0..N_CLASSES).map(|k| p[k] as f64 * t[k] as f64).sum();
        let pp: f64 = p.iter().map(|&v| (v as f64) * (v as f64)).sum();
        let tt: f64 = t.iter().map(|&v| (v as f64) * (v as f64)).sum();
        let denom = ((s * s - pp) * (s * s - tt)).sqrt();
        if denom == 0.0 || !denom.is_finite() {
            return 0.0;
        }
        (c * s - pt) / denom
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct() as f64 / total as f64
    }

    /// Unweighted mean of per-class F1 over classes present in truth or
    /// predictions.
    pub fn f1_macro(&self) -> f64 {
        let t = self.truth_totals();
        let p = self.pred_totals();
        let mut sum = 0.0;
        let mut n = 0usize;
        for k in 0..N_CLASSES {
            if t[k] == 0 && p[k] == 0 {
                continue;
            }
            let tp = self.counts[k][k] as f64;
            let denom = t[k] as f64 + p[k] as f64;
            sum += if denom == 0.0 { 0.0 } else { 2.0 * tp / denom };
            n += 1;
        }
        if n == 0 { 0.0 } else { sum / n as f64 }
    }

    pub fn to_rows(&self) -> Vec<Vec<u64>> {
        self.counts.iter().map(|row| row.to_vec()).collect()
    }
}

pub fn is_constant(labels: &[u8]) -> bool {
    match labels.first() {
        Some(first) => labels.iter().all(|l| l == first),
        None => true,
    }
}
