use kira_smncnv::caller::{CallBasis, CopyNumberCaller};
use kira_smncnv::normalize::ZScoreRecord;
use kira_smncnv::policy::CallerPolicy;
use kira_smncnv::thresholds::optimizer::candidates;
use kira_smncnv::thresholds::{DEFAULT_THRESHOLDS, ThresholdSet, Thresholds};
use proptest::prelude::*;

fn default_set() -> ThresholdSet {
    ThresholdSet::builtin_default()
}

#[test]
fn deep_deletion_confidence() {
    let set = default_set();
    let policy = CallerPolicy::default_v1();
    let caller = CopyNumberCaller::new(&set, &policy);
    let (cn, conf, basis) = caller.call_z(-2.5);
    assert_eq!(cn, 0);
    assert!((conf - 0.25).abs() < 1e-12);
    assert_eq!(basis, CallBasis::Interval);
}

#[test]
fn centre_of_normal_is_fully_confident() {
    let set = default_set();
    let policy = CallerPolicy::default_v1();
    let caller = CopyNumberCaller::new(&set, &policy);
    let (cn, conf, _) = caller.call_z(0.0);
    assert_eq!(cn, 2);
    assert!((conf - 1.0).abs() < 1e-12);
}

#[test]
fn confidence_is_floored_at_edges() {
    let set = default_set();
    let policy = CallerPolicy::default_v1();
    let caller = CopyNumberCaller::new(&set, &policy);
    let (_, conf, _) = caller.call_z(0.5);
    assert!((conf - 0.1).abs() < 1e-12);
}

#[test]
fn mapping_rule() {
    let t = DEFAULT_THRESHOLDS;
    assert_eq!(t.classify(-2.0), 0);
    assert_eq!(t.classify(-1.0), 1);
    assert_eq!(t.classify(-0.5), 1);
    assert_eq!(t.classify(0.5), 2);
    assert_eq!(t.classify(1.0), 3);
    assert_eq!(t.classify(2.0), 3);
    assert_eq!(t.classify(2.01), 4);
}

#[test]
fn stretch_between_deletion_and_normal_follows_classify() {
    let thresholds = Thresholds {
        homozygous_deletion: -3.5,
        heterozygous_deletion: -2.0,
        normal_lower: -1.0,
        normal_upper: 1.0,
        heterozygous_duplication: 2.75,
        homozygous_duplication: 3.75,
    };
    let mut set = default_set();
    set.thresholds = thresholds;
    let policy = CallerPolicy::default_v1();
    let caller = CopyNumberCaller::new(&set, &policy);
    for z in [-1.9, -1.5, -1.1] {
        let (cn, _, basis) = caller.call_z(z);
        assert_eq!(basis, CallBasis::Interval, "z={}", z);
        assert_eq!(cn, thresholds.classify(z), "z={}", z);
    }
    // centre of (-2, -1]
    let (_, conf, _) = caller.call_z(-1.5);
    assert!((conf - 1.0).abs() < 1e-12);

    let (cn, _, basis) = caller.call_z(f64::NEG_INFINITY);
    assert_eq!(basis, CallBasis::Defensive);
    assert_eq!(cn, 0);
}

#[test]
fn every_grid_candidate_agrees_with_classify() {
    let policy = CallerPolicy::default_v1();
    for candidate in candidates().into_iter().filter(|c| c.thresholds.is_ordered()) {
        let mut set = default_set();
        set.thresholds = candidate.thresholds;
        let caller = CopyNumberCaller::new(&set, &policy);
        let table = candidate.thresholds.interval_table();
        for i in -240..=240 {
            let z = i as f64 * 0.025;
            let hits = table.buckets().iter().filter(|b| b.contains(z)).count();
            assert_eq!(hits, 1, "rank {} z={}", candidate.rank, z);
            let (cn, conf, basis) = caller.call_z(z);
            assert_eq!(basis, CallBasis::Interval, "rank {} z={}", candidate.rank, z);
            assert_eq!(cn, candidate.thresholds.classify(z), "rank {} z={}", candidate.rank, z);
            assert!((0.1..=1.0).contains(&conf));
        }
    }
}

#[test]
fn nan_is_defensive() {
    let set = default_set();
    let policy = CallerPolicy::default_v1();
    let caller = CopyNumberCaller::new(&set, &policy);
    let (_, conf, basis) = caller.call_z(f64::NAN);
    assert_eq!(basis, CallBasis::Defensive);
    assert!((conf - 0.5).abs() < 1e-12);
}

#[test]
fn batch_output_is_sorted_and_stable() {
    let zscores: Vec<ZScoreRecord> = ["S3", "S1", "S2"]
        .into_iter()
        .flat_map(|s| {
            ["SMN2_exon8", "SMN1_exon7"].into_iter().map(move |e| ZScoreRecord {
                sample_id: s.to_string(),
                exon_id: e.to_string(),
                z_score: -1.0,
            })
        })
        .collect();
    let set = default_set();
    let policy = CallerPolicy::default_v1();
    let caller = CopyNumberCaller::new(&set, &policy);
    let a = caller.call_batch(&zscores, 4).unwrap();
    let b = caller.call_batch(&zscores, 1).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 6);
    assert_eq!(a[0].sample_id, "S1");
    assert_eq!(a[0].exon_id, "SMN1_exon7");
    assert_eq!(a[5].sample_id, "S3");
    assert_eq!(a[5].exon_id, "SMN2_exon8");
    assert!(a.iter().all(|c| c.copy_number == 1));
}

#[test]
fn default_intervals_cover_the_line_once() {
    let table = DEFAULT_THRESHOLDS.interval_table();
    for i in -100..=100 {
        let z = i as f64 * 0.05;
        let hits = table.buckets().iter().filter(|b| b.contains(z)).count();
        assert_eq!(hits, 1, "z={}", z);
    }
}

proptest! {
    #[test]
    fn every_finite_z_gets_a_bounded_call(z in -50.0f64..50.0) {
        let set = default_set();
        let policy = CallerPolicy::default_v1();
        let caller = CopyNumberCaller::new(&set, &policy);
        let (cn, conf, basis) = caller.call_z(z);
        prop_assert!(cn <= 4);
        prop_assert!((0.1..=1.0).contains(&conf));
        prop_assert_eq!(basis, CallBasis::Interval);
    }

    #[test]
    fn classify_is_monotone(a in -10.0f64..10.0, b in -10.0f64..10.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(DEFAULT_THRESHOLDS.classify(lo) <= DEFAULT_THRESHOLDS.classify(hi));
    }
}

fn ordered_thresholds() -> impl Strategy<Value = Thresholds> {
    (
        -6.0f64..0.0,
        0.05f64..2.0,
        0.0f64..2.0,
        0.05f64..3.0,
        0.0f64..2.0,
        0.05f64..2.0,
    )
        .prop_map(|(hd, d1, d2, d3, d4, d5)| {
            let het_del = hd + d1;
            let normal_lower = het_del + d2;
            let normal_upper = normal_lower + d3;
            let het_dup = normal_upper + d4;
            Thresholds {
                homozygous_deletion: hd,
                heterozygous_deletion: het_del,
                normal_lower,
                normal_upper,
                heterozygous_duplication: het_dup,
                homozygous_duplication: het_dup + d5,
            }
        })
}

proptest! {
    #[test]
    fn ordered_sets_call_every_finite_z(t in ordered_thresholds(), z in -15.0f64..15.0) {
        prop_assume!(t.is_ordered());
        let table = t.interval_table();
        let hits = table.buckets().iter().filter(|b| b.contains(z)).count();
        prop_assert_eq!(hits, 1);

        let mut set = default_set();
        set.thresholds = t;
        let policy = CallerPolicy::default_v1();
        let caller = CopyNumberCaller::new(&set, &policy);
        let (cn, conf, basis) = caller.call_z(z);
        prop_assert_eq!(cn, t.classify(z));
        prop_assert_eq!(basis, CallBasis::Interval);
        prop_assert!((0.1..=1.0).contains(&conf));
    }

    #[test]
    fn ordered_sets_call_their_own_edges(t in ordered_thresholds()) {
        prop_assume!(t.is_ordered());
        let mut set = default_set();
        set.thresholds = t;
        let policy = CallerPolicy::default_v1();
        let caller = CopyNumberCaller::new(&set, &policy);
        for z in t.as_array() {
            let (cn, _, basis) = caller.call_z(z);
            prop_assert_eq!(cn, t.classify(z));
            prop_assert_eq!(basis, CallBasis::Interval);
        }
    }
}
