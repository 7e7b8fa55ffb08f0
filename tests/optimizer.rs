use kira_smncnv::normalize::ZScoreRecord;
use kira_smncnv::policy::CallerPolicy;
use kira_smncnv::thresholds::ThresholdStore;
use kira_smncnv::thresholds::optimizer::{
    Observation, OptimizeOutcome, Scored, SkipReason, candidates, evaluate, optimize,
    pair_observations, prefer, retrain, should_retrain,
};
use kira_smncnv::thresholds::truth::TruthLabel;
use kira_smncnv::thresholds::{DEFAULT_THRESHOLDS, Thresholds};
use tempfile::TempDir;

fn separable(n_samples: usize) -> Vec<Observation> {
    let z_by_class = [-4.0, -2.5, 0.0, 2.6, 4.0];
    (0..n_samples)
        .map(|i| {
            let class = i % 5;
            Observation {
                sample_id: format!("S{:02}", i),
                exon_id: "SMN1_exon7".to_string(),
                z_score: z_by_class[class],
                truth: class as u8,
            }
        })
        .collect()
}

#[test]
fn grid_has_canonical_ranks() {
    let grid = candidates();
    assert_eq!(grid.len(), 8 * 6 * 6 * 6);
    assert!(grid.iter().enumerate().all(|(i, c)| c.rank == i));
    let first = grid[0].thresholds;
    assert_eq!(first.homozygous_deletion, -3.5);
    assert_eq!(first.heterozygous_deletion, -2.0);
    assert_eq!(first.normal_lower, -1.0);
    assert_eq!(first.normal_upper, 1.0);
    assert_eq!(first.heterozygous_duplication, 2.0);
    assert_eq!(first.homozygous_duplication, 3.0);
    let last = grid[grid.len() - 1].thresholds;
    assert_eq!(last.homozygous_deletion, -1.75);
    assert_eq!(last.heterozygous_deletion, -0.75);
    assert_eq!(last.normal_upper, 2.25);
    assert_eq!(last.heterozygous_duplication, 3.25);
}

#[test]
fn ties_go_to_the_earliest_candidate() {
    let obs = separable(10);
    let outcome = optimize(&obs, &CallerPolicy::default_v1(), 4).unwrap();
    let OptimizeOutcome::Optimized {
        thresholds,
        performance,
    } = outcome
    else {
        panic!("expected optimization");
    };
    assert_eq!(
        thresholds,
        Thresholds {
            homozygous_deletion: -3.5,
            heterozygous_deletion: -2.0,
            normal_lower: -1.0,
            normal_upper: 1.0,
            heterozygous_duplication: 2.75,
            homozygous_duplication: 3.75,
        }
    );
    assert!((performance.mcc - 1.0).abs() < 1e-12);
    assert_eq!(performance.n_samples, 10);
    assert_eq!(performance.n_observations, 10);
}

#[test]
fn thread_count_does_not_change_the_winner() {
    let obs = separable(25);
    let policy = CallerPolicy::default_v1();
    let a = optimize(&obs, &policy, 1).unwrap();
    let b = optimize(&obs, &policy, 8).unwrap();
    assert_eq!(a, b);
}

#[test]
fn prefer_is_order_independent() {
    let t = DEFAULT_THRESHOLDS;
    let scored = vec![
        Scored { rank: 7, mcc: 0.8, thresholds: t },
        Scored { rank: 3, mcc: 0.9, thresholds: t },
        Scored { rank: 1, mcc: 0.5, thresholds: t },
        Scored { rank: 9, mcc: 0.9, thresholds: t },
        Scored { rank: 5, mcc: 0.9, thresholds: t },
    ];
    let forward = scored.iter().copied().reduce(prefer).unwrap();
    let backward = scored.iter().rev().copied().reduce(prefer).unwrap();
    assert_eq!(forward.rank, 3);
    assert_eq!(backward.rank, 3);
}

#[test]
fn too_few_samples_skip() {
    let obs = separable(9);
    let outcome = optimize(&obs, &CallerPolicy::default_v1(), 1).unwrap();
    assert_eq!(
        outcome,
        OptimizeOutcome::Skipped {
            reason: SkipReason::InsufficientSamples {
                found: 9,
                required: 10
            }
        }
    );
}

#[test]
fn constant_truth_skips() {
    let mut obs = separable(12);
    for o in &mut obs {
        o.truth = 2;
    }
    let outcome = optimize(&obs, &CallerPolicy::default_v1(), 1).unwrap();
    assert_eq!(
        outcome,
        OptimizeOutcome::Skipped {
            reason: SkipReason::ConstantTruth
        }
    );
}

#[test]
fn pairing_is_an_inner_join() {
    let zscores = vec![
        ZScoreRecord {
            sample_id: "A".into(),
            exon_id: "SMN1_exon7".into(),
            z_score: -1.0,
        },
        ZScoreRecord {
            sample_id: "A".into(),
            exon_id: "SMN1_exon8".into(),
            z_score: -1.2,
        },
        ZScoreRecord {
            sample_id: "B".into(),
            exon_id: "SMN1_exon7".into(),
            z_score: 0.1,
        },
    ];
    let labels = vec![
        TruthLabel {
            sample_id: "A".into(),
            exon_id: "SMN1_exon8".into(),
            copy_number: 1,
            confidence: None,
        },
        TruthLabel {
            sample_id: "C".into(),
            exon_id: "SMN1_exon7".into(),
            copy_number: 2,
            confidence: None,
        },
    ];
    let obs = pair_observations(&zscores, &labels);
    assert_eq!(obs.len(), 1);
    assert_eq!(obs[0].sample_id, "A");
    assert_eq!(obs[0].exon_id, "SMN1_exon8");
    assert_eq!(obs[0].truth, 1);
}

#[test]
fn evaluate_reports_confusion_matrix() {
    let obs = separable(10);
    let perf = evaluate(&DEFAULT_THRESHOLDS, &obs);
    assert_eq!(perf.confusion_matrix.len(), 5);
    let total: u64 = perf.confusion_matrix.iter().flatten().sum();
    assert_eq!(total, 10);
    // z=2.6 lands in class 4 under the defaults
    assert_eq!(perf.confusion_matrix[3][4], 2);
}

#[test]
fn retrain_appends_a_version() {
    let tmp = TempDir::new().unwrap();
    let store = ThresholdStore::open(tmp.path());
    let obs = separable(10);
    let set = retrain(&store, &obs, "abc123", &CallerPolicy::default_v1(), 2)
        .unwrap()
        .unwrap();
    assert_eq!(set.version, 1);
    assert!(!set.is_initial);
    assert_eq!(set.source_hash.as_deref(), Some("abc123"));
    assert!(set.performance.is_some());

    let current = store.load_current().unwrap();
    assert_eq!(current.as_ref(), Some(&set));
    assert!(!should_retrain(current.as_ref(), "abc123", false));
    assert!(should_retrain(current.as_ref(), "abc123", true));
    assert!(should_retrain(current.as_ref(), "def456", false));
    assert!(should_retrain(None, "abc123", false));
}

#[test]
fn skipped_retrain_leaves_store_untouched() {
    let tmp = TempDir::new().unwrap();
    let store = ThresholdStore::open(tmp.path());
    let obs = separable(4);
    let out = retrain(&store, &obs, "abc", &CallerPolicy::default_v1(), 1).unwrap();
    assert!(out.is_none());
    assert!(store.versions().unwrap().is_empty());
}
