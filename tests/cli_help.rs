use assert_cmd::Command;
use clap::Parser;
use kira_smncnv::cli::{Cli, Commands, ThresholdsCommand};

#[test]
fn cli_help_smoke() {
    let mut cmd = Command::cargo_bin("kira-smncnv").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn run_defaults() {
    let cli = Cli::parse_from(["kira-smncnv", "run", "--depth", "d.tsv", "--out", "out"]);
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.min_depth, 10.0);
            assert!(!args.no_fallback);
            assert!(!args.force_retrain);
            assert_eq!(args.threads, 0);
            assert!(args.threshold_dir.is_none());
            assert!(args.truth.is_none());
        }
        _ => panic!("expected run command"),
    }
}

#[test]
fn thresholds_show_parses_version() {
    let cli = Cli::parse_from([
        "kira-smncnv",
        "thresholds",
        "show",
        "--threshold-dir",
        "store",
        "--version",
        "3",
    ]);
    match cli.command {
        Commands::Thresholds(args) => match args.command {
            ThresholdsCommand::Show(show) => {
                assert_eq!(show.version, Some(3));
                assert!(!show.history);
            }
        },
        _ => panic!("expected thresholds command"),
    }
}
