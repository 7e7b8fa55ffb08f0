use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kira_smncnv::cli::{Cli, Commands, ThresholdsCommand, ThresholdsShowArgs};
use kira_smncnv::ctx::Ctx;
use kira_smncnv::depth::SampleType;
use kira_smncnv::io;
use kira_smncnv::pipeline::Pipeline;
use kira_smncnv::pipeline::stage1_input::Stage1Input;
use kira_smncnv::pipeline::stage2_normalize::Stage2Normalize;
use kira_smncnv::pipeline::stage3_fallback::Stage3Fallback;
use kira_smncnv::policy::CallerPolicy;
use kira_smncnv::thresholds::{ThresholdSet, ThresholdStore};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let mut policy = CallerPolicy::default_v1();
            policy.min_depth = args.min_depth;
            policy.fallback_enabled = !args.no_fallback;

            let threshold_dir = args
                .threshold_dir
                .clone()
                .unwrap_or_else(|| args.out.join("thresholds"));
            let mut ctx = Ctx::new(
                args.depth,
                args.out,
                threshold_dir,
                args.truth,
                args.region_counts,
                policy,
                args.json,
                args.tsv,
            );
            ctx.threads = args.threads;
            ctx.force_retrain = args.force_retrain;

            Pipeline::full().run(&mut ctx)?;

            print_summary(&ctx)?;
        }
        Commands::Thresholds(args) => match args.command {
            ThresholdsCommand::Show(show) => handle_thresholds_show(show)?,
        },
        Commands::Validate(args) => {
            let mut ctx = Ctx::new(
                args.depth,
                PathBuf::from("."),
                PathBuf::from("."),
                args.truth,
                args.region_counts,
                CallerPolicy::default_v1(),
                false,
                false,
            );

            let pipeline = Pipeline::new(vec![
                Box::new(Stage1Input::new()),
                Box::new(Stage2Normalize::new()),
                Box::new(Stage3Fallback::new()),
            ]);
            pipeline.run(&mut ctx)?;

            print_validate_summary(&ctx)?;
        }
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    print_warnings(ctx);
    Ok(())
}

fn print_warnings(ctx: &Ctx) {
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
}

fn print_validate_summary(ctx: &Ctx) -> Result<()> {
    let batch = ctx.batch.as_ref().context("depth batch missing")?;
    println!("kira-smncnv validate ok");
    println!("samples: {}", batch.by_sample().len());
    println!("reference: {}", batch.count_samples(SampleType::Reference));
    println!("records: {}", batch.records.len());
    println!("exons: {}", batch.exon_ids().join(","));
    if let Some(truth) = &ctx.truth {
        println!("truth labels: {}", truth.labels.len());
    }
    let activated = ctx.fallback.values().filter(|o| o.fallback_used).count();
    println!("fallback needed: {}", activated);
    print_warnings(ctx);
    Ok(())
}

fn handle_thresholds_show(args: ThresholdsShowArgs) -> Result<()> {
    let store = ThresholdStore::open(&args.threshold_dir);
    if args.history {
        let history = store.history()?;
        if history.is_empty() {
            println!("threshold store {} is empty", store.dir().display());
        }
        for set in &history {
            print_threshold_line(set);
        }
        return Ok(());
    }
    let set = match args.version {
        Some(v) => store.load_version(v)?,
        None => match store.load_current()? {
            Some(set) => set,
            None => {
                println!(
                    "threshold store {} is empty, built-in defaults apply",
                    store.dir().display()
                );
                ThresholdSet::builtin_default()
            }
        },
    };
    println!("{}", serde_json::to_string_pretty(&set)?);
    Ok(())
}

fn print_threshold_line(set: &ThresholdSet) {
    let t = set.thresholds.as_array();
    let mcc = set
        .performance
        .as_ref()
        .map_or("-".to_string(), |p| format!("{:.4}", p.mcc));
    println!(
        "v{:03}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{}\t{}",
        set.version,
        set.created_at.to_rfc3339(),
        t[0],
        t[1],
        t[2],
        t[3],
        t[4],
        t[5],
        mcc,
        if set.is_initial { "initial" } else { "trained" }
    );
}
