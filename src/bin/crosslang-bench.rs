//! CLI for running and verifying the benchmark suite.
//!
//! Usage:
//!   crosslang-bench                        # Run the default suite
//!   crosslang-bench --config bench.json    # Run a configured suite
//!   crosslang-bench verify                 # Check every language against reference vectors
//!   crosslang-bench fixtures tests/fixtures
//!   crosslang-bench list

use anyhow::{bail, Context};
use crosslang_bench::config::BenchConfig;
use crosslang_bench::executor;
use crosslang_bench::module::{ModuleLoader, NativeLoader};
use crosslang_bench::orchestrator::Orchestrator;
use crosslang_bench::registry::{build_registry, REFERENCE_LANGUAGE};
use crosslang_bench::verify::{self, FixtureSet};
use crosslang_bench::{codec, results, stats, tui};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

enum Command {
    Run,
    Verify,
    Fixtures(PathBuf),
    List,
    Help,
}

struct Args {
    command: Command,
    config: Option<PathBuf>,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
    seed: Option<u32>,
    runs: Option<u32>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut parsed = Args {
        command: Command::Run,
        config: None,
        json: None,
        csv: None,
        seed: None,
        runs: None,
    };

    let mut i = 0;
    let value = |i: &mut usize, flag: &str| -> anyhow::Result<String> {
        *i += 1;
        args.get(*i).cloned().with_context(|| format!("{flag} needs a value"))
    };
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => parsed.command = Command::Help,
            "--config" => parsed.config = Some(value(&mut i, "--config")?.into()),
            "--json" => parsed.json = Some(value(&mut i, "--json")?.into()),
            "--csv" => parsed.csv = Some(value(&mut i, "--csv")?.into()),
            "--seed" => parsed.seed = Some(value(&mut i, "--seed")?.parse().context("--seed")?),
            "--runs" => parsed.runs = Some(value(&mut i, "--runs")?.parse().context("--runs")?),
            "run" => parsed.command = Command::Run,
            "verify" => parsed.command = Command::Verify,
            "list" => parsed.command = Command::List,
            "fixtures" => parsed.command = Command::Fixtures(value(&mut i, "fixtures")?.into()),
            other => bail!("unknown argument `{other}` (see --help)"),
        }
        i += 1;
    }
    Ok(parsed)
}

fn load_config(args: &Args) -> anyhow::Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(runs) = args.runs {
        config.measure_runs = runs;
    }
    config.validate()?;
    Ok(config)
}

fn loader_for(config: &BenchConfig) -> anyhow::Result<Arc<dyn ModuleLoader>> {
    match &config.wasm_dir {
        #[cfg(feature = "wasm")]
        Some(dir) => Ok(Arc::new(crosslang_bench::module::wasm::WasmLoader::new(dir))),
        #[cfg(not(feature = "wasm"))]
        Some(_) => bail!("wasmDir is set but this build lacks the `wasm` feature"),
        None => Ok(Arc::new(NativeLoader::default())),
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    let config = load_config(args)?;
    let loader = loader_for(&config)?;
    let registry = build_registry();

    tui::print_header();
    for task in &config.tasks {
        if let Some(runner) = registry.find(*task) {
            tui::print_task_info_box(runner);
        }
    }

    let mut orchestrator = Orchestrator::new(config.clone(), loader);
    orchestrator.initialize()?;
    let outcome = orchestrator.execute();
    let results = orchestrator.into_results();

    tui::print_results_table(&stats::assess_quality(&results, &config.qc));
    tui::print_comparisons(&stats::compare_languages(&results, &config.qc, &config.statistics));
    let validation = verify::validate_results(&results, config.seed);
    tui::print_validation(&validation);

    if let Some(path) = &args.json {
        results::export_json(path, &results).with_context(|| format!("writing {}", path.display()))?;
        println!("Results written to {}", path.display());
    }
    if let Some(path) = &args.csv {
        results::export_csv(path, &results).with_context(|| format!("writing {}", path.display()))?;
        println!("Results written to {}", path.display());
    }

    let summary = outcome?;
    println!(
        "{} of {} invocations succeeded ({})",
        summary.succeeded, summary.total, summary.state
    );
    Ok(validation.is_clean())
}

/// Check every compiled-in language through the module ABI
fn verify_all() -> anyhow::Result<bool> {
    let loader = NativeLoader::default();
    let mut all_passed = true;

    for task in loader.registry().all() {
        let vectors = task.reference_vectors();
        for language in task.available_languages() {
            let report = verify::verify_implementation(task.kind(), language, &vectors, |params| {
                let mut module = loader.load(task.kind(), language)?;
                Ok(executor::invoke(module.as_mut(), &codec::encode(params))?.hash)
            });
            tui::print_verification(&report);
            all_passed &= report.is_success();
        }
    }
    Ok(all_passed)
}

fn write_fixtures(dir: &Path) -> anyhow::Result<()> {
    for task in build_registry().all() {
        let path = dir.join(format!("{}.json", task.name()));
        FixtureSet::new(task.kind(), REFERENCE_LANGUAGE, task.reference_vectors())
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let ok = match &args.command {
        Command::Help => {
            tui::print_help();
            true
        }
        Command::List => {
            tui::print_available_tasks(&build_registry());
            true
        }
        Command::Fixtures(dir) => {
            write_fixtures(dir)?;
            true
        }
        Command::Verify => verify_all()?,
        Command::Run => run(&args)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
