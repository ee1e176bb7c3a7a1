//! dvfssim - Run energy-aware EDF simulations from task files.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use dvfs_simulator::{
    init_tracing, load_tasks, parse_task, save_schedule, task_id_at, ProcessorParams, Scenario,
    Simulator, TaskDef,
};

mod report;

/// Run energy-aware EDF simulations on a single DVFS processor.
///
/// Processor parameters resolve as: command-line flag, then DVFS_SIM_*
/// environment variable, then --config file, then built-in default.
#[derive(Parser)]
#[command(name = "dvfssim", version)]
struct Cli {
    /// Task file: one `release,deadline,workload[; deps]` per line.
    tasks: Option<PathBuf>,

    /// Inline task definition `R,D,W[; deps]`, appended after file tasks.
    #[arg(short, long = "task", value_name = "R,D,W")]
    task: Vec<String>,

    /// TOML file with processor parameters.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Minimum sustained frequency.
    #[arg(long)]
    f_min: Option<f64>,

    /// Maximum frequency.
    #[arg(long)]
    f_max: Option<f64>,

    /// Energy exponent (power = f^alpha).
    #[arg(long)]
    alpha: Option<f64>,

    /// Re-evaluation quantum.
    #[arg(long)]
    dt: Option<f64>,

    /// Absolute time cutoff.
    #[arg(long)]
    horizon: Option<f64>,

    /// Write the schedule to a text file.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Coalesce back-to-back slices of a task at the same frequency in the
    /// printed and exported schedule.
    #[arg(long)]
    merge: bool,

    /// Log every slice through the trace logger.
    #[arg(long)]
    dump_trace: bool,

    /// Print run statistics.
    #[arg(long)]
    stats: bool,

    /// Exit with a non-zero status when the run misses deadlines.
    #[arg(long)]
    strict: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let outcome = install_cancel_handler()
        .and_then(|cancel| run(&cli, cancel, env_var, &mut std::io::stdout().lock()));
    if let Err(e) = &outcome {
        eprintln!("error: {e:#}");
    }
    std::process::exit(exit_code(&outcome, cli.strict));
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn install_cancel_handler() -> Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .context("Error setting Ctrl-C handler")?;
    Ok(cancel)
}

/// Process exit status for a run outcome: 1 when the run could not start,
/// 2 for a failed run under `--strict`, 0 otherwise.
fn exit_code(outcome: &Result<bool>, strict: bool) -> i32 {
    match outcome {
        Err(_) => 1,
        Ok(false) if strict => 2,
        Ok(_) => 0,
    }
}

/// Merge config file, environment and flags, lowest precedence first.
/// Layers are not range-checked on their own; the merged set is checked
/// when the scenario is built.
fn resolve_params<F>(cli: &Cli, lookup: F) -> Result<ProcessorParams>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &cli.config {
        Some(path) => ProcessorParams::read(path)?,
        None => ProcessorParams::default(),
    };
    let mut params = base.with_vars(lookup)?;
    let overrides = [
        (cli.f_min, &mut params.f_min),
        (cli.f_max, &mut params.f_max),
        (cli.alpha, &mut params.alpha),
        (cli.dt, &mut params.dt),
        (cli.horizon, &mut params.horizon),
    ];
    for (flag, field) in overrides {
        if let Some(value) = flag {
            *field = value;
        }
    }
    Ok(params)
}

fn collect_tasks(cli: &Cli) -> Result<Vec<TaskDef>> {
    let mut tasks = match &cli.tasks {
        Some(path) => load_tasks(path)?,
        None => Vec::new(),
    };
    for text in &cli.task {
        let id = task_id_at(tasks.len()).context("too many tasks")?;
        let def = parse_task(text, id).with_context(|| format!("--task {text:?}"))?;
        tasks.push(def);
    }
    if tasks.is_empty() {
        bail!("no tasks given; pass a task file or --task R,D,W");
    }
    Ok(tasks)
}

/// Returns whether the run completed every task.
fn run<F, W>(cli: &Cli, cancel: Arc<AtomicBool>, lookup: F, out: &mut W) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    let params = resolve_params(cli, lookup)?;
    let tasks = collect_tasks(cli)?;
    let scenario = Scenario::new(tasks, params).context("invalid scenario")?;

    let result = Simulator::new().with_cancel(cancel).run(&scenario);

    if cli.dump_trace {
        result.dump();
    }

    let schedule = if cli.merge {
        result.merged_schedule()
    } else {
        result.schedule().to_vec()
    };

    report::print(out, &result, &schedule)?;
    if cli.stats {
        report::print_stats(out, &result)?;
    }

    if let Some(path) = &cli.output {
        save_schedule(path, &schedule)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("wrote schedule to {}", path.display());
    }

    Ok(result.success())
}
