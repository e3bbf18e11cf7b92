//! ReplayLab CLI: run and sweep commands.
//!
//! Commands:
//! - `run`: execute one backtest from a TOML/JSON config and print a summary
//! - `sweep`: run a parameter grid in parallel and print a ranked table

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use replaylab_runner::{
    load_csv, run_backtest, short_id, write_artifacts, BacktestConfig, BacktestResult, ParamGrid,
    ParamSweep, SweepResults,
};

#[derive(Parser)]
#[command(
    name = "replaylab",
    version,
    about = "ReplayLab, event-driven backtesting over historical bars"
)]
struct Cli {
    /// Log filter (e.g. info, debug, replaylab_core=trace). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a config file.
    Run {
        /// Path to a TOML (or .json) config file.
        #[arg(long)]
        config: PathBuf,

        /// Write result.json, equity.csv and trades.csv here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Run a parameter grid over the config's active strategy.
    Sweep {
        /// Path to a TOML (or .json) config file.
        #[arg(long)]
        config: PathBuf,

        /// Swept parameter as name=v1,v2,... (repeatable).
        #[arg(long = "param", value_name = "NAME=V1,V2,...")]
        params: Vec<String>,

        /// Only print the best N runs.
        #[arg(long)]
        top: Option<usize>,

        /// Run combinations one after another instead of in parallel.
        #[arg(long, default_value_t = false)]
        serial: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Run { config, output_dir } => run_cmd(&config, output_dir.as_deref()),
        Commands::Sweep {
            config,
            params,
            top,
            serial,
        } => sweep_cmd(&config, &params, top, serial),
    }
}

/// Install the global fmt subscriber. `--log-level` wins over RUST_LOG;
/// with neither, only warnings and errors are shown.
fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid --log-level '{level}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(path: &Path) -> Result<BacktestConfig> {
    let config = BacktestConfig::from_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    debug!(
        path = %path.display(),
        csv = %config.data.csv_path.display(),
        symbol = %config.data.symbol,
        "config loaded"
    );
    Ok(config)
}

fn run_cmd(config_path: &Path, output_dir: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let result = run_backtest(&config).context("backtest failed")?;

    print_summary(&result);

    if let Some(dir) = output_dir {
        write_artifacts(dir, &result)?;
        println!("Artifacts saved to: {}", dir.display());
    }
    Ok(())
}

fn sweep_cmd(config_path: &Path, params: &[String], top: Option<usize>, serial: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let grid = ParamGrid::parse(params).context("invalid --param")?;
    let bars = load_csv(&config.data.csv_path, &config.data.symbol)?;

    let results = ParamSweep::new()
        .with_parallelism(!serial)
        .sweep(&config, &grid, &bars)
        .context("sweep failed")?;

    print_sweep_table(&results, top);
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let t = &result.tearsheet;
    let s = &result.stats;
    println!();
    println!("=== Backtest Result ===");
    println!("Run ID:         {}", short_id(&result.run_id));
    println!("Symbol:         {}", result.symbol);
    println!("Strategy:       {}", result.strategy.name());
    if let (Some(first), Some(last)) = (result.equity_curve.first(), result.equity_curve.last()) {
        println!("Period:         {} to {}", first.timestamp, last.timestamp);
    }
    println!("Bars:           {}", result.bar_count);
    println!("Signals:        {}", result.signal_count());
    println!("Fills:          {}", result.fill_count());
    println!();
    println!("--- Performance ---");
    println!("Final Equity:   {:.2}", t.final_equity);
    println!("Total Return:   {:.2}%", t.total_return_pct);
    println!("Sharpe:         {:.3}", t.sharpe);
    println!("Max Drawdown:   {:.2}%", t.max_drawdown_pct);
    println!("Win Rate:       {:.1}%", t.win_rate_pct);
    println!("Profit Factor:  {:.2}", t.profit_factor);
    println!("Wins/Losses:    {}/{}", s.wins, s.losses);
    println!("Total Fees:     {:.2}", s.total_fees);
    println!();
}

fn print_sweep_table(results: &SweepResults, top: Option<usize>) {
    let shown = top.unwrap_or(results.len()).min(results.len());
    println!();
    println!("=== Sweep Results ({} runs, best {shown}) ===", results.len());
    println!(
        "{:>4}  {:<12}  {:<40}  {:>9}  {:>8}  {:>8}  {:>6}",
        "#", "run", "params", "return%", "sharpe", "maxdd%", "fills"
    );
    for (rank, result) in results.ranked().iter().take(shown).enumerate() {
        let params = serde_json::to_string(&result.strategy).unwrap_or_default();
        let t = &result.tearsheet;
        println!(
            "{:>4}  {:<12}  {:<40}  {:>9.2}  {:>8.3}  {:>8.2}  {:>6}",
            rank + 1,
            short_id(&result.run_id),
            params,
            t.total_return_pct,
            t.sharpe,
            t.max_drawdown_pct,
            result.fill_count()
        );
    }
    println!();
}
