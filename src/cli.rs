//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};

use crate::adapters::csv_adapter::{read_csv, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::domain::config::SimulationMode;
use crate::domain::error::SigbenchError;
use crate::domain::montecarlo::{
    AggregateStatistics, CancellationToken, MonteCarloEngine, MonteCarloReport, PathSource,
};
use crate::domain::pipeline::{PipelineOutcome, SignalPipeline};
use crate::domain::settings::{load_pipeline, load_settings, Settings};
use crate::ports::data_port::TimeRange;

#[derive(Parser, Debug)]
#[command(name = "sigbench", about = "Indicator signal scoring and Monte Carlo trade validation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score the latest bar of a candle file
    Signal {
        /// CSV file named <symbol>_<interval>.csv
        #[arg(short, long)]
        data: PathBuf,
        /// Optional INI file supplying the [pipeline] section
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run a Monte Carlo simulation
    Montecarlo {
        #[arg(short, long)]
        config: PathBuf,
        /// Candle history, required in empirical mode
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Signal { data, config } => {
            run_signal(&data, config.as_deref()).map(|outcome| print_signal(&outcome))
        }
        Command::Montecarlo { config, data } => run_montecarlo(&config, data.as_deref())
            .map(|report| print_statistics(&report.statistics)),
        Command::Validate { config } => {
            run_validate(&config).map(|settings| print_settings(&settings))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(&e)
        }
    }
}

/// Split `<dir>/<symbol>_<interval>.csv` into its directory, symbol and interval.
pub fn series_location(path: &Path) -> Result<(PathBuf, String, String), SigbenchError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SigbenchError::Data {
            reason: format!("invalid data file name {}", path.display()),
        })?;
    let (symbol, interval) = stem.rsplit_once('_').ok_or_else(|| SigbenchError::Data {
        reason: format!("data file {} is not named <symbol>_<interval>.csv", path.display()),
    })?;
    if symbol.is_empty() || interval.is_empty() {
        return Err(SigbenchError::Data {
            reason: format!("data file {} is not named <symbol>_<interval>.csv", path.display()),
        });
    }
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, symbol.to_string(), interval.to_string()))
}

pub fn run_signal(data: &Path, config: Option<&Path>) -> Result<PipelineOutcome, SigbenchError> {
    let (dir, symbol, interval) = series_location(data)?;
    let pipeline_config = match config {
        Some(path) => load_pipeline(&FileConfigAdapter::from_file(path)?)?,
        None => Default::default(),
    };

    let adapter = CsvAdapter::new(dir);
    let notifier = LogNotifier::new("signals");
    let mut pipeline = SignalPipeline::new(&adapter)
        .with_notifier(&notifier)
        .with_config(pipeline_config);
    pipeline.run(&symbol, &interval, TimeRange::all())
}

pub fn run_montecarlo(
    config: &Path,
    data: Option<&Path>,
) -> Result<MonteCarloReport, SigbenchError> {
    info!(config = %config.display(), "loading config");
    let settings = load_settings(&FileConfigAdapter::from_file(config)?)?;
    let engine =
        MonteCarloEngine::new(settings.montecarlo.clone()).with_parallelism(settings.parallel);

    let progress = |fraction: f64| debug!(progress = fraction, "path completed");
    let cancel = CancellationToken::new();

    match settings.montecarlo.mode {
        SimulationMode::Parametric => {
            let params = settings.parametric.ok_or_else(|| SigbenchError::ConfigMissing {
                section: "parametric".into(),
                key: "win_rate".into(),
            })?;
            engine.run_with_progress(&PathSource::Parametric(params), &cancel, progress)
        }
        SimulationMode::Empirical => {
            let params = settings.empirical.ok_or_else(|| SigbenchError::ConfigMissing {
                section: "empirical".into(),
                key: "block_size".into(),
            })?;
            let path = data.ok_or_else(|| SigbenchError::Data {
                reason: "empirical mode needs a candle file (--data)".into(),
            })?;
            let history = read_csv(path)?;
            info!(bars = history.len(), file = %path.display(), "loaded history");
            engine.run_with_progress(
                &PathSource::Empirical {
                    params,
                    history: &history,
                },
                &cancel,
                progress,
            )
        }
    }
}

pub fn run_validate(config: &Path) -> Result<Settings, SigbenchError> {
    load_settings(&FileConfigAdapter::from_file(config)?)
}

fn print_signal(outcome: &PipelineOutcome) {
    let snap = &outcome.snapshot;
    println!("Direction:          {}", outcome.direction);
    println!("Confidence:         {:.4}", outcome.confidence);
    println!("Raw confidence:     {:.4}", outcome.signal.confidence);
    println!("Regime score:       {:.4}", outcome.adjustment.regime_score);
    println!("Volatility spike:   {}", outcome.adjustment.volatility_spike);
    println!("RSI:                {:.2}", snap.rsi);
    println!("MACD histogram:     {:.4}", snap.macd.histogram);
    println!("ADX:                {:.2}", snap.adx);
    println!("ATR:                {:.4}", snap.atr);
    println!("Trend strength:     {:.4}", snap.trend_strength);
}

fn print_statistics(stats: &AggregateStatistics) {
    println!("Paths:              {}/{}", stats.completed_paths, stats.requested_paths);
    if stats.failed_paths > 0 {
        println!("Failed paths:       {}", stats.failed_paths);
    }
    println!("Mean final balance: {:.2}", stats.mean_final_balance);
    println!("Median:             {:.2}", stats.median_final_balance);
    println!("5th percentile:     {:.2}", stats.confidence95);
    println!(
        "Best / worst:       {:.2} / {:.2}",
        stats.best_final_balance, stats.worst_final_balance
    );
    println!("Mean max drawdown:  {:.1}%", stats.mean_max_drawdown * 100.0);
    println!("Worst drawdown:     {:.1}%", stats.worst_max_drawdown * 100.0);
    println!("Mean Sharpe:        {:.2}", stats.mean_sharpe);
    println!("Trades:             {}", stats.total_trades);
    println!("Win rate:           {:.1}%", stats.win_rate * 100.0);
    println!("Max losing streak:  {}", stats.max_consecutive_losses);
    println!("P(profit):          {:.1}%", stats.probability_of_profit * 100.0);
}

fn print_settings(settings: &Settings) {
    let mc = &settings.montecarlo;
    println!("Config validated successfully");
    println!("  mode:            {}", mc.mode);
    println!("  paths:           {}", mc.num_paths);
    println!("  seed:            {}", mc.seed);
    println!("  initial balance: {:.2}", mc.initial_balance);
    println!("  parallel:        {}", settings.parallel);
}
