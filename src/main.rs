//! pi_thermolog - Raspberry Pi Temperature Logger Binary
//!
//! Logs the SoC temperature every few seconds until interrupted.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pi_thermolog::{
    CommandSampler, DatedRotation, Monitor, MonitorConfig, RotationPolicy, TimedRotation,
    Timezone,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "pi_thermolog")]
#[command(about = "🌡️  pi_thermolog - Raspberry Pi temperature logger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Austin Couch")]
#[command(long_about = "Samples the SoC temperature on a fixed interval and writes it to a rotating log")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between readings
    #[arg(short, long)]
    interval: Option<u64>,

    /// Timestamp in UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Log rotation policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log temperature until interrupted (default)
    Run,

    /// Take a single reading and exit
    Sample(SampleArgs),

    /// Print the effective configuration
    Config,
}

#[derive(Args)]
struct SampleArgs {
    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// One active file rolled over at midnight, old days kept as backups
    Timed,
    /// One file per date in the log directory
    Dated,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    init_logging(&cli)?;

    let config = load_config(&cli)?;

    match &cli.command {
        None | Some(Commands::Run) => run_command(config).await?,
        Some(Commands::Sample(args)) => sample_command(config, args).await?,
        Some(Commands::Config) => print!("{}", config.to_toml()?),
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Diagnostics go to stderr; stdout carries the log lines
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Defaults, then the config file, then command line flags.
fn load_config(cli: &Cli) -> anyhow::Result<MonitorConfig> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    if let Some(interval) = cli.interval {
        config = config.with_interval_secs(interval);
    }
    if cli.utc {
        config = config.with_timezone(Timezone::Utc);
    }
    if let Some(policy) = cli.policy {
        // Keep file settings when the requested policy is already configured
        let is_dated = matches!(config.rotation, RotationPolicy::Dated(_));
        if policy == PolicyArg::Timed && is_dated {
            config = config.with_rotation(RotationPolicy::Timed(TimedRotation::default()));
        } else if policy == PolicyArg::Dated && !is_dated {
            config = config.with_rotation(RotationPolicy::Dated(DatedRotation::default()));
        }
    }
    if let Some(dir) = &cli.log_dir {
        config = config.with_log_directory(dir);
    }

    config.validate()?;
    Ok(config)
}

fn print_banner() {
    eprintln!("🌡️  pi_thermolog - Raspberry Pi temperature logger");
    eprintln!("   Version: {}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Press Ctrl-C to stop");
    eprintln!();
}

async fn run_command(config: MonitorConfig) -> anyhow::Result<()> {
    print_banner();

    let sampler =
        CommandSampler::from_command(&config.command)?.with_timeout(config.command_timeout());

    // Install handlers before the first reading so an early Ctrl-C still
    // shuts down cleanly
    let shutdown = shutdown_signal()?;

    let mut monitor = Monitor::new(config, sampler);
    let summary = monitor.run(shutdown).await.context("Temperature monitor failed")?;

    info!(
        "Stopped after {} readings ({} failed samples, {} rotations)",
        summary.readings, summary.sample_failures, summary.rotations
    );
    Ok(())
}

async fn sample_command(config: MonitorConfig, args: &SampleArgs) -> anyhow::Result<()> {
    let sampler =
        CommandSampler::from_command(&config.command)?.with_timeout(config.command_timeout());
    let mut monitor = Monitor::new(config, sampler);
    let reading = monitor.read_once().await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&reading)?),
        "pretty" => println!("{}", reading),
        other => anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other),
    }

    Ok(())
}

#[cfg(unix)]
fn shutdown_signal() -> anyhow::Result<impl std::future::Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
            }
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> anyhow::Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
        }
    })
}
