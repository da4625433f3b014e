use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use idle_cpu::config::{parse_millis, Backend, Config};
use idle_cpu::trace::{load_trace, locate_processes};
use idle_cpu::{IdleCpuEstimator, Sampler};

#[derive(Parser)]
#[command(name = "idle-cpu")]
#[command(about = "Estimate idle CPU usage of the browser processes in a Chrome trace")]
struct Cli {
    /// Default log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample every browser process found in the trace and report its idle CPU usage
    Measure {
        /// Path to the JSON trace file
        #[arg(short, long)]
        trace: PathBuf,

        /// JSON config file; command line options override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Sampling backend: command or procfs
        #[arg(short, long)]
        backend: Option<String>,

        /// Sampler executable, called as `<command> <pid> <samples> <window_ms>`
        #[arg(long)]
        command: Option<PathBuf>,

        /// Delay before sampling starts (e.g., 1000, 1s, 500ms)
        #[arg(long)]
        settle: Option<String>,

        /// Number of samples per process
        #[arg(short = 'n', long)]
        samples: Option<u32>,

        /// Length of one sample window (e.g., 2000, 2s)
        #[arg(short, long)]
        window: Option<String>,

        /// Upper bound for one sampler run (e.g., 30s)
        #[arg(long)]
        timeout: Option<String>,

        /// Abort on the first process that cannot be measured
        #[arg(long)]
        fail_fast: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the browser processes found in a trace
    Locate {
        /// Path to the JSON trace file
        #[arg(short, long)]
        trace: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level: tracing::Level = cli
        .log_level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Measure {
            trace,
            config,
            backend,
            command,
            settle,
            samples,
            window,
            timeout,
            fail_fast,
            json,
        } => {
            let mut config = match config {
                Some(path) => Config::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => Config::default(),
            };
            if let Some(backend) = backend {
                config.backend = backend.parse()?;
            }
            if let Some(program) = command {
                if config.backend == Backend::Procfs {
                    anyhow::bail!("--command cannot be used with the procfs backend");
                }
                config.backend = Backend::Command { program };
            }
            if let Some(settle) = settle {
                config.settle_delay_ms = parse_millis(&settle)?;
            }
            if let Some(samples) = samples {
                config.sample_count = samples;
            }
            if let Some(window) = window {
                config.window_ms = parse_millis(&window)?;
            }
            if let Some(timeout) = timeout {
                config.timeout_ms = Some(parse_millis(&timeout)?);
            }
            config.fail_fast |= fail_fast;

            run_measure(config, trace, json).await?;
        }
        Commands::Locate { trace } => {
            let events = load_trace(&trace)?;
            for record in locate_processes(&events) {
                println!("{}\t{}", record.role, record.pid);
            }
        }
    }

    Ok(())
}

async fn run_measure(config: Config, trace: PathBuf, json: bool) -> anyhow::Result<()> {
    info!(
        trace = %trace.display(),
        samples = config.sample_count,
        window_ms = config.window_ms,
        backend = ?config.backend,
        "starting measurement"
    );

    let sampler = Sampler::from(&config.backend);
    let estimator = IdleCpuEstimator::new(config, sampler)?;
    let report = estimator.measure(&trace).await?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{} of {} processes could not be measured", failed, report.processes.len());
    }
    Ok(())
}
