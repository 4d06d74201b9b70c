//! routelb - route labelled requests through a pluggable selection engine
//!
//! Usage:
//!     routelb --config <path> [--requests N] [--concurrency C]
//!     routelb --config <path> --watch [--interval 250ms]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use routelb::config::{Config, ConfigWatcher, load_config};
use routelb::state::AppState;
use routelb::util::{RequestId, init_logging};

/// Route requests across a server pool with a hot-swappable strategy.
#[derive(Parser, Debug)]
#[command(name = "routelb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Number of requests to route
    #[arg(short = 'n', long, default_value_t = 100)]
    requests: usize,

    /// Number of concurrent routing tasks
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Keep routing and reload the configuration when it changes
    #[arg(long)]
    watch: bool,

    /// Delay between requests in watch mode (e.g. 250ms, 1s)
    #[arg(long, default_value = "500ms", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Print Prometheus metrics before exiting
    #[arg(long)]
    metrics: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    // CLI overrides config
    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.global.log_level);
    init_logging(log_level, &config.global.log_format);

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!(
            "  Strategy: {:?} ({:?})",
            config.strategy.algorithm, config.strategy.weighted_mode
        );
        println!("  Servers: {}", config.servers.len());
        for server in &config.servers {
            println!(
                "    - {} -> {} [power {}]",
                server.name, server.endpoint, server.processing_power
            );
        }
        return Ok(());
    }

    info!(
        config_path = %cli.config.display(),
        servers = config.servers.len(),
        algorithm = ?config.strategy.algorithm,
        "routelb starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let state = AppState::new(&config).context("failed to build server pool")?;

    if cli.watch {
        watch(&cli, &state).await;
    } else {
        route_batch(&state, cli.requests, cli.concurrency).await?;
    }

    print_status(&state);
    if cli.metrics {
        let text = state.metrics().encode().context("failed to encode metrics")?;
        print!("{text}");
    }

    Ok(())
}

/// Route `requests` labelled requests from `concurrency` tasks.
async fn route_batch(state: &AppState, requests: usize, concurrency: usize) -> Result<()> {
    let workers = concurrency.max(1);
    let mut tasks = JoinSet::new();

    for worker in 0..workers {
        let state = state.clone();
        // Spread the remainder over the first workers.
        let share = requests / workers + usize::from(worker < requests % workers);
        tasks.spawn(async move {
            let mut failed = 0usize;
            for _ in 0..share {
                let request = RequestId::short();
                match state.route(request.as_str()) {
                    Ok(decision) => info!(
                        request = %decision.request,
                        server = %decision.server,
                        endpoint = %decision.endpoint,
                        "routing decision"
                    ),
                    Err(e) => {
                        warn!(request = %request, error = %e, "routing failed");
                        failed += 1;
                    }
                }
            }
            failed
        });
    }

    let mut failed = 0;
    while let Some(result) = tasks.join_next().await {
        failed += result.context("routing task panicked")?;
    }

    info!(requests, failed, "batch complete");
    Ok(())
}

/// Route one request per interval until Ctrl+C, hot-reloading the config.
async fn watch(cli: &Cli, state: &AppState) {
    let reload_state = state.clone();
    let watcher = ConfigWatcher::new(
        cli.config.clone(),
        Box::new(move |config| reload_state.apply_config(&config)),
    );
    let watcher_handle = tokio::spawn(watcher.run(state.shutdown().subscribe()));

    let mut ticker = tokio::time::interval(cli.interval);
    info!("routelb is running, press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let request = RequestId::short();
                match state.route(request.as_str()) {
                    Ok(decision) => info!(
                        request = %decision.request,
                        server = %decision.server,
                        endpoint = %decision.endpoint,
                        "routing decision"
                    ),
                    Err(e) => warn!(request = %request, error = %e, "routing failed"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("received shutdown signal"),
                    Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
                }
                break;
            }
        }
    }

    state.trigger_shutdown();
    let _ = watcher_handle.await;
    info!("routelb shut down complete");
}

fn print_status(state: &AppState) {
    println!("Strategy: {}", state.context().strategy_name());
    for server in state.status() {
        println!("  {:<20} {}", server.name, server.active_requests);
    }
}
