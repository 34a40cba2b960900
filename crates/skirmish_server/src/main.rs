//! Headless skirmish runner.
//!
//! Hosts one match between two scripted agents and prints the match report
//! as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Rush against an economic opponent at default speed
//! cargo run -p skirmish_server -- --red rush --blue economic
//!
//! # Fast match from a config file with debug logs
//! cargo run -p skirmish_server -- --config match.ron --speed 64 --verbose
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_core::components::Owner;
use skirmish_core::config::MatchConfig;
use skirmish_server::agent::{spawn_agent, Strategy};
use skirmish_server::error::ServerResult;
use skirmish_server::registry::MatchRegistry;
use skirmish_server::ServerConfig;

#[derive(Parser)]
#[command(name = "skirmish-server")]
#[command(about = "Run a headless skirmish between scripted agents")]
#[command(version)]
struct Cli {
    /// RON match config to load
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticks per second (overrides the config)
    #[arg(long)]
    speed: Option<u32>,

    /// Spawn placement seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Strategy played by RED
    #[arg(long, value_enum, default_value_t = Strategy::Rush)]
    red: Strategy,

    /// Strategy played by BLUE
    #[arg(long, value_enum, default_value_t = Strategy::Economic)]
    blue: Strategy,

    /// Host frames per second
    #[arg(long, default_value = "120")]
    fps: u32,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Match failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> ServerResult<String> {
    let mut config = match &cli.config {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.speed = speed;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let config = config.normalized();

    let server = ServerConfig {
        fps: cli.fps,
        ..ServerConfig::default()
    };
    let registry = MatchRegistry::with_server_config(server);
    let (host, handle) = registry.create(config).await;
    tracing::info!(
        match_id = %handle.match_id(),
        blue = ?cli.blue,
        red = ?cli.red,
        "Hosting match"
    );

    let agents = [
        spawn_agent(&handle, Owner::Blue, cli.blue.agent()),
        spawn_agent(&handle, Owner::Red, cli.red.agent()),
    ];

    let report = host.run(server.frame_interval()).await;
    for agent in agents {
        if let Err(e) = agent.await {
            tracing::warn!(error = %e, "Agent task failed");
        }
    }
    registry.remove(report.match_id).await;

    report.to_json()
}
