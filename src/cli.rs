use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_state::AppContext;
use crate::config_loader::{load_config, EstimatorConfig};
use crate::inspect::{inspect_dir, inspect_file};

/// Top-level CLI interface
#[derive(Parser)]
#[command(
    name = "estate_estimator",
    version,
    about = "House price estimation form backed by a pre-trained model"
)]
pub struct Cli {
    /// Config file (defaults to estimator.toml or $ESTIMATOR_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the form and prediction endpoints
    Serve {
        /// Host/IP to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Describe artifact files without starting the server
    Inspect {
        /// Directory whose .json files are inspected
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// A single artifact file
        #[arg(short, long, conflicts_with = "dir")]
        file: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

fn init_tracing(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}

/// Run the parsed command and return the process exit code
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(&cfg.log_level);

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            serve(cfg, host, port)?;
            Ok(0)
        }
        Commands::Inspect { dir, file } => {
            let mut stdout = std::io::stdout().lock();
            let outcome = match file {
                Some(file) => inspect_file(&file, &mut stdout)?,
                None => inspect_dir(dir.as_deref().unwrap_or(cfg.artifact_dir.as_path()), &mut stdout)?,
            };
            Ok(outcome.exit_code())
        }
        Commands::ShowConfig => {
            print!("{}", toml::to_string_pretty(&cfg)?);
            Ok(0)
        }
    }
}

fn serve(cfg: EstimatorConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| cfg.host.clone());
    let port = port.unwrap_or(cfg.port);
    let addr: std::net::SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {host}:{port}: {e}"))?;

    let ctx = Arc::new(AppContext::from_config(&cfg));
    let app = crate::web::build_router(ctx);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))?;
        tracing::info!(message = "HTTP server listening", addr = %addr);
        axum::serve(listener, app).await?;
        Ok::<(), anyhow::Error>(())
    })
}
