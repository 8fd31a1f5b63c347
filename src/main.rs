use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use signpost::config::{self, Settings};
use signpost::consts::DEFAULT_INTERVAL_SECS;
use signpost::logging;
use signpost::publisher::Outcome;
use signpost::scheduler::Scheduler;
use signpost::server;

#[derive(Parser)]
#[command(name = "signpost", version, about = "Posts a random road sign to Bluesky.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the redirect and post on a schedule
    Serve {
        /// Address for the redirect server
        #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Seconds between scheduled posts
        #[arg(long, env = "POST_INTERVAL_SECS", default_value_t = DEFAULT_INTERVAL_SECS)]
        interval_secs: u64,

        #[command(flatten)]
        settings: Settings,
    },
    /// Serve the redirect only; needs no service credentials
    Redirect {
        /// Address for the redirect server
        #[arg(long, env = "BIND_ADDR", default_value = DEFAULT_BIND)]
        bind: SocketAddr,
    },
    /// Publish one post now and exit
    Post {
        #[command(flatten)]
        settings: Settings,
    },
}

const DEFAULT_BIND: &str = "0.0.0.0:8787";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = config::load_dotenv();
    logging::init();
    if let Err(e) = dotenv {
        warn!("ignoring .env: {e}");
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            bind,
            interval_secs,
            settings,
        } => serve(bind, interval_secs, settings).await,
        Command::Redirect { bind } => {
            let (_, listener) = server::bind(bind).await?;
            server::serve(listener, shutdown_signal()).await
        }
        Command::Post { settings } => post_once(settings).await,
    }
}

async fn serve(bind: SocketAddr, interval_secs: u64, settings: Settings) -> anyhow::Result<()> {
    let publisher = Arc::new(settings.publisher()?);
    let scheduler = Scheduler::new(Duration::from_secs(interval_secs.max(1)));
    let (_, listener) = server::bind(bind).await?;

    // The scheduler stops when the server does, on ctrl-c or on failure
    let ticking = scheduler.run(publisher, std::future::pending());
    server::serve_alongside(listener, shutdown_signal(), ticking).await
}

async fn post_once(settings: Settings) -> anyhow::Result<()> {
    let publisher = settings.publisher()?;
    match publisher.run_once().await {
        Ok(Outcome::Published { sign_id, uri }) => {
            info!(%sign_id, %uri, "posted");
            Ok(())
        }
        Ok(Outcome::Skipped(reason)) => {
            info!(%reason, "nothing posted");
            Ok(())
        }
        Err(e) => {
            error!("run failed: {e:#}");
            Err(e)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
