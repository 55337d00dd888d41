mod crawl;
mod leaderboard;
mod scheduler;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wsbpulse_export::{CsvSnapshotSink, SnapshotSink};
use wsbpulse_sentiment::{CycleOptions, RedditSettings, SentimentScorer, VaderModel};

use crate::crawl::CrawlContext;

#[derive(Debug, Parser)]
#[command(name = "wsbpulse")]
#[command(about = "Hourly ticker sentiment leaderboard from r/wallstreetbets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl immediately, then on every interval until interrupted (default)
    Run,
    /// Run a single crawl cycle and exit
    Once {
        /// Print the leaderboard without writing a snapshot file
        #[arg(long)]
        dry_run: bool,
    },
    /// Show which ticker a title/body pair resolves to
    Resolve {
        /// Thread title
        title: String,
        /// Thread body, searched when the title has no ticker
        #[arg(long, default_value = "")]
        body: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = wsbpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let universe = wsbpulse_core::load_universe(&config.ticker_files)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Resolve { title, body } => {
            match wsbpulse_sentiment::resolve_ticker(&universe, &title, &body) {
                Some(ticker) => println!("{ticker}"),
                None => println!("no ticker found"),
            }
        }
        Commands::Once { dry_run } => {
            let ctx = crawl_context(&config, universe, dry_run);
            let status = crawl::crawl_once(&ctx).await;
            if status.is_failure() {
                anyhow::bail!("crawl cycle failed: {status}");
            }
        }
        Commands::Run => {
            let ctx = Arc::new(crawl_context(&config, universe, false));
            let mut scheduler =
                scheduler::build_scheduler(Arc::clone(&ctx), config.crawl_interval()).await?;
            tracing::info!(
                interval_secs = config.crawl_interval_secs,
                subreddit = %config.subreddit,
                output_dir = %config.output_dir.display(),
                "scheduler running; press ctrl-c to stop"
            );
            shutdown_signal().await;
            scheduler.shutdown().await?;
        }
    }

    Ok(())
}

fn crawl_context(
    config: &wsbpulse_core::AppConfig,
    universe: wsbpulse_core::SymbolUniverse,
    dry_run: bool,
) -> CrawlContext {
    let sink: Option<Box<dyn SnapshotSink>> = if dry_run {
        None
    } else {
        Some(Box::new(CsvSnapshotSink::new(config.output_dir.clone())))
    };

    CrawlContext {
        settings: RedditSettings::from_app_config(config),
        universe,
        scorer: SentimentScorer::new(VaderModel::new()),
        options: CycleOptions {
            thread_limit: config.thread_limit,
            thread_timeout: config.thread_timeout(),
        },
        sink,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
