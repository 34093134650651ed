use std::sync::Arc;

use clap::Parser;
use scorewatch::checkers::CheckerSet;
use scorewatch::config::{Config, StorageConfig, read_config_file};
use scorewatch::executor::CycleExecutor;
use scorewatch::scheduler::PollScheduler;
use scorewatch::storage::{MemoryBackend, StorageBackend};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("scorewatch", LevelFilter::TRACE),
        ("poller", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;
    let poller = config.poller.clone().unwrap_or_default();

    let storage = build_storage(&config).await?;
    let checkers = CheckerSet::from_config(&poller);
    let executor = CycleExecutor::new(storage, checkers, &poller);

    if args.once {
        let summary = executor.run_cycle().await?;
        info!(
            "single cycle: {} polled, {} passed, {} failed",
            summary.polled, summary.passed, summary.failed
        );
        return Ok(());
    }

    PollScheduler::new(executor, poller.interval()).run().await;

    Ok(())
}

async fn build_storage(config: &Config) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match config.storage.clone().unwrap_or_default() {
        StorageConfig::None => {
            info!("storage disabled, using in-memory backend");
            Ok(Arc::new(MemoryBackend::new()))
        }
        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path } => {
            let backend = scorewatch::storage::sqlite::SqliteBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => {
            anyhow::bail!("sqlite storage requested but built without the storage-sqlite feature")
        }
    }
}
