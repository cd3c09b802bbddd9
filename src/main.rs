//! crawl-export
//!
//! Prints every `url<TAB>publishDate` pair of a crawl index, paging through
//! the whole index with a scroll cursor.
//!
//! # Usage
//!
//! ```bash
//! crawl-export -i crawl -h localhost -p 9200 -s 1000 > urls.tsv
//! ```

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crawl_export::cli::CliInterface;
use crawl_export::connection::SearchClient;
use crawl_export::error::Result;
use crawl_export::export::{
    ExportCoordinator, ProgressTracker, ScrollSession, deferred_format_writer,
};
use crawl_export::record::RecordNormalizer;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run the export
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    // Fails on a missing index before any network activity
    let settings = cli.export_settings()?;
    debug!(
        "Exporting {}/{} from {}:{} (page size {})",
        settings.index, settings.record_type, settings.host, settings.port, settings.page_size
    );

    let client = SearchClient::new(&settings.host, settings.port)?;
    // Output is opened only after every record has been retrieved
    let open_writer = deferred_format_writer(settings.format, settings.output.clone())?;
    let tracker = ProgressTracker::new(None, settings.progress);
    let normalizer = RecordNormalizer::new(settings.projection.clone());
    let session = ScrollSession::new(client, settings);

    ExportCoordinator::new(Box::new(session), normalizer, tracker, open_writer)
        .execute()
        .await?;

    Ok(())
}

/// Initialize logging on stderr; stdout carries the exported records
///
/// `RUST_LOG` takes precedence over the configured level when set.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
