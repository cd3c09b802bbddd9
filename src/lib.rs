//! Crawl export library
//!
//! Exports the full contents (URLs and publish dates) of a crawl index held
//! in a search cluster by paging through it with the scroll API.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: Scroll transport and HTTP client
//! - `error`: Error types and handling
//! - `export`: Scroll session, coordinator, progress and output writers
//! - `record`: Normalized article records and hit normalization
//!
//! # Example
//!
//! ```no_run
//! use crawl_export::connection::SearchClient;
//! use crawl_export::export::{ScrollSession, retrieve_all};
//! use crawl_export::record::{Projection, RecordNormalizer};
//! use crawl_export::config::{ExportSettings, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ExportSettings {
//!         host: "localhost".to_string(),
//!         port: 9200,
//!         index: "crawl".to_string(),
//!         record_type: "article".to_string(),
//!         page_size: 1000,
//!         projection: Projection::url_and_publish_date(),
//!         format: OutputFormat::Tsv,
//!         output: None,
//!         progress: false,
//!     };
//!
//!     let client = SearchClient::new(&settings.host, settings.port)?;
//!     let session = ScrollSession::new(client, settings);
//!     for article in retrieve_all(Box::new(session), &RecordNormalizer::default()).await? {
//!         println!("{}\t{}", article.url, article.publish_date);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod record;

// Re-export commonly used types
pub use config::{Config, ExportSettings};
pub use connection::{ScrollTransport, SearchClient};
pub use error::{ExportError, Result};
pub use export::{ExportCoordinator, ScrollSession, retrieve_all};
pub use record::{Article, RecordNormalizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
