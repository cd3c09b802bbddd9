//! Export pipeline for scroll-driven crawl exports
//!
//! This module provides:
//! - A scroll session that pages through an entire index
//! - Progress tracking with real-time feedback
//! - Output writers (tab-separated, JSON Lines)
//!
//! # Architecture
//!
//! The export pipeline is built on three main components:
//!
//! 1. **StreamingQuery**: yields hit batches; [`ScrollSession`] implements it over the scroll API
//! 2. **ProgressTracker**: provides progress feedback on stderr
//! 3. **FormatWriter**: renders normalized records
//!
//! These components are orchestrated by the **ExportCoordinator**, which
//! drains the query, normalizes hits and only then opens the output.
//!
//! # Example
//!
//! ```no_run
//! use crawl_export::connection::SearchClient;
//! use crawl_export::export::{ScrollSession, retrieve_all};
//! use crawl_export::record::RecordNormalizer;
//! # use crawl_export::connection::OpenRequest;
//! # use crawl_export::record::Projection;
//!
//! # async fn run() -> crawl_export::Result<()> {
//! let client = SearchClient::new("localhost", 9200)?;
//! let request = OpenRequest {
//!     index: "crawl".to_string(),
//!     record_type: "article".to_string(),
//!     page_size: 1000,
//!     projection: Projection::url_and_publish_date(),
//!     ttl: crawl_export::config::SCROLL_TTL,
//! };
//! let session = ScrollSession::from_request(client, request);
//! let records = retrieve_all(Box::new(session), &RecordNormalizer::default()).await?;
//! for record in records {
//!     println!("{}\t{}", record.url, record.publish_date);
//! }
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod progress;
pub mod streaming;
pub mod writers;

pub use coordinator::{ExportCoordinator, ExportResult, retrieve_all};
pub use progress::ProgressTracker;
pub use streaming::{Batch, ScrollSession, StreamingQuery, into_batches};
pub use writers::{
    FormatWriter, JsonLWriter, OpenWriter, TsvWriter, create_format_writer, deferred_format_writer,
};
