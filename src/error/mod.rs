//! Error handling for export runs.
//!
//! This module provides:
//! - A single fatal error type covering configuration, transport, decode and I/O failures
//! - Structured error information extracted from search-cluster error bodies
//!
//! # Example
//!
//! ```rust
//! use crawl_export::error::{ConfigError, ExportError, Result};
//!
//! fn require_index(index: &str) -> Result<()> {
//!     if index.is_empty() {
//!         return Err(ConfigError::MissingField("index".to_string()).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(require_index(""), Err(ExportError::Config(_))));
//! ```

pub mod kinds;
pub mod server;

// Re-export commonly used types
pub use kinds::{ConfigError, DecodeError, ExportError, Result, TransportError};
pub use server::ServerErrorInfo;
