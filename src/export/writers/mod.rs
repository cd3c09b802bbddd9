//! Format writers for export output
//!
//! This module provides a unified interface for writing normalized records
//! as tab-separated lines or JSON Lines, to stdout or to a file.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWrite, BufWriter};

use crate::config::OutputFormat;
use crate::error::{ConfigError, Result};
use crate::record::Article;

pub mod jsonl;
pub mod tsv;

pub use jsonl::JsonLWriter;
pub use tsv::TsvWriter;

/// Destination the writers emit into
pub type OutputSink = Box<dyn AsyncWrite + Unpin + Send>;

/// Opens the output writer on demand
pub type OpenWriter = Box<dyn FnOnce() -> BoxFuture<'static, Result<Box<dyn FormatWriter>>> + Send>;

/// Trait for writing records to different output formats
#[async_trait]
pub trait FormatWriter: Send {
    /// Write a batch of records
    ///
    /// # Returns
    /// * `Result<usize>` - Number of records written
    async fn write_batch(&mut self, records: &[Article]) -> Result<usize>;

    /// Flush buffered output
    async fn finalize(&mut self) -> Result<()>;

    /// Bytes written so far
    fn bytes_written(&self) -> u64;
}

/// Create a buffered sink for `path`, or stdout when no path is given
pub(crate) async fn create_sink(path: Option<&Path>) -> Result<BufWriter<OutputSink>> {
    let sink: OutputSink = match path {
        Some(path) => {
            validate_path(path)?;
            Box::new(File::create(path).await?)
        }
        None => Box::new(tokio::io::stdout()),
    };
    Ok(BufWriter::with_capacity(1024 * 1024, sink))
}

/// Check that the parent directory of an output file exists
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ConfigError::InvalidValue {
                field: "output".to_string(),
                value: path.display().to_string(),
            }
            .into());
        }
    }

    Ok(())
}

/// Build the writer for `format`, targeting `path` or stdout
pub async fn create_format_writer(
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<Box<dyn FormatWriter>> {
    let sink = create_sink(path).await?;
    let writer: Box<dyn FormatWriter> = match format {
        OutputFormat::Tsv => Box::new(TsvWriter::new(sink)),
        OutputFormat::Jsonl => Box::new(JsonLWriter::new(sink)),
    };
    Ok(writer)
}

/// Prepare the writer for `format` without touching the output yet
///
/// The path is checked immediately. The file is created, replacing any
/// previous content, only when the returned opener runs.
pub fn deferred_format_writer(format: OutputFormat, path: Option<PathBuf>) -> Result<OpenWriter> {
    if let Some(path) = path.as_deref() {
        validate_path(path)?;
    }

    Ok(Box::new(move || {
        async move { create_format_writer(format, path.as_deref()).await }.boxed()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    #[test]
    fn test_validate_path_missing_directory() {
        let result = validate_path(Path::new("/nonexistent/directory/out.tsv"));
        assert!(matches!(result, Err(ExportError::Config(_))));
    }

    #[test]
    fn test_validate_path_relative_file() {
        assert!(validate_path(Path::new("out.tsv")).is_ok());
    }

    #[tokio::test]
    async fn test_create_format_writer_to_file() {
        let path = std::env::temp_dir().join("crawl_export_writer_factory.tsv");
        let mut writer = create_format_writer(OutputFormat::Tsv, Some(&path))
            .await
            .unwrap();

        let records = vec![Article {
            url: "http://a.com/1".to_string(),
            publish_date: "2015-01-01".to_string(),
            ..Default::default()
        }];
        writer.write_batch(&records).await.unwrap();
        writer.finalize().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "http://a.com/1\t2015-01-01\n");

        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn test_deferred_writer_leaves_file_until_opened() {
        let path = std::env::temp_dir().join("crawl_export_deferred_writer.tsv");
        tokio::fs::write(&path, "earlier run\n").await.unwrap();

        let open = deferred_format_writer(OutputFormat::Tsv, Some(path.clone())).unwrap();
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "earlier run\n"
        );

        let mut writer = open().await.unwrap();
        writer.finalize().await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "");

        tokio::fs::remove_file(&path).await.ok();
    }

    #[test]
    fn test_deferred_writer_checks_path_upfront() {
        let result = deferred_format_writer(
            OutputFormat::Jsonl,
            Some(PathBuf::from("/nonexistent/directory/out.jsonl")),
        );
        assert!(matches!(result, Err(ExportError::Config(_))));
    }
}
