//! JSON Lines writer
//!
//! Writes each record as one compact JSON object per line. Empty optional
//! fields are omitted; `url` and `publishDate` are always present.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::record::Article;

use super::FormatWriter;

/// Writer for JSON Lines format
pub struct JsonLWriter<W> {
    writer: W,
    written: usize,
    bytes: u64,
}

impl<W: AsyncWrite + Unpin + Send> JsonLWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            bytes: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> FormatWriter for JsonLWriter<W> {
    async fn write_batch(&mut self, records: &[Article]) -> Result<usize> {
        for record in records {
            let mut line = serde_json::to_vec(record).map_err(|e| {
                ExportError::Generic(format!("Failed to serialize record: {e}"))
            })?;
            line.push(b'\n');
            self.writer.write_all(&line).await?;
            self.bytes += line.len() as u64;
        }

        self.written += records.len();
        debug!(
            "Wrote {} records to JSON Lines (total: {})",
            records.len(),
            self.written
        );

        Ok(records.len())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.writer.flush().await?;
        debug!("Finalized JSON Lines output ({} records)", self.written);
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_jsonl_writer_basic() {
        let mut writer = JsonLWriter::new(Vec::new());
        let records = vec![
            Article {
                url: "http://a.com/1".to_string(),
                publish_date: "2015-01-01".to_string(),
                ..Default::default()
            },
            Article {
                id: "2".to_string(),
                url: "http://a.com/2".to_string(),
                title: "Second".to_string(),
                ..Default::default()
            },
        ];

        assert_eq!(writer.write_batch(&records).await.unwrap(), 2);
        writer.finalize().await.unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["url"], "http://a.com/1");
        assert_eq!(lines[0]["publishDate"], "2015-01-01");
        assert!(lines[0].get("title").is_none());
        assert_eq!(lines[1]["title"], "Second");
        assert_eq!(lines[1]["id"], "2");
    }

    #[tokio::test]
    async fn test_jsonl_writer_multiple_batches() {
        let mut writer = JsonLWriter::new(Vec::new());
        writer.write_batch(&[Article::default()]).await.unwrap();
        writer
            .write_batch(&[Article::default(), Article::default()])
            .await
            .unwrap();
        writer.finalize().await.unwrap();

        let bytes = writer.bytes_written();
        let output = writer.into_inner();
        assert_eq!(output.len() as u64, bytes);
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 3);
    }
}
