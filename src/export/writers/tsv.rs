//! Tab-separated writer
//!
//! Writes one `url<TAB>publishDate` line per record. Values are written
//! verbatim.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::Result;
use crate::record::Article;

use super::FormatWriter;

/// Writer for `url<TAB>publishDate` lines
pub struct TsvWriter<W> {
    writer: W,
    written: usize,
    bytes: u64,
}

impl<W: AsyncWrite + Unpin + Send> TsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: 0,
            bytes: 0,
        }
    }

    /// Consume the writer and return the underlying sink
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Render one record as a TSV line
pub fn format_line(record: &Article) -> String {
    format!("{}\t{}\n", record.url, record.publish_date)
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> FormatWriter for TsvWriter<W> {
    async fn write_batch(&mut self, records: &[Article]) -> Result<usize> {
        for record in records {
            let line = format_line(record);
            self.writer.write_all(line.as_bytes()).await?;
            self.bytes += line.len() as u64;
        }

        self.written += records.len();
        debug!("Wrote {} TSV lines (total: {})", records.len(), self.written);

        Ok(records.len())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.writer.flush().await?;
        debug!("Finalized TSV output ({} records)", self.written);
        Ok(())
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, date: &str) -> Article {
        Article {
            url: url.to_string(),
            publish_date: date.to_string(),
            title: "ignored".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_tsv_writer_lines() {
        let mut writer = TsvWriter::new(Vec::new());
        let written = writer
            .write_batch(&[
                article("http://a.com/1", "2015-01-01"),
                article("http://a.com/2", ""),
            ])
            .await
            .unwrap();
        writer.finalize().await.unwrap();

        assert_eq!(written, 2);
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, "http://a.com/1\t2015-01-01\nhttp://a.com/2\t\n");
    }

    #[tokio::test]
    async fn test_tsv_writer_bytes_written() {
        let mut writer = TsvWriter::new(Vec::new());
        writer.write_batch(&[article("u", "d")]).await.unwrap();
        assert_eq!(writer.bytes_written(), 4);
    }

    #[test]
    fn test_empty_record_is_a_bare_tab() {
        assert_eq!(format_line(&Article::default()), "\t\n");
    }
}
