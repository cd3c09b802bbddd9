//! Connection to the search cluster
//!
//! This module provides:
//! - The [`ScrollTransport`] seam the scroll session talks through
//! - [`SearchClient`], the HTTP implementation of the scroll API
//! - [`ScrollCursor`], the single-use scroll token
//!
//! The client holds no cursor state of its own. Each advance takes the
//! current cursor by value and hands back its replacement.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ConfigError, Result, ServerErrorInfo, TransportError};
use crate::record::Projection;

pub mod wire;

pub use wire::{Hit, SearchResponse, TotalHits};

use wire::{ScrollBody, SearchBody};

/// Opaque scroll token issued by the cluster
///
/// Not `Clone`: a token is handed to exactly one advance call and is gone
/// afterwards.
#[derive(PartialEq, Eq)]
pub struct ScrollCursor(String);

impl ScrollCursor {
    /// Wrap a token; empty tokens mean "no cursor"
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ScrollCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // scroll ids are long base64 blobs
        let shown: String = self.0.chars().take(16).collect();
        write!(f, "ScrollCursor({shown}…)")
    }
}

/// Parameters of the request that opens a scroll
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub index: String,
    pub record_type: String,
    pub page_size: u32,
    pub projection: Projection,
    pub ttl: Duration,
}

/// One page of a scroll: its hits and the cursor for the next page
#[derive(Debug, Default)]
pub struct ScrollPage {
    pub hits: Vec<Hit>,
    pub cursor: Option<ScrollCursor>,
    pub total: Option<u64>,
}

impl From<SearchResponse> for ScrollPage {
    fn from(response: SearchResponse) -> Self {
        Self {
            hits: response.hits.hits,
            cursor: response.scroll_id.and_then(ScrollCursor::new),
            total: response.hits.total.map(TotalHits::value),
        }
    }
}

/// Transport for the scroll protocol
#[async_trait]
pub trait ScrollTransport: Send + Sync {
    /// Run the initial search and open a scroll
    async fn open(&self, request: &OpenRequest) -> Result<ScrollPage>;

    /// Exchange `cursor` for the next page and its replacement cursor
    async fn advance(&self, cursor: ScrollCursor, ttl: Duration) -> Result<ScrollPage>;
}

/// HTTP client for the scroll API
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    base_url: String,
}

impl SearchClient {
    /// Create a client for `host:port`
    ///
    /// Requests go over plain HTTP. An explicit `http://` prefix on `host` is
    /// accepted; any other scheme is rejected.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("crawl-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url(host, port)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, index: &str, record_type: &str) -> String {
        if record_type.is_empty() {
            format!("{}/{}/_search", self.base_url, index)
        } else {
            format!("{}/{}/{}/_search", self.base_url, index, record_type)
        }
    }

    fn scroll_url(&self) -> String {
        format!("{}/_search/scroll", self.base_url)
    }

    async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<SearchResponse> {
        trace!("POST {}", url);

        let mut request = self.http.post(url).json(body);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Server {
                status: status.as_u16(),
                info: ServerErrorInfo::from_body(status.as_u16(), &text),
            }
            .into());
        }

        serde_json::from_str(&text)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()).into())
    }
}

#[async_trait]
impl ScrollTransport for SearchClient {
    async fn open(&self, request: &OpenRequest) -> Result<ScrollPage> {
        let url = self.search_url(&request.index, &request.record_type);
        let ttl = format_ttl(request.ttl);
        let body = SearchBody {
            size: request.page_size,
            fields: match &request.projection {
                Projection::Fields(fields) => Some(fields.as_slice()),
                Projection::Source => None,
            },
        };

        debug!(
            "Opening scroll on {}/{} (size {}, ttl {})",
            request.index, request.record_type, request.page_size, ttl
        );

        let response = self.post(&url, &[("scroll", ttl.as_str())], &body).await?;
        Ok(response.into())
    }

    async fn advance(&self, cursor: ScrollCursor, ttl: Duration) -> Result<ScrollPage> {
        let ttl = format_ttl(ttl);
        let body = ScrollBody {
            scroll: &ttl,
            scroll_id: cursor.as_str(),
        };

        let response = self.post(&self.scroll_url(), &[], &body).await?;
        Ok(response.into())
    }
}

/// Build the cluster base URL from host and port
fn base_url(host: &str, port: u16) -> Result<String> {
    let host = host.trim_end_matches('/');
    let host = host.strip_prefix("http://").unwrap_or(host);
    if host.contains("://") {
        return Err(ConfigError::InvalidValue {
            field: "host".to_string(),
            value: host.to_string(),
        }
        .into());
    }
    Ok(format!("http://{host}:{port}"))
}

/// Render a duration in the cluster's time-unit syntax (`30s`, `1500ms`)
pub fn format_ttl(ttl: Duration) -> String {
    if ttl.subsec_millis() == 0 {
        format!("{}s", ttl.as_secs())
    } else {
        format!("{}ms", ttl.as_millis())
    }
}
