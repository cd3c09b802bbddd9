//! Scroll-driven streaming of search hits
//!
//! [`ScrollSession`] owns one server-side scroll cursor and yields hit
//! batches until the cluster stops issuing cursors or returns an empty page.
//! Batches are fetched strictly one after another: a cursor is a single
//! mutable resource on the cluster and must never be advanced twice.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::{debug, info, warn};

use crate::config::ExportSettings;
use crate::connection::{Hit, OpenRequest, ScrollCursor, ScrollTransport};
use crate::error::{ExportError, Result};

/// Trait for streaming query results in batches
#[async_trait]
pub trait StreamingQuery: Send {
    /// Fetch the next batch of hits
    ///
    /// # Returns
    /// * `Result<Option<Vec<Hit>>>` - Next non-empty batch, or None once exhausted
    async fn next_batch(&mut self) -> Result<Option<Vec<Hit>>>;

    /// Total hit count reported by the cluster, once known
    fn total_hits(&self) -> Option<u64> {
        None
    }
}

/// Where the session is in its cursor lifecycle
#[derive(Debug)]
enum CursorState {
    /// No request issued yet
    Unopened,
    /// Holding the cursor for the next advance
    Open(ScrollCursor),
    /// Finished, successfully or not; no further requests are made
    Exhausted,
}

/// Scroll session over one index and record type
///
/// The session holds at most one cursor. Every advance moves the cursor
/// into the transport and installs the replacement it returns, so a stale
/// token can never be sent twice. There is no explicit close: an abandoned
/// cursor expires on the cluster after its TTL.
pub struct ScrollSession<T> {
    transport: T,
    request: OpenRequest,
    state: CursorState,
    total_hits: Option<u64>,
    requests: u32,
    total_fetched: u64,
}

impl<T: ScrollTransport> ScrollSession<T> {
    /// Create a session; nothing is sent until the first `next_batch`
    pub fn new(transport: T, settings: ExportSettings) -> Self {
        Self::from_request(transport, settings.open_request())
    }

    pub fn from_request(transport: T, request: OpenRequest) -> Self {
        Self {
            transport,
            request,
            state: CursorState::Unopened,
            total_hits: None,
            requests: 0,
            total_fetched: 0,
        }
    }

    /// Number of requests sent to the cluster so far
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Number of hits fetched so far
    pub fn total_fetched(&self) -> u64 {
        self.total_fetched
    }
}

#[async_trait]
impl<T: ScrollTransport + 'static> StreamingQuery for ScrollSession<T> {
    async fn next_batch(&mut self) -> Result<Option<Vec<Hit>>> {
        // Leaves the session exhausted unless a new cursor is installed below
        let page = match std::mem::replace(&mut self.state, CursorState::Exhausted) {
            CursorState::Exhausted => return Ok(None),
            CursorState::Unopened => {
                self.requests += 1;
                self.transport.open(&self.request).await
            }
            CursorState::Open(cursor) => {
                self.requests += 1;
                debug!("Advancing scroll (request #{})", self.requests);
                self.transport.advance(cursor, self.request.ttl).await
            }
        };

        let page = match page {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    "Scroll over {}/{} failed after {} hits: {}",
                    self.request.index, self.request.record_type, self.total_fetched, e
                );
                return Err(e);
            }
        };

        if self.total_hits.is_none() {
            self.total_hits = page.total;
        }

        if page.hits.is_empty() {
            debug!(
                "Scroll exhausted after {} hits ({} requests)",
                self.total_fetched, self.requests
            );
            return Ok(None);
        }

        self.total_fetched += page.hits.len() as u64;
        debug!(
            "Fetched batch of {} hits (total: {})",
            page.hits.len(),
            self.total_fetched
        );

        match page.cursor {
            Some(cursor) => self.state = CursorState::Open(cursor),
            None => info!(
                "No scroll id returned, stopping after {} hits",
                self.total_fetched
            ),
        }

        Ok(Some(page.hits))
    }

    fn total_hits(&self) -> Option<u64> {
        self.total_hits
    }
}

impl<T> Drop for ScrollSession<T> {
    fn drop(&mut self) {
        if matches!(self.state, CursorState::Open(_)) {
            debug!("ScrollSession dropped with an open cursor; leaving it to expire");
        }
    }
}

/// One non-empty batch pulled from a streaming query
#[derive(Debug)]
pub struct Batch {
    pub hits: Vec<Hit>,
    /// Total hit count known to the query after this batch
    pub total_hits: Option<u64>,
}

/// Turn a streaming query into a lazy stream of batches
///
/// The stream ends after the first error.
pub fn into_batches(query: Box<dyn StreamingQuery>) -> BoxStream<'static, Result<Batch>> {
    stream::try_unfold(query, |mut query| async move {
        let next = query.next_batch().await?;
        Ok::<_, ExportError>(next.map(|hits| {
            let total_hits = query.total_hits();
            (Batch { hits, total_hits }, query)
        }))
    })
    .boxed()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::connection::ScrollPage;
    use crate::error::TransportError;
    use crate::record::Projection;
    use futures::TryStreamExt;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// A call observed by the scripted transport
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Open,
        Advance(String),
    }

    /// One scripted reply: hit ids and optional next token, or a failure
    pub(crate) enum Reply {
        Page(Vec<String>, Option<&'static str>),
        Fail,
    }

    /// Transport that replays scripted pages and records calls
    #[derive(Clone)]
    pub(crate) struct ScriptedTransport {
        replies: Arc<Mutex<VecDeque<Reply>>>,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Serve `total` documents in pages of `page_size`, the way a cluster does:
        /// every page carries a token and the final page is empty
        pub(crate) fn paged(total: usize, page_size: usize) -> Self {
            let ids: Vec<String> = (0..total).map(|i| format!("doc-{i}")).collect();
            let mut replies: Vec<Reply> = ids
                .chunks(page_size)
                .map(|chunk| Reply::Page(chunk.to_vec(), Some("token")))
                .collect();
            replies.push(Reply::Page(Vec::new(), Some("token")));
            Self::new(replies)
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn next_reply(&self) -> Result<ScrollPage> {
            match self.replies.lock().unwrap().pop_front() {
                Some(Reply::Page(ids, token)) => Ok(ScrollPage {
                    hits: ids.iter().map(|id| hit(id)).collect(),
                    cursor: token.and_then(ScrollCursor::new),
                    total: None,
                }),
                Some(Reply::Fail) => {
                    Err(TransportError::RequestFailed("connection reset".to_string()).into())
                }
                None => panic!("transport called more times than scripted"),
            }
        }
    }

    #[async_trait]
    impl ScrollTransport for ScriptedTransport {
        async fn open(&self, _request: &OpenRequest) -> Result<ScrollPage> {
            self.calls.lock().unwrap().push(Call::Open);
            self.next_reply()
        }

        async fn advance(&self, cursor: ScrollCursor, _ttl: Duration) -> Result<ScrollPage> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Advance(cursor.as_str().to_string()));
            self.next_reply()
        }
    }

    pub(crate) fn hit(id: &str) -> Hit {
        Hit {
            id: id.to_string(),
            fields: Some(json!({ "url": [format!("http://site/{id}")], "publishDate": ["2015-06-01"] })),
            ..Default::default()
        }
    }

    pub(crate) fn page(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    pub(crate) fn request(page_size: u32) -> OpenRequest {
        OpenRequest {
            index: "crawl".to_string(),
            record_type: "article".to_string(),
            page_size,
            projection: Projection::default(),
            ttl: Duration::from_secs(30),
        }
    }

    async fn drain(session: &mut ScrollSession<ScriptedTransport>) -> Result<Vec<Vec<String>>> {
        let mut batches = Vec::new();
        while let Some(batch) = session.next_batch().await? {
            batches.push(batch.into_iter().map(|h| h.id).collect());
        }
        Ok(batches)
    }

    #[tokio::test]
    async fn test_two_calls_for_three_documents() {
        let transport = ScriptedTransport::new(vec![
            Reply::Page(page(&["a", "b"]), Some("T1")),
            Reply::Page(page(&["c"]), None),
        ]);
        let mut session = ScrollSession::from_request(transport.clone(), request(2));

        let batches = drain(&mut session).await.unwrap();
        assert_eq!(batches, vec![page(&["a", "b"]), page(&["c"])]);
        assert_eq!(
            transport.calls(),
            vec![Call::Open, Call::Advance("T1".to_string())]
        );
        assert_eq!(session.requests(), 2);
        assert_eq!(session.total_fetched(), 3);
    }

    #[tokio::test]
    async fn test_each_token_is_sent_once() {
        let transport = ScriptedTransport::new(vec![
            Reply::Page(page(&["a"]), Some("T1")),
            Reply::Page(page(&["b"]), Some("T2")),
            Reply::Page(page(&["c"]), Some("T3")),
            Reply::Page(Vec::new(), Some("T4")),
        ]);
        let mut session = ScrollSession::from_request(transport.clone(), request(1));

        drain(&mut session).await.unwrap();
        assert_eq!(
            transport.calls(),
            vec![
                Call::Open,
                Call::Advance("T1".to_string()),
                Call::Advance("T2".to_string()),
                Call::Advance("T3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_batch_with_token_terminates() {
        let transport = ScriptedTransport::new(vec![
            Reply::Page(page(&["a", "b"]), Some("T1")),
            Reply::Page(Vec::new(), Some("T2")),
        ]);
        let mut session = ScrollSession::from_request(transport.clone(), request(2));

        let batches = drain(&mut session).await.unwrap();
        assert_eq!(batches, vec![page(&["a", "b"])]);
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_without_token_terminates() {
        let transport = ScriptedTransport::new(vec![
            Reply::Page(page(&["a"]), Some("T1")),
            Reply::Page(Vec::new(), None),
        ]);
        let mut session = ScrollSession::from_request(transport, request(5));
        assert_eq!(drain(&mut session).await.unwrap(), vec![page(&["a"])]);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let transport = ScriptedTransport::new(vec![Reply::Page(Vec::new(), Some("T1"))]);
        let mut session = ScrollSession::from_request(transport.clone(), request(5));
        assert!(drain(&mut session).await.unwrap().is_empty());
        assert_eq!(transport.calls(), vec![Call::Open]);
    }

    #[tokio::test]
    async fn test_open_failure_is_fatal() {
        let transport = ScriptedTransport::new(vec![Reply::Fail]);
        let mut session = ScrollSession::from_request(transport.clone(), request(5));

        assert!(matches!(
            session.next_batch().await,
            Err(ExportError::Transport(_))
        ));
        // no retry after a failure
        assert!(session.next_batch().await.unwrap().is_none());
        assert_eq!(transport.calls(), vec![Call::Open]);
    }

    #[tokio::test]
    async fn test_exhausted_session_sends_nothing() {
        let transport = ScriptedTransport::new(vec![Reply::Page(page(&["a"]), None)]);
        let mut session = ScrollSession::from_request(transport.clone(), request(5));

        drain(&mut session).await.unwrap();
        assert!(session.next_batch().await.unwrap().is_none());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_total_hits_from_first_page() {
        struct Counting;

        #[async_trait]
        impl ScrollTransport for Counting {
            async fn open(&self, _request: &OpenRequest) -> Result<ScrollPage> {
                Ok(ScrollPage {
                    hits: vec![hit("a")],
                    cursor: None,
                    total: Some(1),
                })
            }

            async fn advance(&self, _cursor: ScrollCursor, _ttl: Duration) -> Result<ScrollPage> {
                unreachable!("no cursor was issued")
            }
        }

        let mut session = ScrollSession::from_request(Counting, request(5));
        assert_eq!(session.total_hits(), None);
        session.next_batch().await.unwrap();
        assert_eq!(session.total_hits(), Some(1));
    }

    #[tokio::test]
    async fn test_into_batches_stream() {
        let transport = ScriptedTransport::paged(5, 2);
        let session = ScrollSession::from_request(transport, request(2));

        let batches: Vec<Batch> = into_batches(Box::new(session)).try_collect().await.unwrap();
        let sizes: Vec<usize> = batches.iter().map(|b| b.hits.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }
}
