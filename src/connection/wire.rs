//! Request and response bodies of the scroll API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the initial search request that opens a scroll
#[derive(Debug, Serialize)]
pub struct SearchBody<'a> {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<&'a [String]>,
}

/// Body of a scroll advance request
#[derive(Debug, Serialize)]
pub struct ScrollBody<'a> {
    pub scroll: &'a str,
    pub scroll_id: &'a str,
}

/// Search or scroll response envelope
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,
    #[serde(default)]
    pub hits: HitsEnvelope,
}

#[derive(Debug, Default, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `hits.total` is a bare number on older clusters and an object on newer ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    pub fn value(self) -> u64 {
        match self {
            TotalHits::Count(n) | TotalHits::Object { value: n } => n,
        }
    }
}

/// One search hit
///
/// `fields` and `_source` are kept undecoded; the record normalizer owns
/// their interpretation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub fields: Option<Value>,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
}
