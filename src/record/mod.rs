//! Normalized crawl records
//!
//! Search hits come back either as a field projection (a map from field
//! name to an array of values) or as a full `_source` document. This module
//! turns both into the stable [`Article`] shape.
//!
//! Field projections are parsed leniently: only a string first value is
//! accepted for a known field, anything else leaves the field empty.
//! A projection that is not a map of arrays is a hard [`DecodeError`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::connection::Hit;
use crate::error::{DecodeError, Result};

/// Projected field holding the page URL
pub const URL_FIELD: &str = "url";

/// Projected field holding the publish date
pub const PUBLISH_DATE_FIELD: &str = "publishDate";

/// A web page considered an article by the crawler
///
/// Only `url` and `publish_date` are filled when hits are read through a
/// field projection; the rest is populated in full-document mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub url: String,
    pub publish_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub meta_keywords: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub preview_image_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub digest: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub boost: String,
    #[serde(rename = "tstamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A single decoded value from a field projection
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Null,
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Name of the variant, used in trace output
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::String(_) => "string",
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "bool",
            FieldValue::Null => "null",
            FieldValue::List(_) => "list",
            FieldValue::Map(_) => "map",
        }
    }
}

/// What part of each hit the export reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Request only the named fields; hits carry a `fields` map.
    Fields(Vec<String>),
    /// Request the whole document; hits carry `_source`.
    Source,
}

impl Projection {
    /// The `url` + `publishDate` projection used by default
    pub fn url_and_publish_date() -> Self {
        Projection::Fields(vec![URL_FIELD.to_string(), PUBLISH_DATE_FIELD.to_string()])
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::url_and_publish_date()
    }
}

/// Converts raw hits into [`Article`]s according to the requested projection
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    projection: Projection,
}

impl RecordNormalizer {
    pub fn new(projection: Projection) -> Self {
        Self { projection }
    }

    /// Normalize every hit of a batch, preserving hit order
    pub fn normalize_batch(&self, hits: &[Hit]) -> Result<Vec<Article>> {
        hits.iter().map(|hit| self.normalize_hit(hit)).collect()
    }

    /// Normalize a single hit
    pub fn normalize_hit(&self, hit: &Hit) -> Result<Article> {
        match self.projection {
            Projection::Fields(_) => normalize_fields(&hit.id, hit.fields.as_ref()),
            Projection::Source => {
                let source = hit.source.as_ref().ok_or_else(|| DecodeError::MissingSource {
                    hit: hit.id.clone(),
                })?;
                let mut article = normalize_source(&hit.id, source)?;
                if article.id.is_empty() {
                    article.id = hit.id.clone();
                }
                Ok(article)
            }
        }
    }
}

/// Build an article from a hit's field projection
///
/// A missing or `null` projection yields an empty article: the cluster
/// omits `fields` entirely when none of the requested fields exist.
pub fn normalize_fields(hit_id: &str, raw: Option<&Value>) -> Result<Article> {
    let mut article = Article::default();

    let Some(raw) = raw.filter(|value| !value.is_null()) else {
        return Ok(article);
    };

    let fields = HashMap::<String, Vec<FieldValue>>::deserialize(raw).map_err(|e| {
        DecodeError::InvalidFields {
            hit: hit_id.to_string(),
            reason: e.to_string(),
        }
    })?;

    for (name, values) in fields {
        let Some(first) = values.into_iter().next() else {
            continue;
        };

        match (name.as_str(), first) {
            (URL_FIELD, FieldValue::String(value)) => article.url = value,
            (PUBLISH_DATE_FIELD, FieldValue::String(value)) => article.publish_date = value,
            (URL_FIELD | PUBLISH_DATE_FIELD, other) => {
                trace!(hit = hit_id, field = %name, kind = other.kind(), "Ignoring non-string field value");
            }
            _ => {}
        }
    }

    Ok(article)
}

/// Build an article from a hit's full `_source` document
pub fn normalize_source(hit_id: &str, source: &Value) -> Result<Article> {
    Article::deserialize(source).map_err(|e| {
        DecodeError::InvalidSource {
            hit: hit_id.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
