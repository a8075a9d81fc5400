//! Hypermedia link extraction.
//!
//! Link checks depend on how a response embeds its links. Extractors are
//! pluggable; an extractor returning `None` declares that the response has
//! no hypermedia support, and link checks are skipped for it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::exchange::media_type;

/// A link found in a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Relation name.
    pub rel: String,
    /// Target uri.
    pub href: String,
}

impl Link {
    /// Creates a link.
    #[must_use]
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }
}

/// Strategy for finding links in a response.
#[cfg_attr(test, mockall::automock)]
pub trait LinkExtractor: Send + Sync {
    /// Returns the links of a response, or `None` when the response format
    /// carries no hypermedia links at all.
    fn extract_links<'a>(&self, content_type: Option<&'a str>, body: &[u8]) -> Option<Vec<Link>>;
}

/// HAL: `{"_links": {"rel": {"href": ...}, "other": [{"href": ...}]}}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalLinkExtractor;

impl LinkExtractor for HalLinkExtractor {
    fn extract_links<'a>(&self, _content_type: Option<&'a str>, body: &[u8]) -> Option<Vec<Link>> {
        let mut links = Vec::new();
        let Ok(Value::Object(root)) = serde_json::from_slice::<Value>(body) else {
            return Some(links);
        };
        if let Some(Value::Object(rels)) = root.get("_links") {
            for (rel, target) in rels {
                let targets: Vec<&Value> = match target {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                links.extend(
                    targets
                        .into_iter()
                        .filter_map(|t| t.get("href").and_then(Value::as_str))
                        .map(|href| Link::new(rel.clone(), href)),
                );
            }
        }
        Some(links)
    }
}

/// Atom style: `{"links": [{"rel": ..., "href": ...}]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomLinkExtractor;

impl LinkExtractor for AtomLinkExtractor {
    fn extract_links<'a>(&self, _content_type: Option<&'a str>, body: &[u8]) -> Option<Vec<Link>> {
        let links = serde_json::from_slice::<Value>(body)
            .ok()
            .as_ref()
            .and_then(|root| root.get("links"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let rel = item.get("rel").and_then(Value::as_str)?;
                        let href = item.get("href").and_then(Value::as_str)?;
                        Some(Link::new(rel, href))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(links)
    }
}

/// For APIs without hypermedia: never reports links, so link checks are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLinkExtractor;

impl LinkExtractor for NoLinkExtractor {
    fn extract_links<'a>(&self, _content_type: Option<&'a str>, _body: &[u8]) -> Option<Vec<Link>> {
        None
    }
}

/// Picks an extractor by the response media type.
///
/// Defaults to HAL for `application/hal+json` and the Atom style for
/// `application/json`. Other media types have no hypermedia support.
#[derive(Clone)]
pub struct ContentTypeLinkExtractor {
    extractors: Vec<(String, Arc<dyn LinkExtractor>)>,
}

impl ContentTypeLinkExtractor {
    /// Creates the default mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: vec![
                (
                    "application/hal+json".to_string(),
                    Arc::new(HalLinkExtractor) as Arc<dyn LinkExtractor>,
                ),
                (
                    "application/json".to_string(),
                    Arc::new(AtomLinkExtractor) as Arc<dyn LinkExtractor>,
                ),
            ],
        }
    }

    /// Creates a mapping with no media types registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Registers an extractor for a media type, replacing an earlier one.
    #[must_use]
    pub fn with_extractor(mut self, media: &str, extractor: Arc<dyn LinkExtractor>) -> Self {
        let media = media_type(media);
        self.extractors.retain(|(m, _)| *m != media);
        self.extractors.push((media, extractor));
        self
    }
}

impl Default for ContentTypeLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContentTypeLinkExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentTypeLinkExtractor")
            .field(
                "media_types",
                &self.extractors.iter().map(|(m, _)| m.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LinkExtractor for ContentTypeLinkExtractor {
    fn extract_links<'a>(&self, content_type: Option<&'a str>, body: &[u8]) -> Option<Vec<Link>> {
        let media = media_type(content_type?);
        let (_, extractor) = self.extractors.iter().find(|(m, _)| *m == media)?;
        extractor.extract_links(content_type, body)
    }
}
