//! Core domain types for the PageLens analysis pipeline.

use serde::{Deserialize, Serialize};

/// The fixed answer used to represent any provider failure uniformly.
pub const ERROR_SENTINEL: &str = "Error occurred while fetching data";

/// The answer a provider returns when it has nothing on the given topics.
pub const NOT_FOUND_SENTINEL: &str = "Not found in context.";

// ---------------------------------------------------------------------------
// ServiceLabel
// ---------------------------------------------------------------------------

/// Identity of one of the three enrichment knowledge services.
///
/// The set and its order are fixed at configuration time; results are always
/// collected in this order and filtered without reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceLabel {
    Architecture,
    Performance,
    MlResources,
}

impl ServiceLabel {
    /// All services, in report order.
    pub const ALL: [ServiceLabel; 3] = [
        Self::Architecture,
        Self::Performance,
        Self::MlResources,
    ];

    /// Human-readable heading used in the rendered report.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Architecture => "C++ Architecture and Design",
            Self::Performance => "C++ Performance and Concurrency",
            Self::MlResources => "Machine Learning Resources",
        }
    }
}

impl std::fmt::Display for ServiceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ContentContext
// ---------------------------------------------------------------------------

/// Summary and key topics derived from a page's extracted text.
///
/// Both fields are non-empty on success; the summarizer fails the request
/// rather than producing a partial context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentContext {
    pub summary: String,
    pub key_topics: String,
}

impl ContentContext {
    /// The combined content string sent identically to every enrichment
    /// service for a given request.
    pub fn combined(&self) -> String {
        format!(
            "Summary: {}\n\nKey Topics: {}",
            self.summary, self.key_topics
        )
    }
}

// ---------------------------------------------------------------------------
// EnrichmentAnswer
// ---------------------------------------------------------------------------

/// One entry in a provider's answer list: either plain text or a mapping of
/// named fields (e.g. chapter → description).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerEntry {
    Text(String),
    Fields(serde_json::Map<String, serde_json::Value>),
}

impl AnswerEntry {
    /// Whether this entry is the given plain-text string.
    ///
    /// A `Fields` entry never matches; the sentinel comparisons in the
    /// validity filter are exact string matches.
    pub fn is_text(&self, s: &str) -> bool {
        matches!(self, Self::Text(t) if t == s)
    }
}

/// The structured result decoded from a provider's nested `completion` JSON.
///
/// Owned exclusively by the orchestration call that produced it; never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentAnswer {
    #[serde(rename = "Answer")]
    pub answer: Vec<AnswerEntry>,

    #[serde(rename = "Sources", default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

impl EnrichmentAnswer {
    /// The fixed error-sentinel answer representing any provider failure.
    pub fn error_sentinel() -> Self {
        Self {
            answer: vec![AnswerEntry::Text(ERROR_SENTINEL.into())],
            sources: None,
        }
    }

    /// Shape-level validity: the answer list is non-empty.
    pub fn is_valid(&self) -> bool {
        !self.answer.is_empty()
    }
}

// ---------------------------------------------------------------------------
// NamedResult
// ---------------------------------------------------------------------------

/// A provider's answer paired with its service label, as rendered in the
/// final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedResult {
    pub label: ServiceLabel,
    pub data: EnrichmentAnswer,
}
