//! Client for one enrichment knowledge service.
//!
//! Issues a single completion request and decodes the provider's
//! double-encoded answer. Every failure — network, HTTP status, missing
//! field, malformed JSON at either parse level — is converted to the
//! sentinel answer at the public boundary: [`EnrichClient::enrich`] never
//! fails and always returns a well-formed [`EnrichmentAnswer`], so one
//! provider's outage cannot abort the other two or the overall request.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pagelens_shared::{EnrichmentAnswer, PageLensError, Result};

/// User-Agent string for enrichment requests.
const USER_AGENT: &str = concat!("PageLens/", env!("CARGO_PKG_VERSION"));

/// Timeout for a single enrichment request.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Build the fixed prompt sent to every knowledge service.
fn build_prompt(content: &str) -> String {
    format!(
        "Any information on the given topics from the context would be great. \
         Please list chapters from the table of contents if possible. \
         Here is my context to searched against your context \"{content}\""
    )
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    messages: [GenerateMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GenerateMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Outer response body; the `completion` field holds a JSON-encoded string
/// which decodes to the actual [`EnrichmentAnswer`].
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    completion: Option<String>,
}

// ---------------------------------------------------------------------------
// EnrichClient
// ---------------------------------------------------------------------------

/// Client for the enrichment completion endpoint, shared by all three
/// knowledge services (each call authenticates with its own token).
#[derive(Debug, Clone)]
pub struct EnrichClient {
    client: reqwest::Client,
    endpoint: String,
}

impl EnrichClient {
    /// Create a client for the given completion endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PageLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Query one knowledge service with the combined content.
    ///
    /// Infallible by contract: any failure yields the sentinel answer.
    pub async fn enrich(&self, content: &str, token: &str) -> EnrichmentAnswer {
        match self.try_enrich(content, token).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "enrichment call failed, returning sentinel");
                EnrichmentAnswer::error_sentinel()
            }
        }
    }

    /// The fallible request/decode path behind [`enrich`](Self::enrich).
    async fn try_enrich(&self, content: &str, token: &str) -> Result<EnrichmentAnswer> {
        let prompt = build_prompt(content);
        let request = GenerateRequest {
            messages: [GenerateMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PageLensError::Enrichment(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageLensError::Enrichment(format!("HTTP {status}")));
        }

        let outer: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PageLensError::Enrichment(format!("invalid response body: {e}")))?;

        let completion = outer
            .completion
            .ok_or_else(|| PageLensError::Enrichment("unexpected response format".into()))?;

        // The completion is itself a JSON document
        let answer: EnrichmentAnswer = serde_json::from_str(&completion).map_err(|e| {
            PageLensError::Enrichment(format!("invalid nested completion JSON: {e}"))
        })?;

        debug!(entries = answer.answer.len(), "enrichment answer decoded");
        Ok(answer)
    }
}
