//! Web page text extraction.
//!
//! Fetches a page over HTTP and returns the text content of its paragraph
//! elements in document order. Extraction has no partial-success path: a
//! network failure, non-2xx status, or unreadable body fails the whole
//! analysis for that request.

use std::time::Duration;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use pagelens_shared::{PageLensError, Result};

/// User-Agent string for page fetches.
const USER_AGENT: &str = concat!("PageLens/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow when fetching a page.
const MAX_REDIRECTS: usize = 5;

/// Timeout for a single page fetch.
const FETCH_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Fetches pages and extracts their paragraph text.
#[derive(Debug, Clone)]
pub struct Extractor {
    client: Client,
}

impl Extractor {
    /// Create an extractor with its own HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| PageLensError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch `url` and return the concatenated text of its paragraphs.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn extract(&self, url: &Url) -> Result<String> {
        info!("reading website content");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| PageLensError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageLensError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PageLensError::Network(format!("{url}: body read failed: {e}")))?;

        let text = paragraph_text(&body);
        debug!(chars = text.len(), "extracted paragraph text");

        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Paragraph extraction
// ---------------------------------------------------------------------------

/// Concatenate the text content of every `<p>` element in document order.
///
/// Paragraphs are joined with no separator between them; downstream prompts
/// are built from this exact concatenation.
pub fn paragraph_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let p_sel = Selector::parse("p").unwrap();

    let mut out = String::new();
    for el in doc.select(&p_sel) {
        for piece in el.text() {
            out.push_str(piece);
        }
    }
    out
}
