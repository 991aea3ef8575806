//! Summarizer stage: derive a summary and key-topic list from extracted text.
//!
//! Issues exactly two completion requests against the same extracted text —
//! one for a concise summary, one for key topics. The two calls share no
//! state and run concurrently; both must succeed or the request aborts.

mod client;

use tracing::{info, instrument};

use pagelens_shared::{ContentContext, Result};

pub use client::ChatClient;

/// Prompt for the summary request.
fn summary_prompt(text: &str) -> String {
    format!("Provide a concise summary of the following content:\n\n{text}")
}

/// Prompt for the key-topics request.
fn key_topics_prompt(text: &str) -> String {
    format!("List the key topics from the following content:\n\n{text}")
}

/// Derive a [`ContentContext`] from extracted page text.
///
/// There is no fallback: an error from either completion propagates and
/// aborts the whole request.
#[instrument(skip_all, fields(chars = text.len()))]
pub async fn summarize(client: &ChatClient, text: &str) -> Result<ContentContext> {
    let summary_prompt = summary_prompt(text);
    let key_topics_prompt = key_topics_prompt(text);
    let (summary, key_topics) = tokio::join!(
        client.complete(&summary_prompt),
        client.complete(&key_topics_prompt),
    );

    let context = ContentContext {
        summary: summary?,
        key_topics: key_topics?,
    };

    info!(
        summary_chars = context.summary.len(),
        topics_chars = context.key_topics.len(),
        "content context derived"
    );

    Ok(context)
}
