//! Enrichment orchestration: fan the combined content out to the three
//! knowledge services, collect their answers, and filter out the ones with
//! nothing to show.
//!
//! The three calls are independent — no shared state, no ordering
//! dependency — and run concurrently. Each is attempted exactly once; a
//! failing provider yields the sentinel answer (see [`EnrichClient`]) and
//! its section is silently absent from the report.

mod client;

use tracing::{debug, info, instrument};

use pagelens_shared::{
    ERROR_SENTINEL, EnrichmentAnswer, NOT_FOUND_SENTINEL, NamedResult, ServiceLabel,
};

pub use client::EnrichClient;

// ---------------------------------------------------------------------------
// EnrichmentTokens
// ---------------------------------------------------------------------------

/// One bearer token per knowledge service.
#[derive(Debug, Clone)]
pub struct EnrichmentTokens {
    pub architecture: String,
    pub performance: String,
    pub ml_resources: String,
}

impl EnrichmentTokens {
    fn for_label(&self, label: ServiceLabel) -> &str {
        match label {
            ServiceLabel::Architecture => &self.architecture,
            ServiceLabel::Performance => &self.performance,
            ServiceLabel::MlResources => &self.ml_resources,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Query all three knowledge services with the identical combined content
/// and return the filtered, labeled results in fixed service order.
#[instrument(skip_all, fields(chars = combined.len()))]
pub async fn orchestrate(
    client: &EnrichClient,
    combined: &str,
    tokens: &EnrichmentTokens,
) -> Vec<NamedResult> {
    let [arch_label, perf_label, ml_label] = ServiceLabel::ALL;

    let (architecture, performance, ml_resources) = tokio::join!(
        client.enrich(combined, tokens.for_label(arch_label)),
        client.enrich(combined, tokens.for_label(perf_label)),
        client.enrich(combined, tokens.for_label(ml_label)),
    );

    let results = vec![
        NamedResult {
            label: arch_label,
            data: architecture,
        },
        NamedResult {
            label: perf_label,
            data: performance,
        },
        NamedResult {
            label: ml_label,
            data: ml_resources,
        },
    ];

    let kept: Vec<NamedResult> = results
        .into_iter()
        .filter(|r| {
            let keep = passes_filter(&r.data);
            if !keep {
                debug!(label = %r.label, "dropping provider result");
            }
            keep
        })
        .collect();

    info!(kept = kept.len(), "enrichment complete");
    kept
}

/// Whether a provider's answer is included in the final report.
///
/// The answer list must be non-empty and its FIRST entry must not be the
/// not-found answer — later entries are not checked, and a mapping-shaped
/// first entry never matches. A failed provider's sentinel answer is
/// likewise dropped, so its section is silently absent.
pub fn passes_filter(data: &EnrichmentAnswer) -> bool {
    data.is_valid()
        && !data.answer[0].is_text(NOT_FOUND_SENTINEL)
        && !data.answer[0].is_text(ERROR_SENTINEL)
}
