//! End-to-end analysis pipeline: URL → text → context → enrichment → report.

use std::time::{Duration, Instant};

use tracing::{info, instrument};
use url::Url;

use pagelens_enrich::{EnrichClient, EnrichmentTokens};
use pagelens_extract::Extractor;
use pagelens_shared::{AppConfig, Credentials, Result};
use pagelens_summarize::ChatClient;

// ---------------------------------------------------------------------------
// AnalysisEngine
// ---------------------------------------------------------------------------

/// Holds the HTTP clients and resolved credentials for the pipeline.
///
/// Built once at startup from explicit configuration; individual requests
/// share nothing else — each invocation of [`analyze`] is independent.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    extractor: Extractor,
    chat: ChatClient,
    enrich: EnrichClient,
    tokens: EnrichmentTokens,
    llm_key_present: bool,
}

impl AnalysisEngine {
    /// Build the engine from loaded config and resolved credentials.
    pub fn new(config: &AppConfig, credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new()?,
            chat: ChatClient::new(
                &config.llm.base_url,
                &credentials.llm_api_key,
                &config.llm.model,
            )?,
            enrich: EnrichClient::new(&config.enrichment.endpoint)?,
            tokens: EnrichmentTokens {
                architecture: credentials.architecture_token.clone(),
                performance: credentials.performance_token.clone(),
                ml_resources: credentials.ml_resources_token.clone(),
            },
            llm_key_present: credentials.has_llm_key(),
        })
    }

    /// Whether the required LLM credential was present at startup.
    pub fn has_llm_key(&self) -> bool {
        self.llm_key_present
    }
}

// ---------------------------------------------------------------------------
// Analysis result & progress
// ---------------------------------------------------------------------------

/// Outcome of one analysis request.
#[derive(Debug)]
pub struct Analysis {
    /// The rendered HTML report.
    pub html: String,
    /// Number of provider sections that survived the validity filter.
    pub sections: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, analysis: &Analysis);
}

/// No-op progress reporter for headless/server usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _analysis: &Analysis) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full analysis pipeline for one URL.
///
/// 1. Extract the page's paragraph text
/// 2. Derive summary + key topics (two LLM calls, both required)
/// 3. Query the three knowledge services with the combined context
/// 4. Render the filtered results
///
/// Extraction and summarization errors abort the request; enrichment
/// failures were already sentinel-mapped and filtered below this layer.
#[instrument(skip_all, fields(url = %url))]
pub async fn analyze(
    engine: &AnalysisEngine,
    url: &Url,
    progress: &dyn ProgressReporter,
) -> Result<Analysis> {
    let start = Instant::now();

    info!("starting analysis");

    progress.phase("Extracting page text");
    let text = engine.extractor.extract(url).await?;

    progress.phase("Summarizing content");
    let context = pagelens_summarize::summarize(&engine.chat, &text).await?;
    let combined = context.combined();

    progress.phase("Querying knowledge services");
    let results = pagelens_enrich::orchestrate(&engine.enrich, &combined, &engine.tokens).await;

    progress.phase("Rendering report");
    let html = pagelens_report::render(url.as_str(), &results);

    let analysis = Analysis {
        html,
        sections: results.len(),
        elapsed: start.elapsed(),
    };

    progress.done(&analysis);

    info!(
        sections = analysis.sections,
        elapsed_ms = analysis.elapsed.as_millis(),
        "analysis complete"
    );

    Ok(analysis)
}
