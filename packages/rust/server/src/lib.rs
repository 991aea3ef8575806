//! HTTP surface for PageLens.
//!
//! One analysis endpoint plus a health probe. State is an explicit
//! [`AnalysisEngine`] handle — no ambient globals; tests construct the
//! router against fake backends.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info_span};
use url::Url;
use uuid::Uuid;

use pagelens_core::{AnalysisEngine, SilentProgress};
use pagelens_shared::{PageLensError, Result};

// ---------------------------------------------------------------------------
// State & router
// ---------------------------------------------------------------------------

/// Shared state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
    /// Name of the env var the LLM key is read from, for the error body.
    pub llm_api_key_env: String,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", get(analyze_handler))
        .route("/health", get(health_handler))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                info_span!(
                    "http",
                    request_id = %Uuid::now_v7(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
}

/// Bind `addr` and serve the router until the process exits.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| PageLensError::Network(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "server listening");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| PageLensError::Network(format!("server error: {e}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    "ok"
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    url: Option<String>,
}

/// Analyze a web page and return the aggregated HTML report.
///
/// The LLM credential is checked before the query parameter is read:
/// missing configuration is a 500 regardless of the request's shape.
async fn analyze_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Response {
    if !state.engine.has_llm_key() {
        let body = format!("{} is not set", state.llm_api_key_env);
        return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
    }

    let Some(url) = params.url else {
        return (StatusCode::BAD_REQUEST, "URL parameter is required").into_response();
    };

    let url = match Url::parse(&url) {
        Ok(url) => url,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("invalid url: {e}")).into_response();
        }
    };

    match pagelens_core::analyze(&state.engine, &url, &SilentProgress).await {
        Ok(analysis) => Html(analysis.html).into_response(),
        Err(e) => {
            // Fatal pipeline error: surface a generic message, log the cause
            error!(error = %e, "analysis failed");
            (StatusCode::BAD_GATEWAY, "analysis failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_shared::{AppConfig, Credentials};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Spawn the router on an ephemeral port; returns its base URL.
    async fn spawn_app(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn state_with(backend_uri: &str, llm_api_key: &str) -> AppState {
        let mut config = AppConfig::default();
        config.llm.base_url = backend_uri.to_string();
        config.enrichment.endpoint = format!("{backend_uri}/generate");

        let credentials = Credentials {
            llm_api_key: llm_api_key.into(),
            architecture_token: "tok-arch".into(),
            performance_token: "tok-perf".into(),
            ml_resources_token: "tok-ml".into(),
        };

        AppState {
            engine: Arc::new(AnalysisEngine::new(&config, &credentials).unwrap()),
            llm_api_key_env: config.llm.api_key_env.clone(),
        }
    }

    #[tokio::test]
    async fn health_endpoint_responds_ok() {
        let backend = MockServer::start().await;
        let base = spawn_app(state_with(&backend.uri(), "sk-test")).await;

        let response = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn missing_url_parameter_is_a_400_with_no_outbound_calls() {
        let backend = MockServer::start().await;
        // Any outbound call would fail the mock server's expectations
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&backend)
            .await;

        let base = spawn_app(state_with(&backend.uri(), "sk-test")).await;
        let response = reqwest::get(format!("{base}/analyze")).await.unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(response.text().await.unwrap(), "URL parameter is required");
    }

    #[tokio::test]
    async fn missing_llm_key_is_a_500_checked_before_the_url_parameter() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&backend)
            .await;

        let base = spawn_app(state_with(&backend.uri(), "")).await;

        // No url parameter either: the credential check must win
        let response = reqwest::get(format!("{base}/analyze")).await.unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(response.text().await.unwrap(), "OPENAI_API_KEY is not set");
    }

    #[tokio::test]
    async fn invalid_url_parameter_is_a_400() {
        let backend = MockServer::start().await;
        let base = spawn_app(state_with(&backend.uri(), "sk-test")).await;

        let response = reqwest::get(format!("{base}/analyze?url=not-a-url"))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn successful_analysis_returns_html() {
        let backend = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>Hello world.</p></body></html>"),
            )
            .mount(&backend)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("concise summary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "S"}}]
            })))
            .mount(&backend)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("key topics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "T"}}]
            })))
            .mount(&backend)
            .await;

        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("authorization", "Bearer tok-arch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "completion": serde_json::json!({"Answer": ["x"]}).to_string()
            })))
            .mount(&backend)
            .await;
        for token in ["tok-perf", "tok-ml"] {
            Mock::given(method("POST"))
                .and(path("/generate"))
                .and(header("authorization", format!("Bearer {token}")))
                .respond_with(ResponseTemplate::new(503))
                .mount(&backend)
                .await;
        }

        let base = spawn_app(state_with(&backend.uri(), "sk-test")).await;
        let page_url = format!("{}/article", backend.uri());
        let response = reqwest::get(format!("{base}/analyze?url={page_url}"))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"));

        let body = response.text().await.unwrap();
        assert!(body.contains("C++ Architecture and Design"));
        assert!(body.contains("<li>x</li>"));
        assert!(!body.contains("Machine Learning Resources"));
    }

    #[tokio::test]
    async fn pipeline_failure_is_a_502_with_generic_body() {
        let backend = MockServer::start().await;

        // Page fetch fails, which aborts the pipeline
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&backend)
            .await;

        let base = spawn_app(state_with(&backend.uri(), "sk-test")).await;
        let page_url = format!("{}/article", backend.uri());
        let response = reqwest::get(format!("{base}/analyze?url={page_url}"))
            .await
            .unwrap();

        assert_eq!(response.status(), 502);
        assert_eq!(response.text().await.unwrap(), "analysis failed");
    }
}
