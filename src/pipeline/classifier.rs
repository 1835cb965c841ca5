//! Sentiment classifier access.
//!
//! `SentimentClassifier` is the seam to the external inference engine.
//! `ClassifierAdapter` wraps one and enforces readiness: nothing is
//! classified until `initialize()` has succeeded.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use super::types::{Label, RawPrediction};
use crate::config::Settings;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClassifierError {
    #[error("The sentiment model is not ready yet")]
    ModelNotReady,

    #[error("Failed to load sentiment model: {0}")]
    ModelLoad(String),

    #[error("Sentiment analysis failed: {0}")]
    InferenceFailure(String),
}

/// External text-classification capability.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Load or warm up the model. Runs once, before any `classify`.
    async fn initialize(&self) -> Result<(), ClassifierError>;

    /// Classify one text and return the top-ranked prediction.
    async fn classify(&self, text: &str) -> Result<RawPrediction, ClassifierError>;

    fn model_name(&self) -> &str;
}

// ═══════════════════════════════════════════════════════════
// ClassifierAdapter: readiness gate
// ═══════════════════════════════════════════════════════════

pub struct ClassifierAdapter {
    inner: Arc<dyn SentimentClassifier>,
    ready: AtomicBool,
}

impl ClassifierAdapter {
    pub fn new(inner: Arc<dyn SentimentClassifier>) -> Self {
        Self {
            inner,
            ready: AtomicBool::new(false),
        }
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Run the model's initialization. Marks the adapter ready on success.
    pub async fn initialize(&self) -> Result<(), ClassifierError> {
        tracing::info!(model = self.model_name(), "Initializing sentiment model");
        self.inner.initialize().await.map_err(|e| match e {
            ClassifierError::ModelLoad(_) => e,
            other => ClassifierError::ModelLoad(other.to_string()),
        })?;
        self.ready.store(true, Ordering::Release);
        tracing::info!(model = self.model_name(), "Sentiment model ready");
        Ok(())
    }

    /// Exactly one call to the underlying classifier. Results with a score
    /// outside [0, 1] are reported as inference failures.
    pub async fn classify(&self, text: &str) -> Result<RawPrediction, ClassifierError> {
        if !self.is_ready() {
            return Err(ClassifierError::ModelNotReady);
        }

        let prediction = self.inner.classify(text).await.map_err(|e| match e {
            ClassifierError::InferenceFailure(_) | ClassifierError::ModelNotReady => e,
            other => ClassifierError::InferenceFailure(other.to_string()),
        })?;

        if !(0.0..=1.0).contains(&prediction.score) {
            return Err(ClassifierError::InferenceFailure(format!(
                "score {} is outside [0, 1]",
                prediction.score
            )));
        }
        Ok(prediction)
    }
}

// ═══════════════════════════════════════════════════════════
// InferenceClient: HTTP text-classification endpoint
// ═══════════════════════════════════════════════════════════

/// Client for a Hugging Face style inference endpoint:
/// `POST {base_url}/models/{model}` with `{"inputs": "..."}`.
pub struct InferenceClient {
    base_url: String,
    model: String,
    token: Option<String>,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    options: ClassifyOptions,
}

#[derive(Serialize)]
struct ClassifyOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct ScoredLabel {
    label: String,
    score: f64,
}

/// Pipelines return either `[{..}]` or `[[{..}]]` depending on the backend.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<ScoredLabel>>),
    Flat(Vec<ScoredLabel>),
}

impl ClassifyResponse {
    fn top(self) -> Option<ScoredLabel> {
        match self {
            Self::Nested(batches) => batches.into_iter().next()?.into_iter().next(),
            Self::Flat(labels) => labels.into_iter().next(),
        }
    }
}

/// Text sent during initialization to get the model loaded.
const WARM_UP_TEXT: &str = "The product arrived on time.";

impl InferenceClient {
    pub fn new(base_url: &str, model: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.classifier_url,
            &settings.model,
            settings.classifier_token.clone(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    async fn request(&self, text: &str, wait_for_model: bool) -> Result<RawPrediction, String> {
        let body = ClassifyRequest {
            inputs: text,
            options: ClassifyOptions { wait_for_model },
        };

        let mut request = self.http.post(self.endpoint()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                format!("inference service is not reachable at {}", self.base_url)
            } else {
                format!("HTTP client error: {e}")
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!(
                "inference service returned status {}: {body}",
                status.as_u16()
            ));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| format!("unexpected response shape: {e}"))?;

        let top = parsed
            .top()
            .ok_or_else(|| "inference service returned no labels".to_string())?;

        Ok(RawPrediction::new(Label::parse(&top.label), top.score))
    }
}

#[async_trait]
impl SentimentClassifier for InferenceClient {
    async fn initialize(&self) -> Result<(), ClassifierError> {
        self.request(WARM_UP_TEXT, true)
            .await
            .map(|_| ())
            .map_err(ClassifierError::ModelLoad)
    }

    async fn classify(&self, text: &str) -> Result<RawPrediction, ClassifierError> {
        self.request(text, false)
            .await
            .map_err(ClassifierError::InferenceFailure)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ═══════════════════════════════════════════════════════════
// MockClassifier
// ═══════════════════════════════════════════════════════════

/// Scripted classifier for tests and offline demos.
///
/// Optionally gated: each `classify` then waits for one notification on
/// the handle returned by `gated()`.
pub struct MockClassifier {
    prediction: Result<RawPrediction, String>,
    init_failure: Option<String>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new(prediction: RawPrediction) -> Self {
        Self {
            prediction: Ok(prediction),
            init_failure: None,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A classifier whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            prediction: Err(message.to_string()),
            ..Self::new(RawPrediction::positive(1.0))
        }
    }

    pub fn with_init_failure(mut self, message: &str) -> Self {
        self.init_failure = Some(message.to_string());
        self
    }

    /// Hold every `classify` until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for MockClassifier {
    async fn initialize(&self) -> Result<(), ClassifierError> {
        match &self.init_failure {
            Some(message) => Err(ClassifierError::ModelLoad(message.clone())),
            None => Ok(()),
        }
    }

    async fn classify(&self, _text: &str) -> Result<RawPrediction, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.prediction
            .clone()
            .map_err(ClassifierError::InferenceFailure)
    }

    fn model_name(&self) -> &str {
        "mock-sentiment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    /// Serve `app` on an ephemeral local port, returning the base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn adapter(classifier: MockClassifier) -> ClassifierAdapter {
        ClassifierAdapter::new(Arc::new(classifier))
    }

    #[tokio::test]
    async fn classify_before_initialize_is_not_ready() {
        let adapter = adapter(MockClassifier::new(RawPrediction::positive(0.9)));
        assert!(!adapter.is_ready());
        let err = adapter.classify("hello").await.unwrap_err();
        assert!(matches!(err, ClassifierError::ModelNotReady));
    }

    #[tokio::test]
    async fn classify_after_initialize_returns_prediction() {
        let adapter = adapter(MockClassifier::new(RawPrediction::negative(0.8)));
        adapter.initialize().await.unwrap();
        assert!(adapter.is_ready());
        let pred = adapter.classify("bad").await.unwrap();
        assert_eq!(pred, RawPrediction::negative(0.8));
    }

    #[tokio::test]
    async fn failed_initialize_stays_not_ready() {
        let adapter = adapter(
            MockClassifier::new(RawPrediction::positive(0.9)).with_init_failure("no weights"),
        );
        let err = adapter.initialize().await.unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad(_)));
        assert!(!adapter.is_ready());
    }

    #[tokio::test]
    async fn underlying_failure_is_inference_failure() {
        let adapter = adapter(MockClassifier::failing("boom"));
        adapter.initialize().await.unwrap();
        let err = adapter.classify("x").await.unwrap_err();
        assert!(matches!(err, ClassifierError::InferenceFailure(ref m) if m == "boom"));
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected() {
        let adapter = adapter(MockClassifier::new(RawPrediction::positive(1.5)));
        adapter.initialize().await.unwrap();
        assert!(matches!(
            adapter.classify("x").await,
            Err(ClassifierError::InferenceFailure(_))
        ));

        let nan = adapter_ready(RawPrediction::positive(f64::NAN)).await;
        assert!(nan.classify("x").await.is_err());
    }

    async fn adapter_ready(prediction: RawPrediction) -> ClassifierAdapter {
        let a = adapter(MockClassifier::new(prediction));
        a.initialize().await.unwrap();
        a
    }

    #[tokio::test]
    async fn each_classify_is_one_call() {
        let mock = Arc::new(MockClassifier::new(RawPrediction::positive(0.7)));
        let adapter = ClassifierAdapter::new(mock.clone());
        adapter.initialize().await.unwrap();
        adapter.classify("a").await.unwrap();
        adapter.classify("a").await.unwrap();
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn http_client_reads_nested_response() {
        let app = Router::new().route(
            "/models/:model",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["inputs"], "I love it");
                Json(serde_json::json!([[
                    {"label": "POSITIVE", "score": 0.9991},
                    {"label": "NEGATIVE", "score": 0.0009}
                ]]))
            }),
        );
        let base = serve(app).await;

        let client = InferenceClient::new(&base, "sst2", None);
        let pred = client.classify("I love it").await.unwrap();
        assert_eq!(pred.label, Label::Positive);
        assert!((pred.score - 0.9991).abs() < 1e-12);
    }

    #[tokio::test]
    async fn http_client_reads_flat_response_and_sends_token() {
        let app = Router::new().route(
            "/models/:model",
            post(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                assert_eq!(auth, "Bearer hf_secret");
                Json(serde_json::json!([{"label": "NEGATIVE", "score": 0.97}]))
            }),
        );
        let base = serve(app).await;

        let client = InferenceClient::new(&format!("{base}/"), "sst2", Some("hf_secret".into()));
        assert_eq!(client.base_url(), base);
        let pred = client.classify("awful").await.unwrap();
        assert_eq!(pred, RawPrediction::negative(0.97));
    }

    #[tokio::test]
    async fn http_error_status_is_inference_failure() {
        let app = Router::new().route(
            "/models/:model",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
        );
        let base = serve(app).await;

        let client = InferenceClient::new(&base, "sst2", None);
        let err = client.classify("x").await.unwrap_err();
        assert!(matches!(err, ClassifierError::InferenceFailure(ref m) if m.contains("503")));

        let err = client.initialize().await.unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad(_)));
    }

    #[tokio::test]
    async fn empty_label_list_is_inference_failure() {
        let app = Router::new().route(
            "/models/:model",
            post(|| async { Json(serde_json::json!([])) }),
        );
        let base = serve(app).await;

        let client = InferenceClient::new(&base, "sst2", None);
        assert!(matches!(
            client.classify("x").await,
            Err(ClassifierError::InferenceFailure(_))
        ));
    }

    #[tokio::test]
    async fn initialize_asks_endpoint_to_wait_for_model() {
        let app = Router::new().route(
            "/models/:model",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["options"]["wait_for_model"], true);
                Json(serde_json::json!([{"label": "POSITIVE", "score": 0.6}]))
            }),
        );
        let base = serve(app).await;

        let client = InferenceClient::new(&base, "sst2", None);
        client.initialize().await.unwrap();
    }
}
