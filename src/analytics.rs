//! Best-effort analytics.
//!
//! One event per successful analysis, posted to a collection endpoint in a
//! detached task. Delivery is never awaited, retried or reported back:
//! transport failures end in a `warn!` and nothing else.
//!
//! Emission needs both an endpoint and a user credential. Without either,
//! `emit` is a no-op that returns `Dispatch::Skipped`.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::pipeline::decision::BusinessAction;

/// Value of the `event` field.
pub const EVENT_TYPE: &str = "sentiment_analysis";

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Analytics transport error: {0}")]
    Transport(String),
}

// ═══════════════════════════════════════════════════════════
// Event
// ═══════════════════════════════════════════════════════════

/// Static facts about the page that go into every event.
#[derive(Debug, Clone)]
pub struct AnalyticsContext {
    pub variant: String,
    pub page_url: String,
}

/// Wire shape expected by the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub ts_iso: String,
    pub event: String,
    pub variant: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    /// JSON-encoded string, not a nested object.
    pub meta: String,
    pub review: String,
    pub sentiment_label: String,
    pub sentiment_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
}

impl AnalyticsEvent {
    pub fn new(
        review: &str,
        sentiment_label: &str,
        confidence: f64,
        action: Option<BusinessAction>,
        context: &AnalyticsContext,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            ts_iso: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            event: EVENT_TYPE.to_string(),
            variant: context.variant.clone(),
            user_id: format!("user-{}", now.timestamp_millis()),
            meta: serde_json::json!({ "url": context.page_url }).to_string(),
            review: review.to_string(),
            sentiment_label: sentiment_label.to_string(),
            sentiment_confidence: confidence,
            action_taken: action.map(|a| a.code().to_string()),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Sink
// ═══════════════════════════════════════════════════════════

/// Transport for analytics events.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn send(&self, event: &AnalyticsEvent, credential: &str) -> Result<(), AnalyticsError>;
}

/// JSON POST to the collection endpoint. The response is not inspected.
pub struct HttpAnalyticsSink {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpAnalyticsSink {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn send(&self, event: &AnalyticsEvent, credential: &str) -> Result<(), AnalyticsError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(event)
            .send()
            .await
            .map_err(|e| AnalyticsError::Transport(e.to_string()))?;

        tracing::debug!(status = response.status().as_u16(), "Analytics event posted");
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Emitter
// ═══════════════════════════════════════════════════════════

/// Whether analytics can run, and with what.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsConfig {
    pub endpoint: Option<String>,
    pub credential: Option<String>,
}

impl AnalyticsConfig {
    pub fn enabled(&self) -> bool {
        self.endpoint.is_some() && self.credential.is_some()
    }
}

/// Outcome of one `emit` call.
#[derive(Debug)]
pub enum Dispatch {
    /// Analytics not enabled; nothing was sent.
    Skipped,
    /// Transmission running in the background.
    Detached(JoinHandle<()>),
}

pub struct AnalyticsEmitter {
    endpoint: Option<String>,
    sink: Option<Arc<dyn AnalyticsSink>>,
    credential: RwLock<Option<String>>,
    context: AnalyticsContext,
}

impl AnalyticsEmitter {
    pub fn from_config(config: AnalyticsConfig, context: AnalyticsContext) -> Self {
        let sink = config
            .endpoint
            .as_deref()
            .map(|url| Arc::new(HttpAnalyticsSink::new(url)) as Arc<dyn AnalyticsSink>);
        Self {
            endpoint: config.endpoint,
            sink,
            credential: RwLock::new(config.credential),
            context,
        }
    }

    /// Emitter over a custom sink. `label` stands in for the endpoint.
    pub fn with_sink(
        label: &str,
        sink: Arc<dyn AnalyticsSink>,
        credential: Option<String>,
        context: AnalyticsContext,
    ) -> Self {
        Self {
            endpoint: Some(label.to_string()),
            sink: Some(sink),
            credential: RwLock::new(credential),
            context,
        }
    }

    pub fn disabled(context: AnalyticsContext) -> Self {
        Self::from_config(AnalyticsConfig::default(), context)
    }

    pub fn config(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            endpoint: self.endpoint.clone(),
            credential: self.credential(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.config().enabled()
    }

    /// Replace the credential. `None` turns analytics off.
    pub fn set_credential(&self, credential: Option<String>) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    fn credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Attempt to send one event. Never fails and never waits for delivery.
    pub fn emit(
        &self,
        review: &str,
        sentiment_label: &str,
        confidence: f64,
        action: Option<BusinessAction>,
    ) -> Dispatch {
        let (Some(sink), Some(credential)) = (self.sink.clone(), self.credential()) else {
            tracing::debug!("Analytics disabled, event skipped");
            return Dispatch::Skipped;
        };

        let event = AnalyticsEvent::new(
            review,
            sentiment_label,
            confidence,
            action,
            &self.context,
            Utc::now(),
        );

        Dispatch::Detached(tokio::spawn(async move {
            if let Err(e) = sink.send(&event, &credential).await {
                tracing::warn!(error = %e, "Analytics event not delivered");
            }
        }))
    }
}
