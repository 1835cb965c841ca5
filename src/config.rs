use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Review Pulse";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_DATASET: &str = "reviews_test.tsv";
const DEFAULT_CLASSIFIER_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
const DEFAULT_VARIANT: &str = "B";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "review_pulse_lib=info,review_pulse=info,tower_http=info"
}

/// Get the application data directory.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ReviewPulse")
}

/// File holding the persisted analytics credential.
pub fn credentials_path() -> PathBuf {
    app_data_dir().join("credentials.json")
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBindAddress { value: String, reason: String },
}

/// Runtime settings, resolved from `REVIEW_PULSE_*` environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Local path or `http(s)://` URL of the review TSV.
    pub dataset: String,
    pub classifier_url: String,
    pub model: String,
    /// Token for the inference endpoint (not the analytics credential).
    pub classifier_token: Option<String>,
    pub analytics_url: Option<String>,
    pub variant: String,
    /// Page URL reported in the analytics `meta` field.
    pub public_url: String,
    pub credentials_path: PathBuf,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = get("REVIEW_PULSE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr: SocketAddr =
            bind_raw
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddress {
                    value: bind_raw.clone(),
                    reason: e.to_string(),
                })?;

        let public_url =
            get("REVIEW_PULSE_PUBLIC_URL").unwrap_or_else(|| format!("http://{bind_addr}/"));

        Ok(Self {
            bind_addr,
            dataset: get("REVIEW_PULSE_DATASET").unwrap_or_else(|| DEFAULT_DATASET.to_string()),
            classifier_url: get("REVIEW_PULSE_CLASSIFIER_URL")
                .unwrap_or_else(|| DEFAULT_CLASSIFIER_URL.to_string()),
            model: get("REVIEW_PULSE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            classifier_token: get("REVIEW_PULSE_HF_TOKEN"),
            analytics_url: get("REVIEW_PULSE_ANALYTICS_URL"),
            variant: get("REVIEW_PULSE_VARIANT").unwrap_or_else(|| DEFAULT_VARIANT.to_string()),
            public_url,
            credentials_path: credentials_path(),
        })
    }
}
