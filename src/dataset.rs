//! Review dataset acquisition.
//!
//! Reads a tab-separated file (local path or `http(s)://` URL) with a header
//! row, keeps the `text` column, and drops entries that are blank after
//! trimming. The resulting `ReviewCorpus` is never empty.

use std::path::PathBuf;

use async_trait::async_trait;
use rand::Rng;

/// Column holding the review body.
const TEXT_COLUMN: &str = "text";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Review data unavailable: {0}")]
    DataUnavailable(String),

    #[error("No reviews found in the dataset")]
    EmptyCorpus,
}

// ═══════════════════════════════════════════════════════════
// ReviewCorpus
// ═══════════════════════════════════════════════════════════

/// Ordered, non-empty list of review texts. Immutable once built.
#[derive(Debug, Clone)]
pub struct ReviewCorpus {
    reviews: Vec<String>,
}

impl ReviewCorpus {
    /// Build a corpus, discarding entries that are blank after trimming.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reviews: Vec<String> = entries
            .into_iter()
            .map(Into::into)
            .filter(|text| !text.trim().is_empty())
            .collect();

        if reviews.is_empty() {
            return Err(DatasetError::EmptyCorpus);
        }
        Ok(Self { reviews })
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.reviews.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.reviews.iter().map(String::as_str)
    }

    /// Uniformly random review.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.reviews[rng.gen_range(0..self.reviews.len())]
    }
}

// ═══════════════════════════════════════════════════════════
// Sources
// ═══════════════════════════════════════════════════════════

/// Anything that can produce the review corpus.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn load(&self) -> Result<ReviewCorpus, DatasetError>;
}

/// Where the TSV lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    File(PathBuf),
    Url(String),
}

impl DatasetLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Tab-separated review file with a `text` column.
pub struct TsvSource {
    location: DatasetLocation,
    http: reqwest::Client,
}

impl TsvSource {
    pub fn new(location: DatasetLocation) -> Self {
        Self {
            location,
            http: reqwest::Client::new(),
        }
    }

    pub fn location(&self) -> &DatasetLocation {
        &self.location
    }

    async fn fetch(&self) -> Result<String, DatasetError> {
        match &self.location {
            DatasetLocation::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                DatasetError::DataUnavailable(format!("cannot read {}: {e}", path.display()))
            }),
            DatasetLocation::Url(url) => {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| DatasetError::DataUnavailable(format!("cannot fetch {url}: {e}")))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(DatasetError::DataUnavailable(format!(
                        "{url} returned status {}",
                        status.as_u16()
                    )));
                }

                response
                    .text()
                    .await
                    .map_err(|e| DatasetError::DataUnavailable(format!("cannot read body of {url}: {e}")))
            }
        }
    }
}

#[async_trait]
impl ReviewSource for TsvSource {
    async fn load(&self) -> Result<ReviewCorpus, DatasetError> {
        let raw = self.fetch().await?;
        let rows = parse_text_column(&raw)?;
        let total = rows.len();
        let corpus = ReviewCorpus::from_entries(rows)?;
        tracing::info!(
            source = %self.location,
            rows = total,
            usable = corpus.len(),
            "Review dataset loaded"
        );
        Ok(corpus)
    }
}

/// In-memory source. Entries go through the same blank filter as the TSV.
pub struct StaticSource {
    entries: Vec<String>,
}

impl StaticSource {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ReviewSource for StaticSource {
    async fn load(&self) -> Result<ReviewCorpus, DatasetError> {
        ReviewCorpus::from_entries(self.entries.iter().cloned())
    }
}

// ═══════════════════════════════════════════════════════════
// TSV parsing
// ═══════════════════════════════════════════════════════════

/// Extract the `text` column of a TSV document.
///
/// Fields may be double-quoted, in which case they can hold tabs, newlines
/// and `""` escapes. Rows too short to reach the column are skipped. An
/// input with no lines at all yields no rows; a header without a `text`
/// column is malformed.
pub fn parse_text_column(raw: &str) -> Result<Vec<String>, DatasetError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(raw.as_bytes());

    let column = reader
        .headers()
        .map_err(|e| DatasetError::DataUnavailable(format!("cannot read header row: {e}")))?
        .iter()
        .position(|name| name.trim() == TEXT_COLUMN)
        .ok_or_else(|| {
            DatasetError::DataUnavailable(format!("header has no '{TEXT_COLUMN}' column"))
        })?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            DatasetError::DataUnavailable(format!("cannot read row {}: {e}", idx + 1))
        })?;
        if let Some(text) = record.get(column) {
            rows.push(text.to_string());
        }
    }
    Ok(rows)
}
