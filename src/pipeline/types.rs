use serde::{Deserialize, Serialize};

/// Sentiment polarity reported by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Positive,
    Negative,
    /// Any label the model emits that is not a known polarity.
    Other(String),
}

impl Label {
    /// Parse a classifier label. Only the exact strings `POSITIVE` and
    /// `NEGATIVE` are polarities; anything else is kept as `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "POSITIVE" => Self::Positive,
            "NEGATIVE" => Self::Negative,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Top-ranked classifier output for one review. Score is within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub label: Label,
    pub score: f64,
}

impl RawPrediction {
    pub fn new(label: Label, score: f64) -> Self {
        Self { label, score }
    }

    pub fn positive(score: f64) -> Self {
        Self::new(Label::Positive, score)
    }

    pub fn negative(score: f64) -> Self {
        Self::new(Label::Negative, score)
    }
}
