use serde::Serialize;

use super::types::{Label, RawPrediction};

/// A prediction must clear this score to be shown as positive or negative.
pub const CATEGORY_CONFIDENCE_FLOOR: f64 = 0.5;

/// UI-facing sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Positive,
    Negative,
    Neutral,
}

impl Category {
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }

    pub fn icon_class(self) -> &'static str {
        match self {
            Self::Positive => "icon-thumbs-up",
            Self::Negative => "icon-thumbs-down",
            Self::Neutral => "icon-neutral",
        }
    }
}

/// Display-ready sentiment for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentCategory {
    pub category: Category,
    pub display_label: &'static str,
    pub confidence_score: f64,
    pub icon_class: &'static str,
}

impl SentimentCategory {
    /// e.g. `"95.0% confidence"`
    pub fn confidence_text(&self) -> String {
        format!("{:.1}% confidence", self.confidence_score * 100.0)
    }
}

/// Bucket a prediction for display.
///
/// Any prediction at or below the confidence floor is neutral whatever its
/// label, and so is any label that is not a known polarity.
pub fn categorize(prediction: &RawPrediction) -> SentimentCategory {
    let confident = prediction.score > CATEGORY_CONFIDENCE_FLOOR;
    let category = match prediction.label {
        Label::Positive if confident => Category::Positive,
        Label::Negative if confident => Category::Negative,
        _ => Category::Neutral,
    };

    SentimentCategory {
        category,
        display_label: category.display_label(),
        confidence_score: prediction.score,
        icon_class: category.icon_class(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIDENT: &[f64] = &[0.5000001, 0.51, 0.6, 0.75, 0.92, 0.99, 1.0];
    const UNSURE: &[f64] = &[0.0, 0.1, 0.3, 0.42, 0.4999, 0.5];

    #[test]
    fn confident_positive_is_positive() {
        for &s in CONFIDENT {
            assert_eq!(categorize(&RawPrediction::positive(s)).category, Category::Positive, "score {s}");
        }
    }

    #[test]
    fn confident_negative_is_negative() {
        for &s in CONFIDENT {
            assert_eq!(categorize(&RawPrediction::negative(s)).category, Category::Negative, "score {s}");
        }
    }

    #[test]
    fn low_confidence_is_neutral_regardless_of_label() {
        for &s in UNSURE {
            assert_eq!(categorize(&RawPrediction::positive(s)).category, Category::Neutral, "score {s}");
            assert_eq!(categorize(&RawPrediction::negative(s)).category, Category::Neutral, "score {s}");
        }
    }

    #[test]
    fn unknown_label_is_neutral() {
        let pred = RawPrediction::new(Label::Other("LABEL_2".into()), 0.99);
        assert_eq!(categorize(&pred).category, Category::Neutral);
    }

    #[test]
    fn lowercase_label_is_neutral() {
        let pred = RawPrediction::new(Label::parse("positive"), 0.99);
        assert_eq!(categorize(&pred).category, Category::Neutral);
    }

    #[test]
    fn carries_display_metadata() {
        let result = categorize(&RawPrediction::positive(0.95));
        assert_eq!(result.display_label, "POSITIVE");
        assert_eq!(result.icon_class, "icon-thumbs-up");
        assert_eq!(result.confidence_score, 0.95);
        assert_eq!(result.confidence_text(), "95.0% confidence");

        let neutral = categorize(&RawPrediction::positive(0.42));
        assert_eq!(neutral.display_label, "NEUTRAL");
        assert_eq!(neutral.icon_class, "icon-neutral");
        assert_eq!(neutral.confidence_text(), "42.0% confidence");
    }

    #[test]
    fn is_deterministic() {
        let pred = RawPrediction::negative(0.55);
        assert_eq!(categorize(&pred), categorize(&pred));
    }

    #[test]
    fn category_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Category::Neutral).unwrap(), "\"neutral\"");
    }
}
