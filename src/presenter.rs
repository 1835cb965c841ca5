//! View model handed to the page for one finished analysis.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::decision::BusinessDecision;
use crate::pipeline::sentiment::SentimentCategory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisView {
    pub analysis_id: Uuid,
    pub review: String,
    pub sentiment: SentimentCategory,
    /// e.g. `"92.0% confidence"`
    pub confidence_text: String,
    pub decision: BusinessDecision,
    pub analyzed_at: DateTime<Utc>,
}

pub fn render(
    review: &str,
    sentiment: SentimentCategory,
    decision: BusinessDecision,
) -> AnalysisView {
    AnalysisView {
        analysis_id: Uuid::new_v4(),
        review: review.to_string(),
        confidence_text: sentiment.confidence_text(),
        sentiment,
        decision,
        analyzed_at: Utc::now(),
    }
}
