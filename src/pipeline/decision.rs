//! Business decision engine.
//!
//! Folds a prediction onto a single favourable/unfavourable scale and picks
//! one of three actions by fixed bands. Pure: the side effect of an action
//! is dispatched by whoever renders the decision, keyed on `BusinessAction`.

use serde::Serialize;

use super::types::{Label, RawPrediction};

/// Normalized-score bands for business actions.
pub mod decision_thresholds {
    /// At or below: churn risk, offer a coupon.
    pub const COUPON_MAX: f64 = 0.4;

    /// At or above: satisfied, ask for a referral.
    pub const REFERRAL_MIN: f64 = 0.7;

    /// Score used when the label carries no polarity.
    pub const UNKNOWN_LABEL: f64 = 0.5;
}

/// What the business should do about a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessAction {
    OfferCoupon,
    RequestFeedback,
    AskReferral,
}

impl BusinessAction {
    pub fn code(self) -> &'static str {
        match self {
            Self::OfferCoupon => "OFFER_COUPON",
            Self::RequestFeedback => "REQUEST_FEEDBACK",
            Self::AskReferral => "ASK_REFERRAL",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::OfferCoupon => {
                "Churn risk: this customer is unhappy. Offer a discount coupon to win them back."
            }
            Self::RequestFeedback => {
                "Mixed signals: ask the customer what would make their experience better."
            }
            Self::AskReferral => {
                "Happy customer: invite them to refer a friend."
            }
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::OfferCoupon => "#ef4444",
            Self::RequestFeedback => "#f59e0b",
            Self::AskReferral => "#10b981",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Self::OfferCoupon => "Send 20% coupon",
            Self::RequestFeedback => "Request feedback",
            Self::AskReferral => "Share referral link",
        }
    }
}

impl std::fmt::Display for BusinessAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Decision for one prediction, with its presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessDecision {
    pub action: BusinessAction,
    pub normalized_score: f64,
    pub message: &'static str,
    pub color: &'static str,
    pub button_label: &'static str,
}

/// 1.0 is maximally favourable, 0.0 maximally unfavourable.
pub fn normalized_score(label: &Label, score: f64) -> f64 {
    match label {
        Label::Positive => score,
        Label::Negative => 1.0 - score,
        Label::Other(_) => decision_thresholds::UNKNOWN_LABEL,
    }
}

/// Band a normalized score. `0.4` is a coupon, `0.7` is a referral.
pub fn action_for(normalized: f64) -> BusinessAction {
    if normalized <= decision_thresholds::COUPON_MAX {
        BusinessAction::OfferCoupon
    } else if normalized < decision_thresholds::REFERRAL_MIN {
        BusinessAction::RequestFeedback
    } else {
        BusinessAction::AskReferral
    }
}

pub fn decide(label: &Label, score: f64) -> BusinessDecision {
    let normalized = normalized_score(label, score);
    let action = action_for(normalized);
    BusinessDecision {
        action,
        normalized_score: normalized,
        message: action.message(),
        color: action.color(),
        button_label: action.button_label(),
    }
}

pub fn decide_for(prediction: &RawPrediction) -> BusinessDecision {
    decide(&prediction.label, prediction.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn confident_positive_asks_referral() {
        let d = decide(&Label::Positive, 0.95);
        assert!(approx(d.normalized_score, 0.95));
        assert_eq!(d.action, BusinessAction::AskReferral);
    }

    #[test]
    fn confident_negative_offers_coupon() {
        let d = decide(&Label::Negative, 0.92);
        assert!(approx(d.normalized_score, 0.08));
        assert_eq!(d.action, BusinessAction::OfferCoupon);
    }

    #[test]
    fn weak_positive_requests_feedback() {
        let d = decide(&Label::Positive, 0.42);
        assert!(approx(d.normalized_score, 0.42));
        assert_eq!(d.action, BusinessAction::RequestFeedback);
    }

    #[test]
    fn weak_negative_requests_feedback() {
        let d = decide(&Label::Negative, 0.55);
        assert!(approx(d.normalized_score, 0.45));
        assert_eq!(d.action, BusinessAction::RequestFeedback);
    }

    #[test]
    fn unknown_label_is_neutral_midpoint() {
        let d = decide(&Label::Other("LABEL_2".into()), 0.99);
        assert_eq!(d.normalized_score, 0.5);
        assert_eq!(d.action, BusinessAction::RequestFeedback);
    }

    #[test]
    fn band_boundaries_are_exact() {
        assert_eq!(action_for(0.0), BusinessAction::OfferCoupon);
        assert_eq!(action_for(0.4), BusinessAction::OfferCoupon);
        assert_eq!(action_for(0.400_000_1), BusinessAction::RequestFeedback);
        assert_eq!(action_for(0.699_999_9), BusinessAction::RequestFeedback);
        assert_eq!(action_for(0.7), BusinessAction::AskReferral);
        assert_eq!(action_for(1.0), BusinessAction::AskReferral);
    }

    #[test]
    fn every_score_maps_to_one_band() {
        let mut previous = BusinessAction::OfferCoupon;
        for step in 0..=1000 {
            let n = f64::from(step) / 1000.0;
            let action = action_for(n);
            // Bands only move upward as the score rises
            let rank = |a: BusinessAction| match a {
                BusinessAction::OfferCoupon => 0,
                BusinessAction::RequestFeedback => 1,
                BusinessAction::AskReferral => 2,
            };
            assert!(rank(action) >= rank(previous), "band went backwards at {n}");
            assert_eq!(action_for(n), action);
            previous = action;
        }
    }

    #[test]
    fn normalized_score_is_monotonic() {
        let scores = [0.0, 0.1, 0.35, 0.5, 0.61, 0.8, 1.0];
        for pair in scores.windows(2) {
            assert!(
                normalized_score(&Label::Positive, pair[1])
                    > normalized_score(&Label::Positive, pair[0])
            );
            assert!(
                normalized_score(&Label::Negative, pair[1])
                    < normalized_score(&Label::Negative, pair[0])
            );
        }
    }

    #[test]
    fn low_confidence_negative_is_still_scored_by_label() {
        // Displayed as neutral, but the engine still folds it with 1 - score
        let d = decide(&Label::Negative, 0.45);
        assert!(approx(d.normalized_score, 0.55));
        assert_eq!(d.action, BusinessAction::RequestFeedback);

        let d = decide(&Label::Negative, 0.3);
        assert!(approx(d.normalized_score, 0.7));
        assert_eq!(d.action, BusinessAction::AskReferral);
    }

    #[test]
    fn decision_carries_presentation() {
        let d = decide_for(&RawPrediction::negative(0.99));
        assert_eq!(d.message, BusinessAction::OfferCoupon.message());
        assert_eq!(d.color, "#ef4444");
        assert_eq!(d.button_label, "Send 20% coupon");
    }

    #[test]
    fn action_serializes_as_code() {
        for action in [
            BusinessAction::OfferCoupon,
            BusinessAction::RequestFeedback,
            BusinessAction::AskReferral,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.code()));
        }
    }
}
