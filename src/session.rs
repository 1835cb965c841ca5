//! Session orchestrator: the one state machine behind the page.
//!
//! ```text
//! Uninitialized → LoadingCorpus → LoadingModel → Ready ⇄ Analyzing
//!                      └──────────────┴──→ InitError (terminal)
//! ```
//!
//! `SessionOrchestrator` is shared behind an `Arc`. Its state sits in a
//! `std::sync::Mutex` that is only ever locked between suspension points,
//! never across an `.await`. The analyze trigger is a non-blocking
//! try-acquire of the busy flag: a second trigger while one analysis is in
//! flight is rejected, not queued. Once accepted, the run is detached from
//! its caller, so dropping the `analyze()` future cannot cancel it.
//! `AnalysisGuard` restores `Ready` and clears the flag on every exit path.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::analytics::AnalyticsEmitter;
use crate::dataset::{DatasetError, ReviewCorpus, ReviewSource};
use crate::pipeline::classifier::{ClassifierAdapter, ClassifierError, SentimentClassifier};
use crate::pipeline::decision::decide_for;
use crate::pipeline::sentiment::categorize;
use crate::presenter::{self, AnalysisView};

const STATUS_IDLE: &str = "Starting...";
const STATUS_LOADING_CORPUS: &str = "Loading reviews...";
const STATUS_LOADING_MODEL: &str = "Loading AI model...";
const STATUS_READY: &str = "Ready";
const STATUS_ANALYZING: &str = "Analyzing...";
const STATUS_INIT_FAILED: &str = "Initialization failed";

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    LoadingCorpus,
    LoadingModel,
    Ready,
    Analyzing,
    InitError,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "not started"),
            Self::LoadingCorpus => write!(f, "loading reviews"),
            Self::LoadingModel => write!(f, "loading model"),
            Self::Ready => write!(f, "ready"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::InitError => write!(f, "failed to initialize"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Initialization already started (session is {0})")]
    AlreadyStarted(Phase),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("An analysis is already running")]
    Busy,

    #[error("Session is not ready (currently {0})")]
    NotReady(Phase),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Analysis task did not complete: {0}")]
    Interrupted(String),
}

struct SessionState {
    phase: Phase,
    corpus: Option<Arc<ReviewCorpus>>,
    classifier_ready: bool,
    busy: bool,
    last_error: Option<String>,
    status: &'static str,
    current_review: Option<String>,
    last_analysis: Option<AnalysisView>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            corpus: None,
            classifier_ready: false,
            busy: false,
            last_error: None,
            status: STATUS_IDLE,
            current_review: None,
            last_analysis: None,
        }
    }
}

/// Everything the page needs to draw itself.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub status: &'static str,
    pub trigger_enabled: bool,
    pub busy: bool,
    pub classifier_ready: bool,
    pub model: String,
    pub corpus_size: usize,
    pub current_review: Option<String>,
    pub last_error: Option<String>,
    pub last_analysis: Option<AnalysisView>,
    pub analytics_enabled: bool,
}

// ═══════════════════════════════════════════════════════════
// SessionOrchestrator
// ═══════════════════════════════════════════════════════════

pub struct SessionOrchestrator {
    state: Mutex<SessionState>,
    source: Arc<dyn ReviewSource>,
    classifier: ClassifierAdapter,
    analytics: AnalyticsEmitter,
}

impl SessionOrchestrator {
    pub fn new(
        source: Arc<dyn ReviewSource>,
        classifier: Arc<dyn SentimentClassifier>,
        analytics: AnalyticsEmitter,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState::new()),
            source,
            classifier: ClassifierAdapter::new(classifier),
            analytics,
        }
    }

    pub fn analytics(&self) -> &AnalyticsEmitter {
        &self.analytics
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            phase: state.phase,
            status: state.status,
            trigger_enabled: state.phase == Phase::Ready && !state.busy,
            busy: state.busy,
            classifier_ready: state.classifier_ready,
            model: self.classifier.model_name().to_string(),
            corpus_size: state.corpus.as_ref().map_or(0, |c| c.len()),
            current_review: state.current_review.clone(),
            last_error: state.last_error.clone(),
            last_analysis: state.last_analysis.clone(),
            analytics_enabled: self.analytics.enabled(),
        }
    }

    // ── Initialization ──────────────────────────────────────

    /// Load the corpus, then the model. Runs once per session; any failure
    /// leaves the session in `InitError` for good.
    pub async fn initialize(&self) -> Result<(), InitError> {
        {
            let mut state = self.lock();
            if state.phase != Phase::Uninitialized {
                return Err(InitError::AlreadyStarted(state.phase));
            }
            state.phase = Phase::LoadingCorpus;
            state.status = STATUS_LOADING_CORPUS;
        }

        let corpus = match self.source.load().await {
            Ok(corpus) => corpus,
            Err(e) => return Err(self.fail_init(e.into())),
        };

        {
            let mut state = self.lock();
            state.corpus = Some(Arc::new(corpus));
            state.phase = Phase::LoadingModel;
            state.status = STATUS_LOADING_MODEL;
        }

        if let Err(e) = self.classifier.initialize().await {
            return Err(self.fail_init(e.into()));
        }

        let mut state = self.lock();
        state.classifier_ready = true;
        state.phase = Phase::Ready;
        state.status = STATUS_READY;
        tracing::info!(
            reviews = state.corpus.as_ref().map_or(0, |c| c.len()),
            model = self.classifier.model_name(),
            "Session ready"
        );
        Ok(())
    }

    fn fail_init(&self, err: InitError) -> InitError {
        tracing::error!(error = %err, "Session initialization failed");
        let mut state = self.lock();
        state.phase = Phase::InitError;
        state.status = STATUS_INIT_FAILED;
        state.last_error = Some(format!("{err}. Reload the page to try again."));
        err
    }

    // ── Analysis ────────────────────────────────────────────

    /// One full analysis: pick a review, classify, categorize, decide,
    /// render, then hand the outcome to analytics.
    ///
    /// Busy and not-ready triggers are rejected up front. An accepted run
    /// executes on its own task and always records its result or error,
    /// even if the caller stops waiting.
    pub async fn analyze(self: &Arc<Self>) -> Result<AnalysisView, AnalyzeError> {
        let (guard, corpus) = self.begin_analysis()?;

        let session = Arc::clone(self);
        let run = tokio::spawn(async move {
            let outcome = session.run_analysis(&corpus).await;
            drop(guard);
            outcome
        });

        run.await.map_err(|e| {
            tracing::error!(error = %e, "Analysis task failed");
            AnalyzeError::Interrupted(e.to_string())
        })?
    }

    async fn run_analysis(&self, corpus: &ReviewCorpus) -> Result<AnalysisView, AnalyzeError> {
        let review = {
            let mut rng = rand::thread_rng();
            corpus.pick(&mut rng).to_string()
        };
        self.lock().current_review = Some(review.clone());

        let prediction = match self.classifier.classify(&review).await {
            Ok(prediction) => prediction,
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed");
                self.lock().last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let sentiment = categorize(&prediction);
        let decision = decide_for(&prediction);
        let view = presenter::render(&review, sentiment, decision);
        self.lock().last_analysis = Some(view.clone());

        tracing::info!(
            analysis_id = %view.analysis_id,
            label = %prediction.label,
            score = prediction.score,
            category = view.sentiment.display_label,
            action = %view.decision.action,
            "Review analyzed"
        );

        // Detached; its outcome never reaches this workflow
        let _ = self.analytics.emit(
            &review,
            view.sentiment.display_label,
            view.sentiment.confidence_score,
            Some(view.decision.action),
        );

        Ok(view)
    }

    /// Take the trigger: `Ready` → `Analyzing`, or reject.
    fn begin_analysis(self: &Arc<Self>) -> Result<(AnalysisGuard, Arc<ReviewCorpus>), AnalyzeError> {
        let mut state = self.lock();
        if state.busy {
            tracing::debug!("Analyze trigger ignored, analysis in flight");
            return Err(AnalyzeError::Busy);
        }
        if state.phase != Phase::Ready {
            return Err(AnalyzeError::NotReady(state.phase));
        }
        let corpus = state
            .corpus
            .clone()
            .ok_or(AnalyzeError::NotReady(state.phase))?;

        state.busy = true;
        state.phase = Phase::Analyzing;
        state.status = STATUS_ANALYZING;
        state.last_error = None;
        state.last_analysis = None;

        let guard = AnalysisGuard {
            session: Arc::clone(self),
        };
        Ok((guard, corpus))
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Every mutation is a plain field write, so a poisoned lock still
        // holds a consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ═══════════════════════════════════════════════════════════
// AnalysisGuard: cleanup on every exit path
// ═══════════════════════════════════════════════════════════

/// Held for the duration of one analysis. Dropping it returns the session
/// to `Ready` and re-enables the trigger.
struct AnalysisGuard {
    session: Arc<SessionOrchestrator>,
}

impl Drop for AnalysisGuard {
    fn drop(&mut self) {
        let mut state = self.session.lock();
        state.phase = Phase::Ready;
        state.status = STATUS_READY;
        state.busy = false;
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
