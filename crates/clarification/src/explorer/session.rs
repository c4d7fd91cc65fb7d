//! Per-session interaction workflow for company cards.
//!
//! Phases: Baseline → Edited (slider change, prediction recomputed) →
//! Analyzed (commentary cached) → back to Edited on the next change.
//! A reset marks the state ResetPending; the next access restores the
//! dataset scores and drops both caches.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{
    CompanyName, CompanyRecord, ScoreKind, ScoreVector, SCORE_MAX, SCORE_MIN, SCORE_STEP,
};
use super::narrative::{ChatTransport, NarrativeGenerator, NarrativeOutcome, NarrativeSubject};
use super::predictor::{Prediction, RatingPredictor};
use super::store::CompanyStore;

/// Shown when an unedited company has no stored commentary.
pub const NO_STORED_ANALYSIS: &str = "No analysis available.";

/// Identifier of one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Composite key of the session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub session: SessionId,
    pub company: CompanyName,
}

impl SessionKey {
    pub fn new(session: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            session: SessionId(session.into()),
            company: CompanyName(company.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Baseline,
    Edited,
    Analyzed,
    ResetPending,
}

/// Generated commentary kept until the next edit or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// Caches carried by each phase; a prediction without an edit or a narrative
/// without a prediction cannot be represented.
#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Baseline,
    Edited {
        prediction: Prediction,
    },
    Analyzed {
        prediction: Prediction,
        narrative: Narrative,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEditState {
    scores: ScoreVector,
    stage: Stage,
    reset_pending: bool,
    revision: u64,
}

impl SessionEditState {
    pub fn new(record: &CompanyRecord) -> Self {
        Self {
            scores: record.score_vector(),
            stage: Stage::Baseline,
            reset_pending: false,
            revision: 0,
        }
    }

    pub fn scores(&self) -> &ScoreVector {
        &self.scores
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.stage {
            Stage::Baseline => None,
            Stage::Edited { prediction } | Stage::Analyzed { prediction, .. } => Some(prediction),
        }
    }

    pub fn narrative(&self) -> Option<&Narrative> {
        match &self.stage {
            Stage::Analyzed { narrative, .. } => Some(narrative),
            _ => None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.reset_pending {
            return SessionPhase::ResetPending;
        }
        match self.stage {
            Stage::Baseline => SessionPhase::Baseline,
            Stage::Edited { .. } => SessionPhase::Edited,
            Stage::Analyzed { .. } => SessionPhase::Analyzed,
        }
    }

    /// Increments on every edit and reset.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn apply_edit(&mut self, kind: ScoreKind, value: f64, prediction: Prediction) {
        self.scores.set(kind, value);
        self.stage = Stage::Edited { prediction };
        self.revision += 1;
    }

    fn store_narrative(&mut self, narrative: Narrative) {
        if let Some(prediction) = self.prediction().copied() {
            self.stage = Stage::Analyzed {
                prediction,
                narrative,
            };
        }
    }

    fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    /// Collapses a pending reset. Returns whether one was applied.
    fn settle(&mut self, record: &CompanyRecord) -> bool {
        if !self.reset_pending {
            return false;
        }
        self.scores = record.score_vector();
        self.stage = Stage::Baseline;
        self.reset_pending = false;
        self.revision += 1;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Commentary shipped with the dataset; no edits yet.
    Stored,
    Generated,
    Cached,
    /// The endpoint answered but produced no text.
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub source: AnalysisSource,
    pub text: String,
    /// Set for generated and cached commentary.
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown company '{0}'")]
    UnknownCompany(String),
    #[error("unknown session '{0}'")]
    UnknownSession(String),
    #[error("{kind} must be a number between 0 and 10 (got {value})")]
    ScoreOutOfRange { kind: ScoreKind, value: f64 },
    #[error("session state unavailable")]
    Poisoned,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Issued session ids and the card states opened under them.
#[derive(Debug, Default)]
struct SessionTable {
    issued: HashSet<SessionId>,
    cards: HashMap<SessionKey, SessionEditState>,
}

impl SessionTable {
    fn card(
        &mut self,
        key: &SessionKey,
        record: &CompanyRecord,
    ) -> Result<&mut SessionEditState, SessionError> {
        if !self.issued.contains(&key.session) {
            return Err(SessionError::UnknownSession(key.session.0.clone()));
        }
        Ok(self
            .cards
            .entry(key.clone())
            .or_insert_with(|| SessionEditState::new(record)))
    }

    fn settled_card(
        &mut self,
        key: &SessionKey,
        record: &CompanyRecord,
    ) -> Result<&mut SessionEditState, SessionError> {
        let state = self.card(key, record)?;
        state.settle(record);
        Ok(state)
    }
}

/// Owns every session's edit state and drives the predictor and narrative
/// generator in response to edit, analyze and reset commands.
pub struct SessionController<P, T> {
    store: Arc<CompanyStore>,
    predictor: Arc<P>,
    narrator: Arc<NarrativeGenerator<T>>,
    sessions: Mutex<SessionTable>,
}

impl<P, T> SessionController<P, T>
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    pub fn new(
        store: Arc<CompanyStore>,
        predictor: Arc<P>,
        narrator: Arc<NarrativeGenerator<T>>,
    ) -> Self {
        Self {
            store,
            predictor,
            narrator,
            sessions: Mutex::new(SessionTable::default()),
        }
    }

    pub fn store(&self) -> &CompanyStore {
        &self.store
    }

    /// Issues a fresh session id. Card routes only accept issued ids.
    pub fn open_session(&self) -> Result<SessionId, SessionError> {
        let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let session = SessionId(format!("sess-{id:06}"));
        self.lock()?.issued.insert(session.clone());
        debug!(session = %session.0, "session opened");
        Ok(session)
    }

    /// Current state for rendering; created on first access.
    pub fn snapshot(&self, key: &SessionKey) -> Result<SessionEditState, SessionError> {
        let record = self.record(key)?;
        let mut sessions = self.lock()?;
        let state = sessions.settled_card(key, record)?;
        Ok(state.clone())
    }

    /// Sets one sub-score and re-scores the whole vector.
    pub fn edit(
        &self,
        key: &SessionKey,
        kind: ScoreKind,
        value: f64,
    ) -> Result<SessionEditState, SessionError> {
        let value = slider_value(kind, value)?;
        let record = self.record(key)?;
        let mut sessions = self.lock()?;
        let state = sessions.settled_card(key, record)?;

        let mut scores = *state.scores();
        scores.set(kind, value);
        let classes = self.predictor.predict(&scores);
        let prediction = Prediction::from_classes(classes);
        debug!(
            company = %key.company,
            score = %kind,
            value,
            prediction = %prediction.label(),
            "score edited"
        );

        state.apply_edit(kind, value, prediction);
        Ok(state.clone())
    }

    /// Commentary for the card dialog.
    ///
    /// Unedited cards show the dataset commentary and Analyzed cards reuse the
    /// cached text; only an Edited card calls the generator. Just a generated,
    /// non-empty narrative is cached, and only if no edit or reset landed while
    /// the request was in flight.
    pub async fn analyze(&self, key: &SessionKey) -> Result<AnalysisResult, SessionError> {
        let record = self.record(key)?;
        let (scores, revision) = {
            let mut sessions = self.lock()?;
            let state = sessions.settled_card(key, record)?;
            match &state.stage {
                Stage::Baseline => {
                    return Ok(AnalysisResult {
                        source: AnalysisSource::Stored,
                        text: record
                            .stored_analysis()
                            .unwrap_or(NO_STORED_ANALYSIS)
                            .to_string(),
                        generated_at: None,
                    });
                }
                Stage::Analyzed { narrative, .. } => {
                    return Ok(AnalysisResult {
                        source: AnalysisSource::Cached,
                        text: narrative.text.clone(),
                        generated_at: Some(narrative.generated_at),
                    });
                }
                Stage::Edited { .. } => (*state.scores(), state.revision()),
            }
        };

        let subject = NarrativeSubject {
            company: record.name.as_str(),
            rating: record.rating(),
            scores: &scores,
        };
        let outcome = self.narrator.analyze(&subject).await;

        let source = match &outcome {
            NarrativeOutcome::Generated(_) => AnalysisSource::Generated,
            NarrativeOutcome::Empty => AnalysisSource::Empty,
            NarrativeOutcome::Failed(_) => AnalysisSource::Failed,
        };
        let text = outcome.into_text();
        if source != AnalysisSource::Generated {
            return Ok(AnalysisResult {
                source,
                text,
                generated_at: None,
            });
        }

        let generated_at = Utc::now();
        let mut sessions = self.lock()?;
        match sessions.cards.get_mut(key) {
            Some(state) if state.revision() == revision && !state.reset_pending => {
                state.store_narrative(Narrative {
                    text: text.clone(),
                    generated_at,
                });
                info!(company = %key.company, "analysis cached");
            }
            _ => debug!(company = %key.company, "discarding analysis for superseded edit"),
        }

        Ok(AnalysisResult {
            source,
            text,
            generated_at: Some(generated_at),
        })
    }

    /// Marks the card for reset; applied on the next access.
    pub fn request_reset(&self, key: &SessionKey) -> Result<SessionPhase, SessionError> {
        let record = self.record(key)?;
        let mut sessions = self.lock()?;
        let state = sessions.card(key, record)?;
        state.request_reset();
        Ok(state.phase())
    }

    /// Restores the dataset scores and clears prediction and narrative.
    pub fn reset(&self, key: &SessionKey) -> Result<SessionEditState, SessionError> {
        self.request_reset(key)?;
        let state = self.snapshot(key)?;
        info!(company = %key.company, session = %key.session.0, "card reset");
        Ok(state)
    }

    #[cfg(test)]
    pub(crate) fn card_count(&self) -> Result<usize, SessionError> {
        Ok(self.lock()?.cards.len())
    }

    fn record(&self, key: &SessionKey) -> Result<&CompanyRecord, SessionError> {
        self.store
            .get(key.company.as_str())
            .ok_or_else(|| SessionError::UnknownCompany(key.company.0.clone()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionTable>, SessionError> {
        self.sessions.lock().map_err(|_| SessionError::Poisoned)
    }
}

/// Validates a slider value and snaps it to the 0.1 step.
pub fn slider_value(kind: ScoreKind, value: f64) -> Result<f64, SessionError> {
    if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
        return Err(SessionError::ScoreOutOfRange { kind, value });
    }
    let steps = (value / SCORE_STEP).round();
    Ok((steps * SCORE_STEP * 10.0).round() / 10.0)
}
