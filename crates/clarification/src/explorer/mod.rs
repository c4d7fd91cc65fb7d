//! ESG explorer: company dataset, rating codec, rating model, analyst
//! commentary and the per-session card workflow behind the dashboard API.

pub mod domain;
pub mod narrative;
pub mod predictor;
pub mod rating;
pub mod router;
pub mod session;
pub mod store;
pub mod views;

pub use domain::{CompanyName, CompanyRecord, ScoreKind, ScoreVector};
pub use narrative::{
    ChatTransport, HttpChatTransport, NarrativeGenerator, NarrativeOutcome, TransportError,
};
pub use predictor::{PredictedClasses, Prediction, Predictor, PredictorError, RatingPredictor};
pub use rating::{LetterGrade, RatingDelta, RatingError};
pub use router::explorer_router;
pub use session::{
    AnalysisResult, AnalysisSource, SessionController, SessionError, SessionId, SessionKey,
    SessionPhase,
};
pub use store::{CompanyStore, StoreError};
pub use views::{AnalysisDialogView, CompanyCardView, ComparatorView};

#[cfg(test)]
mod tests;
