use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clarification::explorer::narrative::{ChatRequest, ChunkStream};
use clarification::explorer::rating::{display_value, DeltaColor, Trend};
use clarification::explorer::views::CompanyCardView;
use clarification::explorer::{
    ChatTransport, CompanyStore, LetterGrade, NarrativeGenerator, Predictor, RatingDelta,
    RatingPredictor, ScoreKind, ScoreVector, SessionController, SessionKey, SessionPhase,
    TransportError,
};

fn workspace_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

fn load_predictor() -> Predictor {
    Predictor::load(
        &workspace_file("ml-model/model.json"),
        &workspace_file("ml-model/scaler.json"),
    )
    .expect("bundled artifacts load")
}

/// Narrative endpoint that is never reachable.
struct OfflineTransport;

#[async_trait]
impl ChatTransport for OfflineTransport {
    async fn send(&self, _request: &ChatRequest) -> Result<ChunkStream, TransportError> {
        Err(TransportError::Unavailable("offline".to_string()))
    }
}

#[test]
fn bundled_dataset_loads_with_defaults() {
    let store = CompanyStore::from_path(workspace_file("data/df_demo.csv")).expect("dataset loads");
    assert!(store.len() >= 6);

    let solstice = store.require("Solstice Retail").expect("present");
    assert_eq!(solstice.previous_rating(), "B");
    assert_eq!(solstice.score(ScoreKind::Governance), 5.0);
    assert!(solstice.stored_analysis().is_none());
}

#[test]
fn upgrade_from_bb_to_bbb_reads_as_one_step_up() {
    let store = CompanyStore::from_path(workspace_file("data/df_demo.csv")).expect("dataset loads");
    let record = store.require("Harbor Freight Rail").expect("present");

    assert_eq!(display_value(record.rating()), 7);
    assert_eq!(display_value(record.previous_rating()), 6);
    let delta = RatingDelta::between(record.rating(), record.previous_rating());
    assert_eq!(delta.trend, Trend::Up);
    assert_eq!(delta.color(), Some(DeltaColor::Green));
    assert_eq!(delta.magnitude, 1);
    assert_eq!(delta.text(), "\u{25B2} 1");
}

#[test]
fn bundled_model_scores_neutral_vector_inside_scale() {
    let predictor = load_predictor();
    let neutral = ScoreVector::uniform(5.0);

    let classes = predictor.predict(&neutral);
    assert!((0..=6).contains(&classes.low));
    assert!((0..=6).contains(&classes.high));
    assert_eq!(predictor.predict(&neutral), classes);
}

#[tokio::test]
async fn edit_then_reset_restores_dataset_scores() {
    let store =
        Arc::new(CompanyStore::from_path(workspace_file("data/df_demo.csv")).expect("dataset"));
    let narrator = Arc::new(NarrativeGenerator::new(
        Arc::new(OfflineTransport),
        "qwen2.5:0.5b",
    ));
    let controller = SessionController::new(store.clone(), Arc::new(load_predictor()), narrator);

    let session = controller.open_session().expect("session opens");
    let key = SessionKey::new(session.0, "Cedar Ridge Foods");
    let record = store.require("Cedar Ridge Foods").expect("present");

    let edited = controller
        .edit(&key, ScoreKind::Environmental, 8.0)
        .expect("edit applies");
    assert_eq!(edited.phase(), SessionPhase::Edited);
    let card = CompanyCardView::build(record, &edited);
    assert!(card
        .prediction
        .as_ref()
        .map(|prediction| prediction.label.starts_with("Score Prediction: "))
        .unwrap_or(false));

    let analysis = controller.analyze(&key).await.expect("analysis");
    assert_eq!(analysis.text, "Analysis failed: transport unavailable: offline");
    assert_eq!(
        controller.snapshot(&key).expect("snapshot").phase(),
        SessionPhase::Edited
    );

    let reset = controller.reset(&key).expect("reset");
    assert_eq!(reset.scores(), &record.score_vector());
    assert!(reset.prediction().is_none());
    assert!(reset.narrative().is_none());
}

#[test]
fn clamped_prediction_never_leaves_the_scale() {
    let predictor = load_predictor();
    let best = predictor.predict(&ScoreVector::uniform(10.0));
    let worst = predictor.predict(&ScoreVector::uniform(0.0));

    let best = clarification::explorer::Prediction::from_classes(best);
    let worst = clarification::explorer::Prediction::from_classes(worst);
    assert_eq!(best.high, LetterGrade::Aaa);
    assert_eq!(worst.low, LetterGrade::Ccc);
}
