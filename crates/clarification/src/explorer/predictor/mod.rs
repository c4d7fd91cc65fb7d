//! Rating model wrapper: scaler transform, two-column regression, integer classes.

mod artifacts;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

pub use artifacts::{LinearModel, StandardScaler, OUTPUT_COUNT};

use super::domain::ScoreVector;
use super::rating::{prediction_grade_clamped, LetterGrade};

#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("model artifact not found: {path}")]
    Missing { path: PathBuf },
    #[error("failed to read model artifact {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model artifact {path} has the wrong shape: {detail}")]
    Shape { path: PathBuf, detail: String },
}

/// Raw class indices, truncated toward zero and not yet bounds-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictedClasses {
    pub low: i64,
    pub high: i64,
}

/// Predicted rating pair as letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub low: LetterGrade,
    pub high: LetterGrade,
}

impl Prediction {
    /// Indices outside the prediction scale are clamped to CCC or AAA.
    pub fn from_classes(classes: PredictedClasses) -> Self {
        Self {
            low: prediction_grade_clamped(classes.low),
            high: prediction_grade_clamped(classes.high),
        }
    }

    /// "BB/BBB"
    pub fn label(&self) -> String {
        format!("{}/{}", self.low, self.high)
    }
}

/// Seam between the session workflow and the persisted model.
pub trait RatingPredictor: Send + Sync {
    fn predict(&self, scores: &ScoreVector) -> PredictedClasses;
}

pub struct Predictor {
    scaler: StandardScaler,
    model: LinearModel,
}

impl Predictor {
    /// Loads both artifacts. Either one missing or malformed is fatal for the caller.
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self, PredictorError> {
        let model: LinearModel = artifacts::read_artifact(model_path)?;
        model.validate().map_err(|detail| PredictorError::Shape {
            path: model_path.to_path_buf(),
            detail,
        })?;
        info!(path = %model_path.display(), "rating model loaded");

        let scaler: StandardScaler = artifacts::read_artifact(scaler_path)?;
        scaler.validate().map_err(|detail| PredictorError::Shape {
            path: scaler_path.to_path_buf(),
            detail,
        })?;
        info!(path = %scaler_path.display(), "feature scaler loaded");

        Ok(Self { scaler, model })
    }

    /// Builds a predictor from in-memory artifacts, checking their shapes.
    pub fn new(model: LinearModel, scaler: StandardScaler) -> Result<Self, PredictorError> {
        let in_memory = PathBuf::from("<memory>");
        model.validate().map_err(|detail| PredictorError::Shape {
            path: in_memory.clone(),
            detail,
        })?;
        scaler.validate().map_err(|detail| PredictorError::Shape {
            path: in_memory,
            detail,
        })?;
        Ok(Self { scaler, model })
    }
}

impl RatingPredictor for Predictor {
    fn predict(&self, scores: &ScoreVector) -> PredictedClasses {
        let scaled = self.scaler.transform(scores.as_model_input());
        let [low, high] = self.model.predict(&scaled);
        debug!(low, high, "rating model output");
        PredictedClasses {
            low: low.trunc() as i64,
            high: high.trunc() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::domain::{ScoreKind, SCORE_COUNT};
    use std::io::Write;

    fn scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![5.0; SCORE_COUNT],
            scale: vec![2.0; SCORE_COUNT],
        }
    }

    fn model() -> LinearModel {
        let mut low = vec![0.0; SCORE_COUNT];
        low[ScoreKind::Environmental.model_index()] = 1.0;
        LinearModel {
            coefficients: vec![low, vec![0.1; SCORE_COUNT]],
            intercepts: vec![3.0, 3.9],
        }
    }

    fn write_json(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create artifact");
        file.write_all(body.as_bytes()).expect("write artifact");
        path
    }

    #[test]
    fn scaler_centers_and_scales_features() {
        let mut scaler = scaler();
        scaler.scale[1] = 0.0;
        let mut features = [5.0; SCORE_COUNT];
        features[0] = 9.0;
        features[1] = 7.0;

        let scaled = scaler.transform(&features);
        assert_eq!(scaled[0], 2.0);
        assert_eq!(scaled[1], 2.0);
        assert_eq!(scaled[2], 0.0);
    }

    #[test]
    fn predict_truncates_outputs_toward_zero() {
        let predictor = Predictor::new(model(), scaler()).expect("valid artifacts");

        let baseline = predictor.predict(&ScoreVector::uniform(5.0));
        assert_eq!(baseline, PredictedClasses { low: 3, high: 3 });

        let mut improved = ScoreVector::uniform(5.0);
        improved.set(ScoreKind::Environmental, 8.0);
        let classes = predictor.predict(&improved);
        assert_eq!(classes.low, 4);

        let mut degraded = ScoreVector::uniform(5.0);
        degraded.set(ScoreKind::Environmental, 0.0);
        assert_eq!(predictor.predict(&degraded).low, 0);
    }

    #[test]
    fn predict_is_deterministic() {
        let predictor = Predictor::new(model(), scaler()).expect("valid artifacts");
        let scores = ScoreVector::uniform(6.3);
        assert_eq!(predictor.predict(&scores), predictor.predict(&scores));
    }

    #[test]
    fn prediction_letters_clamp_out_of_range_classes() {
        let prediction = Prediction::from_classes(PredictedClasses { low: -2, high: 11 });
        assert_eq!(prediction.low, LetterGrade::Ccc);
        assert_eq!(prediction.high, LetterGrade::Aaa);
        assert_eq!(prediction.label(), "CCC/AAA");
    }

    #[test]
    fn load_reads_json_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model_path = write_json(
            &dir,
            "model.json",
            &serde_json::to_string(&model()).expect("serialize model"),
        );
        let scaler_path = write_json(
            &dir,
            "scaler.json",
            &serde_json::to_string(&scaler()).expect("serialize scaler"),
        );

        let predictor = Predictor::load(&model_path, &scaler_path).expect("artifacts load");
        assert_eq!(
            predictor.predict(&ScoreVector::uniform(5.0)),
            PredictedClasses { low: 3, high: 3 }
        );
    }

    #[test]
    fn load_names_missing_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model_path = write_json(
            &dir,
            "model.json",
            &serde_json::to_string(&model()).expect("serialize model"),
        );
        let scaler_path = dir.path().join("scaler.json");

        let error = Predictor::load(&model_path, &scaler_path)
            .err()
            .expect("missing scaler is fatal");
        match &error {
            PredictorError::Missing { path } => assert_eq!(path, &scaler_path),
            other => panic!("expected missing artifact, got {other:?}"),
        }
        assert!(error.to_string().contains("scaler.json"));
    }

    #[test]
    fn load_rejects_corrupt_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model_path = write_json(&dir, "model.json", "\u{80}not json");
        let scaler_path = write_json(
            &dir,
            "scaler.json",
            &serde_json::to_string(&scaler()).expect("serialize scaler"),
        );

        match Predictor::load(&model_path, &scaler_path) {
            Err(PredictorError::Corrupt { path, .. }) => assert_eq!(path, model_path),
            Err(other) => panic!("expected corrupt artifact, got {other:?}"),
            Ok(_) => panic!("corrupt model must not load"),
        }
    }

    #[test]
    fn load_rejects_wrong_feature_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let model_path = write_json(
            &dir,
            "model.json",
            &serde_json::to_string(&model()).expect("serialize model"),
        );
        let scaler_path = write_json(
            &dir,
            "scaler.json",
            r#"{"mean": [5.0, 5.0], "scale": [2.0, 2.0]}"#,
        );

        match Predictor::load(&model_path, &scaler_path) {
            Err(PredictorError::Shape { detail, .. }) => assert!(detail.contains("mean")),
            Err(other) => panic!("expected shape error, got {other:?}"),
            Ok(_) => panic!("short scaler must not load"),
        }
    }
}
