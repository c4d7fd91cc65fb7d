use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PredictorError;
use crate::explorer::domain::SCORE_COUNT;

/// Number of output columns of the rating model.
pub const OUTPUT_COUNT: usize = 2;

/// Fitted standardization: `(x - mean) / scale`, per feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub(crate) fn validate(&self) -> Result<(), String> {
        expect_len("mean", self.mean.len(), SCORE_COUNT)?;
        expect_len("scale", self.scale.len(), SCORE_COUNT)
    }

    /// Zero scale factors divide by one, matching how the scaler was fitted.
    pub fn transform(&self, features: &[f64; SCORE_COUNT]) -> [f64; SCORE_COUNT] {
        let mut scaled = [0.0; SCORE_COUNT];
        for (index, value) in features.iter().enumerate() {
            let scale = match self.scale[index] {
                s if s == 0.0 => 1.0,
                s => s,
            };
            scaled[index] = (value - self.mean[index]) / scale;
        }
        scaled
    }
}

/// Two-output linear regressor over the scaled features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearModel {
    pub(crate) fn validate(&self) -> Result<(), String> {
        expect_len("coefficients", self.coefficients.len(), OUTPUT_COUNT)?;
        expect_len("intercepts", self.intercepts.len(), OUTPUT_COUNT)?;
        for row in &self.coefficients {
            expect_len("coefficients row", row.len(), SCORE_COUNT)?;
        }
        Ok(())
    }

    pub fn predict(&self, scaled: &[f64; SCORE_COUNT]) -> [f64; OUTPUT_COUNT] {
        let mut output = [0.0; OUTPUT_COUNT];
        for (column, (weights, intercept)) in
            self.coefficients.iter().zip(&self.intercepts).enumerate()
        {
            output[column] = intercept
                + weights
                    .iter()
                    .zip(scaled)
                    .map(|(weight, value)| weight * value)
                    .sum::<f64>();
        }
        output
    }
}

fn expect_len(field: &str, found: usize, expected: usize) -> Result<(), String> {
    if found == expected {
        Ok(())
    } else {
        Err(format!("{field} has {found} entries, expected {expected}"))
    }
}

pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, PredictorError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PredictorError::Missing {
            path: path.to_path_buf(),
        },
        _ => PredictorError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| PredictorError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}
