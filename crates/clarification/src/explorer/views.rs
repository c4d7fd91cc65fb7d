//! Pure view builders. Everything here is a function of a record plus the
//! session state; nothing is cached.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{CompanyRecord, ScoreKind, SCORE_MAX, SCORE_MIN, SCORE_STEP};
use super::rating::{display_value, RatingDelta, Trend};
use super::session::{AnalysisResult, AnalysisSource, SessionEditState, SessionPhase};

pub const EMPTY_SELECTION_MESSAGE: &str =
    "Select at least one company to display the information.";
pub const ANALYSIS_DIALOG_TITLE: &str = "Analysis summary";

/// Upper bound of the rating meter.
pub const METER_MAX: u8 = 10;

const COMPARATOR_PALETTE: [&str; 10] = [
    "rgb(31,119,180)",
    "rgb(255,127,14)",
    "rgb(44,160,44)",
    "rgb(214,39,40)",
    "rgb(148,103,189)",
    "rgb(140,86,75)",
    "rgb(227,119,194)",
    "rgb(127,127,127)",
    "rgb(188,189,34)",
    "rgb(23,190,207)",
];

const fn pillar_color(kind: ScoreKind) -> &'static str {
    match kind {
        ScoreKind::Environmental => "#2ca02c",
        ScoreKind::Social => "#1f77b4",
        _ => "#ff7f0e",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingMeterView {
    pub letter: String,
    pub value: u8,
    pub reference: u8,
    pub max: u8,
    pub delta: DeltaView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaView {
    pub trend: Trend,
    pub glyph: char,
    pub magnitude: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    pub text: String,
}

impl From<RatingDelta> for DeltaView {
    fn from(delta: RatingDelta) -> Self {
        Self {
            trend: delta.trend,
            glyph: delta.glyph(),
            magnitude: delta.magnitude,
            color: delta.color().map(|color| color.as_str()),
            text: delta.text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarBarView {
    pub key: ScoreKind,
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderView {
    pub key: ScoreKind,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionView {
    pub low: String,
    pub high: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyCardView {
    pub name: String,
    pub rating: RatingMeterView,
    pub industry: String,
    pub gics_sub_industry: String,
    pub pillars: Vec<PillarBarView>,
    pub sliders: Vec<SliderView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionView>,
    pub phase: SessionPhase,
    pub has_analysis: bool,
}

impl CompanyCardView {
    /// Card for the record as edited in `state`. Pillar bars and sliders both
    /// show the session's current values.
    pub fn build(record: &CompanyRecord, state: &SessionEditState) -> Self {
        let scores = state.scores();
        let current = record.rating();
        let previous = record.previous_rating();

        let pillars = ScoreKind::PILLARS
            .into_iter()
            .map(|kind| PillarBarView {
                key: kind,
                label: kind.label(),
                value: scores.get(kind),
                color: pillar_color(kind),
            })
            .collect();

        let sliders = ScoreKind::MODEL_ORDER
            .into_iter()
            .map(|kind| SliderView {
                key: kind,
                label: kind.slider_label(),
                min: SCORE_MIN,
                max: SCORE_MAX,
                step: SCORE_STEP,
                value: scores.get(kind),
            })
            .collect();

        let prediction = state.prediction().map(|prediction| PredictionView {
            low: prediction.low.to_string(),
            high: prediction.high.to_string(),
            label: format!("Score Prediction: {}", prediction.label()),
        });

        Self {
            name: record.name.to_string(),
            rating: RatingMeterView {
                letter: current.to_string(),
                value: display_value(current),
                reference: display_value(previous),
                max: METER_MAX,
                delta: RatingDelta::between(current, previous).into(),
            },
            industry: record.industry().to_string(),
            gics_sub_industry: record.gics_sub_industry().to_string(),
            pillars,
            sliders,
            prediction,
            phase: state.phase(),
            has_analysis: state.narrative().is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparatorSeries {
    pub company: String,
    pub color: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparatorView {
    pub categories: Vec<&'static str>,
    pub series: Vec<ComparatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl ComparatorView {
    /// Grouped bars of the dataset scores, one series per selected company.
    pub fn build(records: &[&CompanyRecord]) -> Self {
        let categories = ScoreKind::DISPLAY_ORDER
            .into_iter()
            .map(ScoreKind::label)
            .collect();

        let series = records
            .iter()
            .enumerate()
            .map(|(index, record)| ComparatorSeries {
                company: record.name.to_string(),
                color: COMPARATOR_PALETTE[index % COMPARATOR_PALETTE.len()],
                values: ScoreKind::DISPLAY_ORDER
                    .into_iter()
                    .map(|kind| record.score(kind))
                    .collect(),
            })
            .collect::<Vec<_>>();

        let message = series.is_empty().then_some(EMPTY_SELECTION_MESSAGE);

        Self {
            categories,
            series,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisDialogView {
    pub title: &'static str,
    pub company: String,
    pub source: AnalysisSource,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl AnalysisDialogView {
    pub fn build(record: &CompanyRecord, result: AnalysisResult) -> Self {
        Self {
            title: ANALYSIS_DIALOG_TITLE,
            company: record.name.to_string(),
            source: result.source,
            body: result.text,
            generated_at: result.generated_at,
        }
    }
}

/// Read-only listing entry with the dataset attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyProfileView {
    pub name: String,
    pub rating: String,
    pub previous_rating: String,
    pub industry: String,
    pub gics_sub_industry: String,
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub key: ScoreKind,
    pub label: &'static str,
    pub value: f64,
}

impl CompanyProfileView {
    pub fn build(record: &CompanyRecord) -> Self {
        Self {
            name: record.name.to_string(),
            rating: record.rating().to_string(),
            previous_rating: record.previous_rating().to_string(),
            industry: record.industry().to_string(),
            gics_sub_industry: record.gics_sub_industry().to_string(),
            scores: ScoreKind::DISPLAY_ORDER
                .into_iter()
                .map(|kind| ScoreEntry {
                    key: kind,
                    label: kind.label(),
                    value: record.score(kind),
                })
                .collect(),
        }
    }
}
