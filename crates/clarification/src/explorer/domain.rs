use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of ESG sub-scores carried by every company.
pub const SCORE_COUNT: usize = 11;
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;
pub const SCORE_STEP: f64 = 0.1;

/// Value used for a sub-score the dataset does not provide.
pub const DEFAULT_SCORE: f64 = 5.0;
/// Letter used for a rating the dataset does not provide.
pub const DEFAULT_RATING: &str = "B";
/// Placeholder for missing free-text classifiers.
pub const MISSING_TEXT: &str = "N/A";

/// Identifier wrapper for dataset companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyName(pub String);

impl CompanyName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CompanyName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The eleven ESG sub-scores, declared in the order the rating model expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreKind {
    #[serde(rename = "ENVIRONMENTAL_PILLAR_SCORE")]
    Environmental,
    #[serde(rename = "GOVERNANCE_PILLAR_SCORE")]
    Governance,
    #[serde(rename = "SOCIAL_PILLAR_SCORE")]
    Social,
    #[serde(rename = "CLIMATE_CHANGE_THEME_SCORE")]
    ClimateChange,
    #[serde(rename = "BUSINESS_ETHICS_THEME_SCORE")]
    BusinessEthics,
    #[serde(rename = "HUMAN_CAPITAL_THEME_SCORE")]
    HumanCapital,
    #[serde(rename = "HUMAN_CAPITAL_DEV_SCORE")]
    HumanCapitalDevelopment,
    #[serde(rename = "ACCOUNTING_SCORE")]
    Accounting,
    #[serde(rename = "BOARD_SCORE")]
    Board,
    #[serde(rename = "OWNERSHIP_AND_CONTROL_SCORE")]
    OwnershipAndControl,
    #[serde(rename = "PAY_SCORE")]
    Pay,
}

impl ScoreKind {
    /// Feature order of the rating model and of the card sliders.
    pub const MODEL_ORDER: [ScoreKind; SCORE_COUNT] = [
        ScoreKind::Environmental,
        ScoreKind::Governance,
        ScoreKind::Social,
        ScoreKind::ClimateChange,
        ScoreKind::BusinessEthics,
        ScoreKind::HumanCapital,
        ScoreKind::HumanCapitalDevelopment,
        ScoreKind::Accounting,
        ScoreKind::Board,
        ScoreKind::OwnershipAndControl,
        ScoreKind::Pay,
    ];

    /// Category order of the comparison chart.
    pub const DISPLAY_ORDER: [ScoreKind; SCORE_COUNT] = [
        ScoreKind::Environmental,
        ScoreKind::Social,
        ScoreKind::Governance,
        ScoreKind::ClimateChange,
        ScoreKind::BusinessEthics,
        ScoreKind::HumanCapital,
        ScoreKind::HumanCapitalDevelopment,
        ScoreKind::Accounting,
        ScoreKind::Board,
        ScoreKind::OwnershipAndControl,
        ScoreKind::Pay,
    ];

    pub const PILLARS: [ScoreKind; 3] = [
        ScoreKind::Environmental,
        ScoreKind::Social,
        ScoreKind::Governance,
    ];

    pub const fn model_index(self) -> usize {
        self as usize
    }

    /// Dataset column holding this score.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Environmental => "ENVIRONMENTAL_PILLAR_SCORE",
            Self::Governance => "GOVERNANCE_PILLAR_SCORE",
            Self::Social => "SOCIAL_PILLAR_SCORE",
            Self::ClimateChange => "CLIMATE_CHANGE_THEME_SCORE",
            Self::BusinessEthics => "BUSINESS_ETHICS_THEME_SCORE",
            Self::HumanCapital => "HUMAN_CAPITAL_THEME_SCORE",
            Self::HumanCapitalDevelopment => "HUMAN_CAPITAL_DEV_SCORE",
            Self::Accounting => "ACCOUNTING_SCORE",
            Self::Board => "BOARD_SCORE",
            Self::OwnershipAndControl => "OWNERSHIP_AND_CONTROL_SCORE",
            Self::Pay => "PAY_SCORE",
        }
    }

    /// Short chart category label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Environmental => "Environmental",
            Self::Governance => "Governance",
            Self::Social => "Social",
            Self::ClimateChange => "Climate Change",
            Self::BusinessEthics => "Business Ethics",
            Self::HumanCapital => "Human Capital",
            Self::HumanCapitalDevelopment => "Human Capital Dev",
            Self::Accounting => "Accounting",
            Self::Board => "Board",
            Self::OwnershipAndControl => "Ownership & Control",
            Self::Pay => "Pay",
        }
    }

    pub const fn slider_label(self) -> &'static str {
        match self {
            Self::Environmental => "Environmental Pillar Score",
            Self::Governance => "Governance Pillar Score",
            Self::Social => "Social Pillar Score",
            Self::ClimateChange => "Climate Change Theme Score",
            Self::BusinessEthics => "Business Ethics Theme Score",
            Self::HumanCapital => "Human Capital Theme Score",
            Self::HumanCapitalDevelopment => "Human Capital Dev Score",
            Self::Accounting => "Accounting Score",
            Self::Board => "Board Score",
            Self::OwnershipAndControl => "Ownership and Control Score",
            Self::Pay => "Pay Score",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown score column '{0}'")]
pub struct UnknownScoreColumn(pub String);

impl FromStr for ScoreKind {
    type Err = UnknownScoreColumn;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::MODEL_ORDER
            .into_iter()
            .find(|kind| kind.column().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownScoreColumn(trimmed.to_string()))
    }
}

/// Eleven sub-score values stored in model feature order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreVector([f64; SCORE_COUNT]);

impl ScoreVector {
    pub const fn from_model_order(values: [f64; SCORE_COUNT]) -> Self {
        Self(values)
    }

    pub const fn uniform(value: f64) -> Self {
        Self([value; SCORE_COUNT])
    }

    pub fn get(&self, kind: ScoreKind) -> f64 {
        self.0[kind.model_index()]
    }

    pub fn set(&mut self, kind: ScoreKind, value: f64) {
        self.0[kind.model_index()] = value;
    }

    /// Feature row handed to the rating model.
    pub fn as_model_input(&self) -> &[f64; SCORE_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreKind, f64)> + '_ {
        ScoreKind::MODEL_ORDER
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }
}

/// One dataset row. Optional fields stay optional here; the accessors apply the
/// single default policy so every consumer sees the same fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub name: CompanyName,
    pub rating: Option<String>,
    pub previous_rating: Option<String>,
    pub industry: Option<String>,
    pub gics_sub_industry: Option<String>,
    pub rating_analysis: Option<String>,
    pub scores: [Option<f64>; SCORE_COUNT],
}

impl CompanyRecord {
    /// Record with every optional attribute missing.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: CompanyName(name.into()),
            rating: None,
            previous_rating: None,
            industry: None,
            gics_sub_industry: None,
            rating_analysis: None,
            scores: [None; SCORE_COUNT],
        }
    }

    pub fn score(&self, kind: ScoreKind) -> f64 {
        self.scores[kind.model_index()].unwrap_or(DEFAULT_SCORE)
    }

    pub fn score_vector(&self) -> ScoreVector {
        let mut vector = ScoreVector::uniform(DEFAULT_SCORE);
        for kind in ScoreKind::MODEL_ORDER {
            vector.set(kind, self.score(kind));
        }
        vector
    }

    pub fn rating(&self) -> &str {
        self.rating.as_deref().unwrap_or(DEFAULT_RATING)
    }

    pub fn previous_rating(&self) -> &str {
        self.previous_rating.as_deref().unwrap_or(DEFAULT_RATING)
    }

    pub fn industry(&self) -> &str {
        self.industry.as_deref().unwrap_or(MISSING_TEXT)
    }

    pub fn gics_sub_industry(&self) -> &str {
        self.gics_sub_industry.as_deref().unwrap_or(MISSING_TEXT)
    }

    pub fn stored_analysis(&self) -> Option<&str> {
        self.rating_analysis.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_order_matches_declaration_indices() {
        for (index, kind) in ScoreKind::MODEL_ORDER.into_iter().enumerate() {
            assert_eq!(kind.model_index(), index);
        }
    }

    #[test]
    fn display_order_swaps_social_and_governance() {
        assert_eq!(ScoreKind::DISPLAY_ORDER[1], ScoreKind::Social);
        assert_eq!(ScoreKind::DISPLAY_ORDER[2], ScoreKind::Governance);
        assert_eq!(ScoreKind::MODEL_ORDER[1], ScoreKind::Governance);
    }

    #[test]
    fn score_kind_parses_dataset_columns() {
        assert_eq!("board_score".parse::<ScoreKind>(), Ok(ScoreKind::Board));
        assert_eq!(
            " HUMAN_CAPITAL_DEV_SCORE ".parse::<ScoreKind>(),
            Ok(ScoreKind::HumanCapitalDevelopment)
        );
        assert_eq!(
            "ESG_SCORE".parse::<ScoreKind>(),
            Err(UnknownScoreColumn("ESG_SCORE".to_string()))
        );
    }

    #[test]
    fn score_kind_serializes_as_column_name() {
        let json = serde_json::to_string(&ScoreKind::OwnershipAndControl).expect("serialize");
        assert_eq!(json, "\"OWNERSHIP_AND_CONTROL_SCORE\"");
    }

    #[test]
    fn missing_attributes_fall_back_to_defaults() {
        let mut record = CompanyRecord::bare("Northwind Utilities");
        record.scores[ScoreKind::Pay.model_index()] = Some(7.5);

        assert_eq!(record.score(ScoreKind::Pay), 7.5);
        assert_eq!(record.score(ScoreKind::Board), DEFAULT_SCORE);
        assert_eq!(record.rating(), "B");
        assert_eq!(record.previous_rating(), "B");
        assert_eq!(record.industry(), "N/A");
        assert!(record.stored_analysis().is_none());

        let vector = record.score_vector();
        assert_eq!(vector.get(ScoreKind::Pay), 7.5);
        assert_eq!(vector.get(ScoreKind::Environmental), DEFAULT_SCORE);
    }
}
