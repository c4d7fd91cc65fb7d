use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::explorer::domain::{CompanyName, CompanyRecord, ScoreKind, SCORE_COUNT};

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<CompanyRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<CompanyRow>() {
        records.push(row?.into_record());
    }

    Ok(records)
}

/// Dataset columns. Unknown columns are ignored; absent or unparseable values
/// stay `None` and are defaulted by `CompanyRecord`.
#[derive(Debug, Deserialize)]
struct CompanyRow {
    #[serde(rename = "Company_Name")]
    company_name: String,
    #[serde(
        rename = "IVA_COMPANY_RATING",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    rating: Option<String>,
    #[serde(
        rename = "IVA_PREVIOUS_RATING",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    previous_rating: Option<String>,
    #[serde(
        rename = "IVA_INDUSTRY",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    industry: Option<String>,
    #[serde(
        rename = "GICS_SUB_IND",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    gics_sub_industry: Option<String>,
    #[serde(
        rename = "IVA_RATING_ANALYSIS",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    rating_analysis: Option<String>,
    #[serde(
        rename = "ENVIRONMENTAL_PILLAR_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    environmental: Option<f64>,
    #[serde(
        rename = "GOVERNANCE_PILLAR_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    governance: Option<f64>,
    #[serde(
        rename = "SOCIAL_PILLAR_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    social: Option<f64>,
    #[serde(
        rename = "CLIMATE_CHANGE_THEME_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    climate_change: Option<f64>,
    #[serde(
        rename = "BUSINESS_ETHICS_THEME_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    business_ethics: Option<f64>,
    #[serde(
        rename = "HUMAN_CAPITAL_THEME_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    human_capital: Option<f64>,
    #[serde(
        rename = "HUMAN_CAPITAL_DEV_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    human_capital_development: Option<f64>,
    #[serde(
        rename = "ACCOUNTING_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    accounting: Option<f64>,
    #[serde(
        rename = "BOARD_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    board: Option<f64>,
    #[serde(
        rename = "OWNERSHIP_AND_CONTROL_SCORE",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    ownership_and_control: Option<f64>,
    #[serde(rename = "PAY_SCORE", default, deserialize_with = "csv::invalid_option")]
    pay: Option<f64>,
}

impl CompanyRow {
    fn into_record(self) -> CompanyRecord {
        let mut scores = [None; SCORE_COUNT];
        let columns = [
            (ScoreKind::Environmental, self.environmental),
            (ScoreKind::Governance, self.governance),
            (ScoreKind::Social, self.social),
            (ScoreKind::ClimateChange, self.climate_change),
            (ScoreKind::BusinessEthics, self.business_ethics),
            (ScoreKind::HumanCapital, self.human_capital),
            (ScoreKind::HumanCapitalDevelopment, self.human_capital_development),
            (ScoreKind::Accounting, self.accounting),
            (ScoreKind::Board, self.board),
            (ScoreKind::OwnershipAndControl, self.ownership_and_control),
            (ScoreKind::Pay, self.pay),
        ];
        for (kind, value) in columns {
            scores[kind.model_index()] = value.filter(|score| score.is_finite());
        }

        CompanyRecord {
            name: CompanyName(self.company_name),
            rating: self.rating,
            previous_rating: self.previous_rating,
            industry: self.industry,
            gics_sub_industry: self.gics_sub_industry,
            rating_analysis: self.rating_analysis,
            scores,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
