use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// ISO 3166-1 alpha-3 code (uppercase) to alpha-2 code (lowercase).
pub(crate) type CountryCodeTable = HashMap<String, String>;

/// One row of the country reference CSV.
#[derive(Debug, Deserialize)]
pub(crate) struct CountryReferenceRow {
    #[serde(rename = "Country Name")]
    pub(crate) country_name: String,

    #[serde(rename = "Country Code")]
    pub(crate) country_code: String,

    #[serde(rename = "Region")]
    pub(crate) region: String,
}

/// One country-year observation of the happiness panel.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PanelRow {
    #[serde(rename = "Country name")]
    pub(crate) country_name: String,

    pub(crate) year: i32,

    #[serde(rename = "Life Ladder", deserialize_with = "deserialize_score")]
    pub(crate) life_ladder: Option<f64>,
}

/// Tokens read as a missing score, besides the empty field.
pub(crate) const MISSING_SCORE_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let token = raw.trim();
    if token.is_empty() || MISSING_SCORE_TOKENS.contains(&token) {
        return Ok(None);
    }
    match token.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(err) => Err(serde::de::Error::custom(format!(
            "invalid Life Ladder score '{token}': {err}"
        ))),
    }
}

impl PanelRow {
    #[cfg(test)]
    pub(crate) fn new(country_name: &str, year: i32, life_ladder: Option<f64>) -> Self {
        Self {
            country_name: country_name.to_string(),
            year,
            life_ladder,
        }
    }
}
