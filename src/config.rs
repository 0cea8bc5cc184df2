use std::ops::RangeInclusive;
use std::path::PathBuf;

// Defaults for the ETL run
pub const CODES_PATH: &str = "public/data/iso3166-1.json";
pub const REFERENCE_PATH: &str = "public/data/gdpdata.csv";
pub const PANEL_PATH: &str = "public/data/GNH.csv";
pub const OUTPUT_PATH: &str = "transformed_data.csv";
pub const FIRST_YEAR: i32 = 2005;
pub const LAST_YEAR: i32 = 2023;
pub const PREVIEW_ROWS: usize = 5;
pub const FLAG_URL_BASE: &str = "https://flagcdn.com/w80/";

/// Inputs, output and year window of one reshaping run.
#[derive(Debug, Clone)]
pub struct Config {
    pub codes_path: PathBuf,
    pub reference_path: PathBuf,
    pub panel_path: PathBuf,
    pub output_path: PathBuf,
    pub first_year: i32,
    pub last_year: i32,
    pub preview_rows: usize,
    pub flag_url_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codes_path: PathBuf::from(CODES_PATH),
            reference_path: PathBuf::from(REFERENCE_PATH),
            panel_path: PathBuf::from(PANEL_PATH),
            output_path: PathBuf::from(OUTPUT_PATH),
            first_year: FIRST_YEAR,
            last_year: LAST_YEAR,
            preview_rows: PREVIEW_ROWS,
            flag_url_base: FLAG_URL_BASE.to_string(),
        }
    }
}

impl Config {
    /// Year columns of the wide table. Empty when `first_year > last_year`.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }
}
