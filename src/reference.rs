use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::error::{ReshapeError, Result};
use crate::models::{CountryCodeTable, CountryReferenceRow};

pub(crate) const UNKNOWN: &str = "Unknown";

const REFERENCE_COLUMNS: [&str; 3] = ["Country Name", "Country Code", "Region"];

/// Lookups keyed by country name, built once from the reference files.
#[derive(Debug, Default)]
pub(crate) struct CountryMappings {
    continents: HashMap<String, String>,
    country_codes: HashMap<String, String>,
    image_urls: HashMap<String, String>,
}

impl CountryMappings {
    pub(crate) fn continent(&self, country: &str) -> &str {
        self.continents.get(country).map_or(UNKNOWN, String::as_str)
    }

    pub(crate) fn image_url(&self, country: &str) -> &str {
        self.image_urls.get(country).map_or(UNKNOWN, String::as_str)
    }

    // Blank rather than "Unknown" for countries without a reference row.
    pub(crate) fn country_code(&self, country: &str) -> &str {
        self.country_codes.get(country).map_or("", String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.continents.len()
    }

    fn insert(&mut self, row: CountryReferenceRow, alpha3: String, image_url: String) {
        self.continents.insert(row.country_name.clone(), row.region);
        self.country_codes.insert(row.country_name.clone(), alpha3);
        self.image_urls.insert(row.country_name, image_url);
    }
}

/// Read the alpha-3 to alpha-2 code table from a JSON object.
pub(crate) fn load_country_codes(json_path: &Path) -> Result<CountryCodeTable> {
    let file = File::open(json_path).map_err(|err| ReshapeError::from_io(json_path, err))?;
    let codes: CountryCodeTable =
        serde_json::from_reader(BufReader::new(file)).map_err(|err| ReshapeError::Parse {
            path: json_path.to_path_buf(),
            message: err.to_string(),
        })?;

    info!(path = %json_path.display(), codes = codes.len(), "loaded country code table");
    Ok(codes)
}

pub(crate) fn flag_image_url(base: &str, alpha2: &str) -> String {
    format!("{base}{alpha2}.png")
}

/// Build the continent, country code and flag URL lookups from the reference CSV.
///
/// Alpha-3 codes are uppercased before the table lookup. Codes missing from the
/// table fall back to their own lowercased form, which is only an approximation
/// of the real alpha-2 code.
pub(crate) fn create_mappings(
    codes: &CountryCodeTable,
    csv_path: &Path,
    flag_url_base: &str,
) -> Result<CountryMappings> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(csv_path)
        .map_err(|err| ReshapeError::from_csv(csv_path, err))?;

    let headers = rdr
        .headers()
        .map_err(|err| ReshapeError::from_csv(csv_path, err))?
        .clone();
    require_columns(&headers, &REFERENCE_COLUMNS, csv_path)?;

    let mut mappings = CountryMappings::default();
    let mut rows = 0usize;
    for result in rdr.deserialize() {
        let row: CountryReferenceRow =
            result.map_err(|err| ReshapeError::from_csv(csv_path, err))?;
        let alpha3 = row.country_code.to_uppercase();
        let alpha2 = match codes.get(&alpha3) {
            Some(alpha2) => alpha2.clone(),
            None => {
                debug!(country = %row.country_name, code = %alpha3, "no alpha-2 code, using alpha-3");
                alpha3.to_lowercase()
            }
        };
        let image_url = flag_image_url(flag_url_base, &alpha2);
        mappings.insert(row, alpha3, image_url);
        rows += 1;
    }

    info!(path = %csv_path.display(), rows, countries = mappings.len(), "built country mappings");
    Ok(mappings)
}

/// Fail with the first expected header that is absent.
pub(crate) fn require_columns(headers: &StringRecord, columns: &[&str], path: &Path) -> Result<()> {
    for column in columns {
        if !headers.iter().any(|header| header == *column) {
            return Err(ReshapeError::MissingColumn {
                column: (*column).to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}
