use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::path::Path;

use csv::ReaderBuilder;
use itertools::Itertools;
use ndarray::{Array2, ArrayView1};
use tracing::{debug, info};

use crate::error::{ReshapeError, Result};
use crate::models::PanelRow;
use crate::reference::{require_columns, CountryMappings};

const PANEL_COLUMNS: [&str; 3] = ["Country name", "year", "Life Ladder"];

pub(crate) const FIXED_COLUMNS: [&str; 4] = ["Country Name", "Continent", "Image URL", "Country Code"];

/// Reference fields attached to each output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CountryInfo {
    pub(crate) country_name: String,
    pub(crate) continent: String,
    pub(crate) image_url: String,
    pub(crate) country_code: String,
}

/// One row per country, one column per year.
#[derive(Debug)]
pub(crate) struct WideTable {
    countries: Vec<CountryInfo>,
    years: Vec<i32>,
    scores: Array2<Option<f64>>, // countries x years
}

impl WideTable {
    pub(crate) fn header(&self) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .chain(self.years.iter().map(|year| year.to_string()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.countries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = (&CountryInfo, ArrayView1<'_, Option<f64>>)> {
        self.countries.iter().zip(self.scores.rows())
    }
}

#[cfg(test)]
impl WideTable {
    pub(crate) fn years(&self) -> &[i32] {
        &self.years
    }

    pub(crate) fn country(&self, name: &str) -> Option<&CountryInfo> {
        self.countries.iter().find(|info| info.country_name == name)
    }

    /// Score for a country and year; `None` when either is absent or the cell is null.
    pub(crate) fn value(&self, country: &str, year: i32) -> Option<f64> {
        let row = self.countries.iter().position(|info| info.country_name == country)?;
        let col = self.years.iter().position(|&y| y == year)?;
        self.scores[[row, col]]
    }
}

/// Read the long-format panel, one row per country and year.
pub(crate) fn load_panel(file_path: &Path) -> Result<Vec<PanelRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(file_path)
        .map_err(|err| ReshapeError::from_csv(file_path, err))?;

    let headers = rdr
        .headers()
        .map_err(|err| ReshapeError::from_csv(file_path, err))?
        .clone();
    require_columns(&headers, &PANEL_COLUMNS, file_path)?;

    let mut records: Vec<PanelRow> = Vec::new();
    for result in rdr.deserialize() {
        let record: PanelRow = result.map_err(|err| ReshapeError::from_csv(file_path, err))?;
        records.push(record);
    }

    info!(path = %file_path.display(), rows = records.len(), "loaded panel");
    Ok(records)
}

/// Pivot the panel to wide format.
///
/// Countries keep their first-appearance order. For every (country, year)
/// pair the first row in file order wins, even when its score is blank;
/// duplicates are never averaged.
pub(crate) fn transform_data(
    records: &[PanelRow],
    mappings: &CountryMappings,
    years: RangeInclusive<i32>,
) -> WideTable {
    let years: Vec<i32> = years.collect();
    let year_index: HashMap<i32, usize> = years.iter().enumerate().map(|(i, &y)| (y, i)).collect();

    let names: Vec<&str> = records
        .iter()
        .map(|record| record.country_name.as_str())
        .unique()
        .collect();
    let country_index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let countries: Vec<CountryInfo> = names
        .iter()
        .map(|&name| {
            if mappings.country_code(name).is_empty() {
                debug!(country = name, "country missing from reference data");
            }
            CountryInfo {
                country_name: name.to_string(),
                continent: mappings.continent(name).to_string(),
                image_url: mappings.image_url(name).to_string(),
                country_code: mappings.country_code(name).to_string(),
            }
        })
        .collect();

    let mut scores = Array2::from_elem((countries.len(), years.len()), None);
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for record in records {
        let Some(&col) = year_index.get(&record.year) else {
            continue;
        };
        let row = country_index[record.country_name.as_str()];
        if seen.insert((row, col)) {
            scores[[row, col]] = record.life_ladder;
        }
    }

    info!(countries = countries.len(), years = years.len(), "reshaped panel");
    WideTable {
        countries,
        years,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FLAG_URL_BASE;
    use crate::models::CountryCodeTable;
    use crate::reference::create_mappings;
    use std::fs;
    use tempfile::TempDir;

    fn bhutan_mappings(dir: &TempDir) -> CountryMappings {
        let path = dir.path().join("ref.csv");
        fs::write(&path, "Country Name,Country Code,Region\nBhutan,BTN,South Asia\n").unwrap();
        create_mappings(&CountryCodeTable::new(), &path, FLAG_URL_BASE).unwrap()
    }

    #[test]
    fn bhutan_example_row() {
        let dir = TempDir::new().unwrap();
        let mappings = bhutan_mappings(&dir);
        let rows = vec![PanelRow::new("Bhutan", 2010, Some(5.0))];

        let table = transform_data(&rows, &mappings, 2005..=2023);

        assert_eq!(table.len(), 1);
        let info = table.country("Bhutan").unwrap();
        assert_eq!(info.continent, "South Asia");
        assert_eq!(info.image_url, "https://flagcdn.com/w80/btn.png");
        assert_eq!(info.country_code, "BTN");
        assert_eq!(table.value("Bhutan", 2010), Some(5.0));
        for year in (2005..=2023).filter(|&y| y != 2010) {
            assert_eq!(table.value("Bhutan", year), None);
        }
    }

    #[test]
    fn one_row_per_country_in_first_appearance_order() {
        let rows = vec![
            PanelRow::new("Zambia", 2010, Some(4.0)),
            PanelRow::new("Albania", 2010, Some(5.0)),
            PanelRow::new("Zambia", 2011, Some(4.1)),
            PanelRow::new("Mali", 2012, None),
        ];
        let table = transform_data(&rows, &CountryMappings::default(), 2005..=2023);
        let names: Vec<&str> = table
            .rows()
            .map(|(info, _)| info.country_name.as_str())
            .collect();
        assert_eq!(names, vec!["Zambia", "Albania", "Mali"]);
    }

    #[test]
    fn every_year_gets_a_column() {
        let rows = vec![PanelRow::new("Chad", 2015, Some(4.3))];
        let table = transform_data(&rows, &CountryMappings::default(), 2005..=2023);
        assert_eq!(table.years().len(), 19);
        assert_eq!(table.header().len(), 4 + 19);
        assert_eq!(table.header()[4], "2005");
        assert_eq!(table.header()[22], "2023");
        for (_, scores) in table.rows() {
            assert_eq!(scores.len(), 19);
        }
    }

    #[test]
    fn first_duplicate_wins() {
        let rows = vec![
            PanelRow::new("Peru", 2012, Some(5.8)),
            PanelRow::new("Peru", 2012, Some(6.1)),
        ];
        let table = transform_data(&rows, &CountryMappings::default(), 2005..=2023);
        assert_eq!(table.value("Peru", 2012), Some(5.8));
    }

    #[test]
    fn blank_first_duplicate_stays_null() {
        let rows = vec![
            PanelRow::new("Peru", 2012, None),
            PanelRow::new("Peru", 2012, Some(6.1)),
        ];
        let table = transform_data(&rows, &CountryMappings::default(), 2005..=2023);
        assert_eq!(table.value("Peru", 2012), None);
    }

    #[test]
    fn years_outside_window_are_ignored() {
        let rows = vec![
            PanelRow::new("Oman", 2004, Some(6.0)),
            PanelRow::new("Oman", 2024, Some(6.5)),
        ];
        let table = transform_data(&rows, &CountryMappings::default(), 2005..=2023);
        assert_eq!(table.len(), 1);
        assert!(table.rows().all(|(_, scores)| scores.iter().all(Option::is_none)));
    }

    #[test]
    fn unreferenced_country_gets_defaults() {
        let rows = vec![PanelRow::new("Somaliland region", 2019, Some(5.0))];
        let table = transform_data(&rows, &CountryMappings::default(), 2005..=2023);
        let info = table.country("Somaliland region").unwrap();
        assert_eq!(info.continent, "Unknown");
        assert_eq!(info.image_url, "Unknown");
        assert_eq!(info.country_code, "");
    }

    #[test]
    fn load_panel_reads_blank_scores_and_extra_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GNH.csv");
        fs::write(
            &path,
            "Country name,year,Life Ladder,Log GDP per capita\nAfghanistan,2008,3.724,7.35\nAfghanistan,2009,,7.51\n",
        )
        .unwrap();
        let rows = load_panel(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].life_ladder, Some(3.724));
        assert_eq!(rows[1].year, 2009);
        assert_eq!(rows[1].life_ladder, None);
    }

    #[test]
    fn load_panel_reads_missing_score_tokens_as_null() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GNH.csv");
        fs::write(
            &path,
            "Country name,year,Life Ladder\nChad,2006,NaN\nChad,2007,NA\nChad,2008,N/A\nChad,2009,null\nChad,2010,#N/A\nChad,2011,4.56\n",
        )
        .unwrap();
        let rows = load_panel(&path).unwrap();
        let scores: Vec<Option<f64>> = rows.iter().map(|row| row.life_ladder).collect();
        assert_eq!(scores, vec![None, None, None, None, None, Some(4.56)]);

        let table = transform_data(&rows, &CountryMappings::default(), 2005..=2023);
        assert_eq!(table.value("Chad", 2006), None);
        assert_eq!(table.value("Chad", 2011), Some(4.56));
    }

    #[test]
    fn load_panel_rejects_non_numeric_score() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GNH.csv");
        fs::write(&path, "Country name,year,Life Ladder\nChad,2006,high\n").unwrap();
        assert!(load_panel(&path).unwrap_err().is_parse());
    }

    #[test]
    fn load_panel_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_panel(&dir.path().join("absent.csv")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn load_panel_requires_year_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GNH.csv");
        fs::write(&path, "Country name,Life Ladder\nChad,4.0\n").unwrap();
        let err = load_panel(&path).unwrap_err();
        assert!(matches!(err, ReshapeError::MissingColumn { ref column, .. } if column == "year"));
    }

    #[test]
    fn load_panel_rejects_non_numeric_year() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("GNH.csv");
        fs::write(&path, "Country name,year,Life Ladder\nChad,twenty,4.0\n").unwrap();
        assert!(load_panel(&path).unwrap_err().is_parse());
    }
}
