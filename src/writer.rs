use std::path::Path;

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Table};
use csv::WriterBuilder;
use tracing::info;

use crate::error::{ReshapeError, Result};
use crate::reshape::{WideTable, FIXED_COLUMNS};

/// Text of one score cell; null scores become empty fields.
pub(crate) fn format_score(score: Option<f64>) -> String {
    match score {
        Some(value) if value.is_nan() => String::new(),
        // Debug keeps the trailing ".0" on integral values
        Some(value) => format!("{value:?}"),
        None => String::new(),
    }
}

fn row_fields(table: &WideTable) -> impl Iterator<Item = Vec<String>> + '_ {
    table.rows().map(|(info, scores)| {
        [
            info.country_name.clone(),
            info.continent.clone(),
            info.image_url.clone(),
            info.country_code.clone(),
        ]
        .into_iter()
        .chain(scores.iter().map(|&score| format_score(score)))
        .collect()
    })
}

/// Write the wide table as CSV with a header row.
pub(crate) fn write_csv(table: &WideTable, output_file: &Path) -> Result<()> {
    let write_err = |err: csv::Error| ReshapeError::Write {
        path: output_file.to_path_buf(),
        message: err.to_string(),
    };

    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(output_file)
        .map_err(write_err)?;

    wtr.write_record(table.header()).map_err(write_err)?;
    for fields in row_fields(table) {
        wtr.write_record(&fields).map_err(write_err)?;
    }

    wtr.flush().map_err(|err| ReshapeError::Write {
        path: output_file.to_path_buf(),
        message: err.to_string(),
    })?;

    info!(path = %output_file.display(), rows = table.len(), "wrote wide table");
    Ok(())
}

/// Render the first `rows` rows for a quick look.
pub(crate) fn render_preview(table: &WideTable, rows: usize) -> Table {
    let mut preview = Table::new();
    preview.load_preset(UTF8_FULL_CONDENSED);
    preview.set_header(table.header());
    for fields in row_fields(table).take(rows) {
        let cells: Vec<Cell> = fields
            .into_iter()
            .enumerate()
            .map(|(idx, field)| {
                let cell = Cell::new(field);
                if idx >= FIXED_COLUMNS.len() {
                    cell.set_alignment(CellAlignment::Right)
                } else {
                    cell
                }
            })
            .collect();
        preview.add_row(cells);
    }
    preview
}

pub(crate) fn print_preview(table: &WideTable, rows: usize) {
    if table.is_empty() {
        println!("No countries found in the panel.");
        return;
    }
    println!("{}", render_preview(table, rows));
    println!("[{} rows x {} columns]", table.len(), table.header().len());
}
