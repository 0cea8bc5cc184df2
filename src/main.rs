mod config;
mod error;
mod models;
mod reference;
mod reshape;
mod writer;

use std::process::ExitCode;

use tracing::{error, Level};

use crate::config::Config;
use crate::error::Result;

fn init_logging() {
    tracing_subscriber::fmt()
        .compact()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .init();
}

fn run(config: &Config) -> Result<()> {
    // Step 1: Reference lookups
    let codes = reference::load_country_codes(&config.codes_path)?;
    let mappings = reference::create_mappings(&codes, &config.reference_path, &config.flag_url_base)?;

    // Step 2: Pivot the panel
    let panel = reshape::load_panel(&config.panel_path)?;
    let table = reshape::transform_data(&panel, &mappings, config.years());

    // Step 3: Save and preview
    writer::write_csv(&table, &config.output_path)?;
    writer::print_preview(&table, config.preview_rows);

    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let config = Config::default();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = if err.is_not_found() {
                "missing input"
            } else if err.is_parse() {
                "malformed input"
            } else if err.is_write() {
                "output not written"
            } else {
                "unreadable input"
            };
            error!(kind, "{err}");
            ExitCode::FAILURE
        }
    }
}
