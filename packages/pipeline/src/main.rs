#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the theft map geocoding pipeline.

use std::path::PathBuf;

use clap::Parser;
use theft_map_cli_utils::IndicatifProgress;
use theft_map_incident_models::IncidentCategory;
use theft_map_pipeline::run_category;

#[derive(Parser)]
#[command(name = "theft_map_pipeline", about = "Batch geocoder for theft incident records")]
struct Cli {
    /// Directory holding per-category record folders; outputs land here too
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Categories to process, in order (default: bike house car cycle)
    categories: Vec<IncidentCategory>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = theft_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let categories: Vec<IncidentCategory> = if cli.categories.is_empty() {
        IncidentCategory::all().to_vec()
    } else {
        cli.categories
    };

    for category in categories {
        let progress = IndicatifProgress::lookup_bar(&multi, &format!("Geocoding {category}"));
        let summary = run_category(&cli.data_dir, category, Some(progress.clone())).await?;
        progress.finish(format!(
            "{category}: {}/{} geocoded, {} failed",
            summary.geocoded, summary.total, summary.failed
        ));
    }

    Ok(())
}
