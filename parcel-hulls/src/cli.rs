//! Arguments et exécution de la commande

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use polyhull::DelaunayHullKernel;
use tracing::{info, warn};

use parcel_hulls::config::HullConfig;
use parcel_hulls::io::geojson::{read_collection, write_collection, write_issue_files};
use parcel_hulls::pipeline::process_features;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input GeoJSON FeatureCollection
    #[arg(short, long, default_value = "./output_data/0b_parks_filtered.geojson")]
    pub input: PathBuf,

    /// Output with geometries replaced by their concave hull
    #[arg(long, default_value = "./output_data/1a_parks_concave_hulls.geojson")]
    pub hulls_output: PathBuf,

    /// Output with original geometries and the hull as a property
    #[arg(long, default_value = "./output_data/1a_parks_with_concave_hulls.geojson")]
    pub annotated_output: PathBuf,

    /// Directory for per-feature issue files
    #[arg(long, default_value = "temp/issue_geojson")]
    pub issue_dir: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only process features with this name (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Starting threshold in meters
    #[arg(long)]
    pub start_threshold: Option<f64>,

    /// Threshold increment in meters
    #[arg(long)]
    pub increment: Option<f64>,

    /// Maximum attempts per feature
    #[arg(long)]
    pub max_attempts: Option<usize>,

    /// Tiny fragment area in square meters
    #[arg(long)]
    pub tiny_area: Option<f64>,

    /// Save the JSON report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Configuration effective : fichier, puis surcharges CLI
    fn resolve_config(&self) -> Result<HullConfig> {
        let mut config = match &self.config {
            Some(path) => HullConfig::load(path)?,
            None => HullConfig::default(),
        };

        config.whitelist.extend(self.only.iter().cloned());
        if let Some(v) = self.start_threshold {
            config.start_threshold_m = v;
        }
        if let Some(v) = self.increment {
            config.threshold_increment_m = v;
        }
        if let Some(v) = self.max_attempts {
            config.max_attempts = v;
        }
        if let Some(v) = self.tiny_area {
            config.tiny_area_sq_m = v;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Exécute le calcul complet
pub fn cmd_run(args: &RunArgs) -> Result<()> {
    let config = args.resolve_config()?;
    info!(
        start_m = config.start_threshold_m,
        increment_m = config.threshold_increment_m,
        max_attempts = config.max_attempts,
        whitelist = config.whitelist.len(),
        "Configuration loaded"
    );

    let collection = read_collection(&args.input)?;
    let output = process_features(&collection.features, &config, &DelaunayHullKernel)?;

    let issues = output.issue_features();
    if !issues.is_empty() {
        let written = write_issue_files(&args.issue_dir, &issues);
        if written.len() < issues.len() {
            warn!(
                expected = issues.len(),
                written = written.len(),
                "Some issue files could not be written"
            );
        }
    }

    write_output(&output.hulls, &args.hulls_output)?;
    write_output(&output.annotated, &args.annotated_output)?;

    if let Some(path) = &args.report {
        output
            .report
            .save_to_file(path)
            .context(format!("Failed to save report: {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    output.report.display();
    info!("{}", output.report.summary());

    Ok(())
}

fn write_output(features: &[geojson::Feature], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Could not create directory: {}", parent.display()))?;
    }
    write_collection(features, path)?;
    info!(path = %path.display(), features = features.len(), "Output written");
    Ok(())
}
