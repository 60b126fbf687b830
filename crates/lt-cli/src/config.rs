//! Run configuration and species extension files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use lt_event::{ConverterConfig, SpeciesCatalog, SpeciesDefinition};
use lt_io::table::DEFAULT_BATCH_ROWS;

/// `lhetab convert --config run.yaml`.
///
/// ```yaml
/// accepted_status: [-1, 2, 1]
/// capacity: 100
/// overflow: truncate
/// batch_rows: 4096
/// species:
///   - { name: Zprime, pdg_id: 32, charge: 0 }
///   - { name: Top, pdg_id: 8, charge: "2/3" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(flatten)]
    pub converter: ConverterConfig,

    /// Rows per Parquet record batch.
    #[serde(default = "default_batch_rows")]
    pub batch_rows: usize,

    /// Registered after the default catalog, in order.
    #[serde(default)]
    pub species: Vec<SpeciesDefinition>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            converter: ConverterConfig::default(),
            batch_rows: default_batch_rows(),
            species: Vec::new(),
        }
    }
}

fn default_batch_rows() -> usize {
    DEFAULT_BATCH_ROWS
}

fn read_json_or_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let value = if ext == "json" {
        serde_json::from_slice(&bytes).with_context(|| format!("invalid JSON in {}", path.display()))?
    } else {
        // Default: YAML (serde_yaml_ng).
        serde_yaml_ng::from_slice(&bytes)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    };
    Ok(value)
}

pub fn read_run_config(path: &Path) -> Result<RunConfig> {
    read_json_or_yaml(path)
}

/// A species file is a bare list of definitions.
pub fn read_species_file(path: &Path) -> Result<Vec<SpeciesDefinition>> {
    read_json_or_yaml(path)
}

/// Default catalog, then config species, then species-file species.
pub fn build_catalog(
    config: Option<&RunConfig>,
    species_file: Option<&Path>,
) -> Result<SpeciesCatalog> {
    let mut catalog = SpeciesCatalog::with_defaults();
    if let Some(cfg) = config {
        catalog.extend(&cfg.species).context("invalid species in run config")?;
    }
    if let Some(path) = species_file {
        let defs = read_species_file(path)?;
        catalog
            .extend(&defs)
            .with_context(|| format!("invalid species in {}", path.display()))?;
    }
    Ok(catalog)
}
