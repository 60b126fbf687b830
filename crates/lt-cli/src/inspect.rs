//! `lhetab inspect`: per-species summary of a written table.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use lt_core::ParticleRecord;
use lt_io::ParquetTableReader;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesStats {
    pub name: String,
    pub particles: u64,
    /// Rows with at least one particle of this species.
    pub events: u64,
    pub max_multiplicity: usize,
    /// Mean pT of the leading particle over `events` (0 when `events == 0`).
    pub leading_pt_mean: f64,
}

impl SpeciesStats {
    fn from_lists<'a>(name: &str, lists: impl IntoIterator<Item = &'a [ParticleRecord]>) -> Self {
        let mut stats = Self {
            name: name.to_string(),
            particles: 0,
            events: 0,
            max_multiplicity: 0,
            leading_pt_mean: 0.0,
        };
        let mut leading_sum = 0.0;
        for list in lists {
            stats.particles += list.len() as u64;
            stats.max_multiplicity = stats.max_multiplicity.max(list.len());
            if let Some(first) = list.first() {
                stats.events += 1;
                leading_sum += first.pt;
            }
        }
        if stats.events > 0 {
            stats.leading_pt_mean = leading_sum / stats.events as f64;
        }
        stats
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub rows: u64,
    pub capacity: usize,
    pub species: Vec<SpeciesStats>,
}

pub fn cmd_inspect(input: &Path, species: Option<&str>) -> Result<serde_json::Value> {
    let table = ParquetTableReader::open(input)
        .with_context(|| format!("failed to open species table {}", input.display()))?;
    let schema = table.schema();

    let stats = match species {
        Some(name) => {
            let lists = table.read_species(name)?;
            vec![SpeciesStats::from_lists(name, lists.iter().map(Vec::as_slice))]
        }
        None => {
            let rows = table.read_rows()?;
            schema
                .species
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    SpeciesStats::from_lists(name, rows.iter().map(|r| r.species[i].as_slice()))
                })
                .collect()
        }
    };
    tracing::info!(rows = table.num_rows(), species = stats.len(), "table inspected");

    let summary = TableSummary { rows: table.num_rows(), capacity: schema.capacity, species: stats };
    Ok(serde_json::to_value(summary)?)
}
