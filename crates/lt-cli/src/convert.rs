//! `lhetab convert`: LHE file → per-species Parquet table.

use anyhow::{Context, Result};
use std::path::Path;

use lt_event::{ConversionSummary, Converter, ConverterConfig, OverflowPolicy};
use lt_io::{LheReader, ParquetSink, resolve_output_path};

use crate::config::{self, RunConfig};

/// Flags that override the run config.
#[derive(Debug, Default)]
pub struct ConvertOverrides {
    pub status: Option<Vec<i32>>,
    pub capacity: Option<usize>,
    pub overflow: Option<OverflowPolicy>,
    pub max_events: Option<u64>,
}

pub struct ConvertArgs<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub config: Option<&'a Path>,
    pub species_file: Option<&'a Path>,
    pub summary_json: Option<&'a Path>,
    pub overrides: ConvertOverrides,
}

fn effective_config(base: &ConverterConfig, overrides: &ConvertOverrides) -> ConverterConfig {
    let mut config = base.clone();
    if let Some(status) = &overrides.status {
        config = config.accepted_status(status.clone());
    }
    if let Some(capacity) = overrides.capacity {
        config = config.capacity(capacity);
    }
    if let Some(overflow) = overrides.overflow {
        config = config.overflow(overflow);
    }
    config
}

pub fn cmd_convert(args: ConvertArgs<'_>) -> Result<ConversionSummary> {
    let run_config = match args.config {
        Some(path) => config::read_run_config(path)?,
        None => RunConfig::default(),
    };
    let catalog = config::build_catalog(Some(&run_config), args.species_file)?;
    let converter_config = effective_config(&run_config.converter, &args.overrides);
    let converter_capacity = converter_config.capacity;

    let output = resolve_output_path(args.output);

    tracing::info!("opening LHE file: {}", args.input.display());
    let mut reader = LheReader::open(args.input)
        .with_context(|| format!("failed to open LHE file {}", args.input.display()))?;

    tracing::info!("writing Parquet to {}", output.display());
    let sink = ParquetSink::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?
        .with_batch_rows(run_config.batch_rows);

    let mut converter =
        Converter::new(&catalog, converter_config, sink).context("invalid conversion settings")?;
    converter.run(&mut reader, args.overrides.max_events).with_context(|| {
        format!(
            "conversion of {} stopped after {} events; {} is incomplete",
            args.input.display(),
            converter.summary().events_read,
            output.display()
        )
    })?;
    let (summary, _) = converter
        .finish()
        .with_context(|| format!("failed to finalize {}", output.display()))?;

    let file_size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "Converted {} events ({} particles in {} species) → {} ({:.1} KB)",
        summary.rows_written,
        summary.particles.accepted,
        summary.species_counts.len(),
        output.display(),
        file_size as f64 / 1024.0,
    );
    if summary.particles.unknown_type > 0 || summary.particles.status_rejected > 0 {
        eprintln!(
            "Skipped {} particles of unregistered type and {} with other status codes",
            summary.particles.unknown_type, summary.particles.status_rejected
        );
    }
    if summary.events_rejected > 0 {
        eprintln!(
            "Rejected {} events with more than {} particles of one species (use --overflow truncate to keep them)",
            summary.events_rejected, converter_capacity,
        );
    }
    if summary.particles_truncated > 0 {
        eprintln!("Truncated {} particles beyond row capacity", summary.particles_truncated);
    }

    if let Some(path) = args.summary_json {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(summary)
}
