//! lhetab CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use lt_event::{OverflowPolicy, SpeciesCatalog};

mod config;
mod convert;
mod inspect;

#[derive(Parser)]
#[command(name = "lhetab")]
#[command(about = "lhetab - per-species, pT-sorted event tables from Les Houches files")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an LHE file (plain or gzip) into a Parquet species table
    Convert {
        /// Input LHE file
        #[arg(short, long)]
        input: PathBuf,

        /// Output table. Paths not ending in `.parquet` fall back to `lhe_analysis.parquet`.
        #[arg(short, long)]
        output: PathBuf,

        /// Run configuration (YAML, or JSON by extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Accepted status codes, comma separated (e.g. `-1,2,1`)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        status: Option<Vec<i32>>,

        /// Maximum particles per species per event
        #[arg(long)]
        capacity: Option<usize>,

        /// What to do with events exceeding the capacity (reject, truncate)
        #[arg(long)]
        overflow: Option<OverflowPolicy>,

        /// Extra species definitions (JSON or YAML list of `{name, pdg_id, charge}`)
        #[arg(long)]
        species_file: Option<PathBuf>,

        /// Stop after this many events
        #[arg(long)]
        max_events: Option<u64>,

        /// Write the conversion summary as pretty JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },

    /// Per-species particle counts and leading-pT summary of a table
    Inspect {
        /// Species table (Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Only decode this species column
        #[arg(long)]
        species: Option<String>,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the resolved species catalog
    Species {
        /// Run configuration whose `species` extend the defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extra species definitions
        #[arg(long)]
        species_file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config: config_path,
            status,
            capacity,
            overflow,
            species_file,
            max_events,
            summary_json,
        } => convert::cmd_convert(convert::ConvertArgs {
            input: &input,
            output: &output,
            config: config_path.as_deref(),
            species_file: species_file.as_deref(),
            summary_json: summary_json.as_deref(),
            overrides: convert::ConvertOverrides { status, capacity, overflow, max_events },
        })
        .map(|_| ()),
        Commands::Inspect { input, species, output } => {
            let value = inspect::cmd_inspect(&input, species.as_deref())?;
            write_json(output.as_deref(), value)
        }
        Commands::Species { config: config_path, species_file } => {
            let run_config = config_path.as_deref().map(config::read_run_config).transpose()?;
            let catalog = config::build_catalog(run_config.as_ref(), species_file.as_deref())?;
            write_json(None, catalog_json(&catalog))
        }
    }
}

fn catalog_json(catalog: &SpeciesCatalog) -> serde_json::Value {
    let species: Vec<serde_json::Value> = catalog
        .species_names()
        .iter()
        .map(|name| {
            let codes: Vec<serde_json::Value> = catalog
                .codes(name)
                .iter()
                .map(|(pdg, charge)| serde_json::json!({ "pdg_id": pdg, "charge": charge }))
                .collect();
            serde_json::json!({ "name": name, "codes": codes })
        })
        .collect();
    serde_json::json!({ "species": species })
}

fn write_json(output: Option<&Path>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
