//! # lt-io
//!
//! Input and output for lhetab: a Les Houches event reader (plain or gzip)
//! and the Parquet species-table store with its reader.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use lt_event::{Converter, ConverterConfig, SpeciesCatalog};
//! use lt_io::{LheReader, ParquetSink, resolve_output_path};
//!
//! # fn main() -> lt_core::Result<()> {
//! let catalog = SpeciesCatalog::with_defaults();
//! let mut reader = LheReader::open(Path::new("ttbar.lhe.gz"))?;
//! let sink = ParquetSink::create(&resolve_output_path(Path::new("ttbar.parquet")))?;
//! let mut conv = Converter::new(&catalog, ConverterConfig::default(), sink)?;
//! conv.run(&mut reader, None)?;
//! let (summary, _) = conv.finish()?;
//! println!("{} rows", summary.rows_written);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lhe;
pub mod path;
pub mod table;

pub use lhe::LheReader;
pub use path::{FALLBACK_OUTPUT, full_extension, resolve_output_path};
pub use table::{ParquetSink, ParquetTableReader};
