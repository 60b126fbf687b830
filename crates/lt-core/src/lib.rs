//! # lt-core
//!
//! Core types, traits and errors shared by the lhetab crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{EventSource, IterSource, RecordSink};
pub use types::{DEFAULT_CAPACITY, EventRow, ParticleRecord, RawEvent, RawParticle, TableSchema};
