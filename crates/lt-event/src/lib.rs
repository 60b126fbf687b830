//! # lt-event
//!
//! Per-event transformation of Les Houches events into species tables.
//!
//! Each event is classified particle by particle (status filter, species
//! lookup, kinematics, mother PDG codes), grouped into one list per catalog
//! species, ordered by descending pT and written as one row.
//!
//! ## Example
//!
//! ```
//! use lt_core::{RawEvent, RawParticle};
//! use lt_event::{Converter, ConverterConfig, MemorySink, SpeciesCatalog};
//!
//! let catalog = SpeciesCatalog::with_defaults();
//! let mut conv = Converter::new(&catalog, ConverterConfig::default(), MemorySink::new()).unwrap();
//! let electron = RawParticle { pdg_id: 11, status: 1, px: 3.0, py: 4.0, energy: 5.0, ..Default::default() };
//! conv.push_event(&RawEvent::new(vec![electron])).unwrap();
//! let (summary, sink) = conv.finish().unwrap();
//! assert_eq!(summary.rows_written, 1);
//! assert_eq!(sink.rows()[0].species[0][0].pt, 5.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ancestry;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod converter;
pub mod kinematics;
pub mod observables;
pub mod sink;
pub mod sort;

pub use ancestry::{AncestryTable, NO_PARENT};
pub use catalog::{Charge, SpeciesCatalog, SpeciesDefinition};
pub use classify::{ClassificationTally, Classifier, EventGroups, ParticleOutcome};
pub use config::{ConverterConfig, OverflowPolicy, Status};
pub use converter::{ConversionSummary, Converter, EventReport};
pub use kinematics::FourMomentum;
pub use observables::{Observable, ParticleView, asymmetry, invariant_mass};
pub use sink::MemorySink;
pub use sort::sort_by_pt;
