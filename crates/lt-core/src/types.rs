//! Common data types for lhetab

use serde::{Deserialize, Serialize};

/// Default number of particles one species column can hold per row.
pub const DEFAULT_CAPACITY: usize = 100;

/// One particle line of an input event, as delivered by the event reader.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawParticle {
    /// PDG particle code.
    pub pdg_id: i32,
    /// Status code (-1 incoming, 2 intermediate, 1 final, ...).
    pub status: i32,
    /// Momentum x component.
    pub px: f64,
    /// Momentum y component.
    pub py: f64,
    /// Momentum z component (beam axis).
    pub pz: f64,
    /// Energy.
    pub energy: f64,
    /// Generated mass.
    pub mass: f64,
    /// 1-based index of the first mother within the event (0 = none).
    pub mother1: i32,
    /// 1-based index of the second mother within the event (0 = none).
    pub mother2: i32,
    /// Colour flow tag.
    pub color1: i32,
    /// Anti-colour flow tag.
    pub color2: i32,
    /// Proper lifetime.
    pub lifetime: f64,
    /// Spin / helicity as written by the generator.
    pub spin: f64,
}

/// One input event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawEvent {
    /// Particles in file order. Mother indices point into this list.
    pub particles: Vec<RawParticle>,
    /// Event weight.
    pub weight: f64,
    /// Generator process id.
    pub process_id: i32,
}

impl RawEvent {
    /// Event with unit weight and process id 0.
    pub fn new(particles: Vec<RawParticle>) -> Self {
        Self { particles, weight: 1.0, process_id: 0 }
    }
}

/// A classified particle with derived kinematics and resolved ancestry.
///
/// Passthrough fields keep the names and meaning of [`RawParticle`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub pdg_id: i32,
    /// PDG code of the particle at `mother1` (0 when unresolvable).
    pub pdg_id_mother1: i32,
    /// PDG code of the particle at `mother2` (0 when unresolvable).
    pub pdg_id_mother2: i32,
    pub status: i32,

    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub energy: f64,
    pub mass: f64,

    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth in (-π, π].
    pub phi: f64,

    /// Electric charge in units of e, from the species catalog.
    pub charge: f64,

    pub mother1: i32,
    pub mother2: i32,
    pub color1: i32,
    pub color2: i32,

    pub lifetime: f64,
    pub helicity: i32,
}

/// Column layout of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Species column names, in catalog order.
    pub species: Vec<String>,
    /// Maximum number of particles per species per row.
    pub capacity: usize,
}

impl TableSchema {
    /// Create a schema, rejecting empty or duplicate species and a zero capacity.
    pub fn new(species: Vec<String>, capacity: usize) -> crate::Result<Self> {
        if capacity == 0 {
            return Err(crate::Error::Validation("row capacity must be at least 1".into()));
        }
        for (i, name) in species.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(crate::Error::Validation("species name must be non-empty".into()));
            }
            if species[..i].contains(name) {
                return Err(crate::Error::Validation(format!("duplicate species column '{name}'")));
            }
        }
        Ok(Self { species, capacity })
    }

    /// Position of a species column.
    pub fn index_of(&self, species: &str) -> Option<usize> {
        self.species.iter().position(|s| s == species)
    }

    /// Check that `row` has one list per species and no list exceeds the capacity.
    pub fn check_row(&self, row: &EventRow) -> crate::Result<()> {
        if row.species.len() != self.species.len() {
            return Err(crate::Error::Store(format!(
                "row has {} species lists, schema declares {}",
                row.species.len(),
                self.species.len()
            )));
        }
        for (name, list) in self.species.iter().zip(&row.species) {
            if list.len() > self.capacity {
                return Err(crate::Error::CapacityExceeded {
                    event: row.event,
                    species: name.clone(),
                    count: list.len(),
                    capacity: self.capacity,
                });
            }
        }
        Ok(())
    }
}

/// One output row: all species lists of a single event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventRow {
    /// 1-based ordinal of the event in the input stream.
    pub event: u64,
    /// Event weight carried over from the input.
    pub weight: f64,
    /// One pT-sorted list per schema species, same order as [`TableSchema::species`].
    pub species: Vec<Vec<ParticleRecord>>,
}

impl EventRow {
    /// Particles of one species, looked up through the schema.
    pub fn particles<'a>(&'a self, schema: &TableSchema, species: &str) -> &'a [ParticleRecord] {
        schema
            .index_of(species)
            .and_then(|i| self.species.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of particles in the row.
    pub fn n_particles(&self) -> usize {
        self.species.iter().map(Vec::len).sum()
    }
}
