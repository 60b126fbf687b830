//! Mother-index → mother PDG code resolution within one event.

use lt_core::RawParticle;

/// PDG code returned when a mother index does not point into the event.
pub const NO_PARENT: i32 = 0;

/// PDG codes of every particle of one event, by position.
///
/// Built from the unfiltered particle list, so mothers that are themselves
/// dropped by status or species filtering still resolve.
#[derive(Debug, Clone, Default)]
pub struct AncestryTable {
    pdg_at: Vec<i32>,
}

impl AncestryTable {
    /// Index the particles of one event.
    pub fn from_particles(particles: &[RawParticle]) -> Self {
        Self { pdg_at: particles.iter().map(|p| p.pdg_id).collect() }
    }

    /// PDG code of the particle at 1-based `index`, or [`NO_PARENT`].
    pub fn parent_pdg(&self, index: i32) -> i32 {
        if index < 1 {
            return NO_PARENT;
        }
        self.pdg_at.get(index as usize - 1).copied().unwrap_or(NO_PARENT)
    }

    /// Number of indexed particles.
    pub fn len(&self) -> usize {
        self.pdg_at.len()
    }

    /// `true` for an event without particles.
    pub fn is_empty(&self) -> bool {
        self.pdg_at.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(pdg_id: i32) -> RawParticle {
        RawParticle { pdg_id, ..Default::default() }
    }

    #[test]
    fn test_parent_lookup() {
        let t = AncestryTable::from_particles(&[particle(21), particle(21), particle(6)]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.parent_pdg(1), 21);
        assert_eq!(t.parent_pdg(3), 6);
    }

    #[test]
    fn test_out_of_range_is_sentinel() {
        let t = AncestryTable::from_particles(&[particle(6), particle(-6)]);
        assert_eq!(t.parent_pdg(0), NO_PARENT);
        assert_eq!(t.parent_pdg(-4), NO_PARENT);
        assert_eq!(t.parent_pdg(3), NO_PARENT);
        assert_eq!(t.parent_pdg(i32::MAX), NO_PARENT);
        assert_eq!(AncestryTable::default().parent_pdg(1), NO_PARENT);
    }
}
