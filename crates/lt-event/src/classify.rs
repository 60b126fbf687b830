//! Per-event classification of raw particles into species buckets.

use lt_core::{ParticleRecord, RawEvent, RawParticle};

use crate::ancestry::AncestryTable;
use crate::catalog::{Charge, SpeciesCatalog};
use crate::config::ConverterConfig;
use crate::kinematics::{azimuth, pseudorapidity, transverse_momentum};

/// Fate of a single raw particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleOutcome {
    /// Kept, appended to the bucket of the species at this catalog position.
    Accepted {
        /// Catalog position of the species.
        species: usize,
    },
    /// Dropped: status not in the accepted set.
    StatusRejected,
    /// Dropped: PDG code not in the catalog.
    UnknownType,
}

/// Counters over particle outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ClassificationTally {
    /// Particles appended to a bucket.
    pub accepted: u64,
    /// Particles dropped by status.
    pub status_rejected: u64,
    /// Particles dropped by PDG code.
    pub unknown_type: u64,
}

impl ClassificationTally {
    /// Count one outcome.
    pub fn record(&mut self, outcome: ParticleOutcome) {
        match outcome {
            ParticleOutcome::Accepted { .. } => self.accepted += 1,
            ParticleOutcome::StatusRejected => self.status_rejected += 1,
            ParticleOutcome::UnknownType => self.unknown_type += 1,
        }
    }

    /// Add another tally.
    pub fn merge(&mut self, other: &ClassificationTally) {
        self.accepted += other.accepted;
        self.status_rejected += other.status_rejected;
        self.unknown_type += other.unknown_type;
    }

    /// Total particles seen.
    pub fn total(&self) -> u64 {
        self.accepted + self.status_rejected + self.unknown_type
    }
}

/// Species buckets of one event, aligned with catalog order.
#[derive(Debug, Clone, Default)]
pub struct EventGroups {
    buckets: Vec<Vec<ParticleRecord>>,
    tally: ClassificationTally,
}

impl EventGroups {
    /// Empty buckets for `n_species` species.
    pub fn new(n_species: usize) -> Self {
        Self { buckets: vec![Vec::new(); n_species], tally: ClassificationTally::default() }
    }

    /// Particles of the species at catalog position `species`.
    pub fn bucket(&self, species: usize) -> &[ParticleRecord] {
        self.buckets.get(species).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All buckets, catalog order.
    pub fn buckets(&self) -> &[Vec<ParticleRecord>] {
        &self.buckets
    }

    /// Mutable access for sorting / truncation.
    pub fn buckets_mut(&mut self) -> &mut [Vec<ParticleRecord>] {
        &mut self.buckets
    }

    /// Outcome counters for this event.
    pub fn tally(&self) -> &ClassificationTally {
        &self.tally
    }

    /// Hand the buckets over to an output row.
    pub fn into_buckets(self) -> Vec<Vec<ParticleRecord>> {
        self.buckets
    }
}

/// Classifies the particles of an event against a catalog and status set.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    catalog: &'a SpeciesCatalog,
    config: &'a ConverterConfig,
}

impl<'a> Classifier<'a> {
    /// Bind a catalog and configuration.
    pub fn new(catalog: &'a SpeciesCatalog, config: &'a ConverterConfig) -> Self {
        Self { catalog, config }
    }

    /// Classify one particle. `ancestry` must be built from the same event.
    pub fn classify_particle(
        &self,
        particle: &RawParticle,
        ancestry: &AncestryTable,
    ) -> (ParticleOutcome, Option<ParticleRecord>) {
        if !self.config.accepts(particle.status) {
            return (ParticleOutcome::StatusRejected, None);
        }
        let Some((species, charge)) = self.catalog.resolve_index(particle.pdg_id) else {
            return (ParticleOutcome::UnknownType, None);
        };
        let record = build_record(particle, charge, ancestry);
        (ParticleOutcome::Accepted { species }, Some(record))
    }

    /// Classify every particle of `event`, in input order, into fresh buckets.
    pub fn classify(&self, event: &RawEvent) -> EventGroups {
        let ancestry = AncestryTable::from_particles(&event.particles);
        let mut groups = EventGroups::new(self.catalog.len());
        for particle in &event.particles {
            let (outcome, record) = self.classify_particle(particle, &ancestry);
            groups.tally.record(outcome);
            if let (ParticleOutcome::Accepted { species }, Some(record)) = (outcome, record) {
                groups.buckets[species].push(record);
            }
        }
        groups
    }
}

fn build_record(p: &RawParticle, charge: Charge, ancestry: &AncestryTable) -> ParticleRecord {
    ParticleRecord {
        pdg_id: p.pdg_id,
        pdg_id_mother1: ancestry.parent_pdg(p.mother1),
        pdg_id_mother2: ancestry.parent_pdg(p.mother2),
        status: p.status,
        px: p.px,
        py: p.py,
        pz: p.pz,
        energy: p.energy,
        mass: p.mass,
        pt: transverse_momentum(p.px, p.py),
        eta: pseudorapidity(p.pz, p.energy),
        phi: azimuth(p.px, p.py),
        charge: charge.as_f64(),
        mother1: p.mother1,
        mother2: p.mother2,
        color1: p.color1,
        color2: p.color2,
        lifetime: p.lifetime,
        helicity: p.spin as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(pdg_id: i32, status: i32, px: f64) -> RawParticle {
        RawParticle { pdg_id, status, px, energy: px.abs() + 1.0, ..Default::default() }
    }

    #[test]
    fn test_outcomes() {
        let catalog = SpeciesCatalog::with_defaults();
        let config = ConverterConfig::default().accepted_status(vec![1]);
        let cls = Classifier::new(&catalog, &config);
        let anc = AncestryTable::default();

        let (o, r) = cls.classify_particle(&particle(11, 1, 1.0), &anc);
        assert_eq!(o, ParticleOutcome::Accepted { species: 0 });
        assert_eq!(r.unwrap().charge, -1.0);

        let (o, r) = cls.classify_particle(&particle(11, -1, 1.0), &anc);
        assert_eq!(o, ParticleOutcome::StatusRejected);
        assert!(r.is_none());

        let (o, _) = cls.classify_particle(&particle(9999, 1, 1.0), &anc);
        assert_eq!(o, ParticleOutcome::UnknownType);
    }

    #[test]
    fn test_grouping_keeps_input_order() {
        let catalog = SpeciesCatalog::with_defaults();
        let config = ConverterConfig::default();
        let event = RawEvent::new(vec![
            particle(5, 1, 10.0),
            particle(21, 1, 7.0),
            particle(-5, 1, 30.0),
            particle(9999, 1, 1.0),
            particle(5, 3, 1.0),
        ]);
        let groups = Classifier::new(&catalog, &config).classify(&event);

        let bottom = catalog.species_index("Bottom").unwrap();
        let pts: Vec<f64> = groups.bucket(bottom).iter().map(|p| p.pt).collect();
        assert_eq!(pts, vec![10.0, 30.0]);
        assert_eq!(groups.bucket(catalog.species_index("Gluon").unwrap()).len(), 1);
        assert_eq!(groups.buckets().len(), catalog.len());
        assert_eq!(
            *groups.tally(),
            ClassificationTally { accepted: 3, status_rejected: 1, unknown_type: 1 }
        );
    }

    #[test]
    fn test_ancestry_uses_unfiltered_event() {
        let catalog = SpeciesCatalog::with_defaults();
        let config = ConverterConfig::default().accepted_status(vec![1]);
        let mut w = particle(24, 2, 40.0);
        w.mother1 = 1;
        let mut b = particle(5, 1, 20.0);
        b.mother1 = 1;
        b.mother2 = 1;
        let mut lepton = particle(-11, 1, 15.0);
        lepton.mother1 = 2;
        lepton.mother2 = 9;
        let event = RawEvent::new(vec![particle(6, 2, 60.0), w, b, lepton]);
        let groups = Classifier::new(&catalog, &config).classify(&event);

        // top and W are filtered by status but still resolve as mothers
        let bq = groups.bucket(catalog.species_index("Bottom").unwrap())[0];
        assert_eq!((bq.pdg_id_mother1, bq.pdg_id_mother2), (6, 6));
        let e = groups.bucket(catalog.species_index("Electron").unwrap())[0];
        assert_eq!((e.pdg_id_mother1, e.pdg_id_mother2), (24, 0));
        assert_eq!(e.charge, 1.0);
        assert!(groups.bucket(catalog.species_index("W").unwrap()).is_empty());
    }

    #[test]
    fn test_helicity_truncates() {
        let catalog = SpeciesCatalog::with_defaults();
        let config = ConverterConfig::default();
        let mut p = particle(22, 1, 3.0);
        p.spin = -1.0;
        let groups = Classifier::new(&catalog, &config).classify(&RawEvent::new(vec![p]));
        assert_eq!(groups.bucket(catalog.species_index("Gamma").unwrap())[0].helicity, -1);
        p.spin = 9.0;
        let groups = Classifier::new(&catalog, &config).classify(&RawEvent::new(vec![p]));
        assert_eq!(groups.bucket(catalog.species_index("Gamma").unwrap())[0].helicity, 9);
    }
}
