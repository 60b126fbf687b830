//! Typed access to particle observables for downstream analyses.

use std::fmt;
use std::str::FromStr;

use lt_core::{Error, ParticleRecord, Result};

use crate::kinematics::{FourMomentum, delta_phi, delta_r};

/// Numeric observable of a [`ParticleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Observable {
    /// Transverse momentum.
    Pt,
    /// Pseudorapidity.
    Eta,
    /// Azimuth.
    Phi,
    /// Energy.
    Energy,
    /// Generated mass.
    Mass,
    /// x momentum.
    Px,
    /// y momentum.
    Py,
    /// z momentum.
    Pz,
    /// Charge in units of e.
    Charge,
}

impl Observable {
    /// Every observable, in declaration order.
    pub const ALL: [Observable; 9] = [
        Observable::Pt,
        Observable::Eta,
        Observable::Phi,
        Observable::Energy,
        Observable::Mass,
        Observable::Px,
        Observable::Py,
        Observable::Pz,
        Observable::Charge,
    ];

    /// Column name in the output table.
    pub fn name(self) -> &'static str {
        match self {
            Observable::Pt => "pt",
            Observable::Eta => "eta",
            Observable::Phi => "phi",
            Observable::Energy => "energy",
            Observable::Mass => "mass",
            Observable::Px => "px",
            Observable::Py => "py",
            Observable::Pz => "pz",
            Observable::Charge => "charge",
        }
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Observable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Observable::ALL
            .into_iter()
            .find(|o| o.name() == key)
            .ok_or_else(|| Error::Validation(format!("unknown observable '{s}'")))
    }
}

/// Analysis helpers on [`ParticleRecord`].
pub trait ParticleView {
    /// Value of one observable.
    fn get(&self, obs: Observable) -> f64;

    /// `(px, py, pz, E)`.
    fn four_momentum(&self) -> FourMomentum;

    /// `true` if both mothers resolve to `pdg`.
    fn descends_from(&self, pdg: i32) -> bool;

    /// `true` if either mother resolves to `pdg`.
    fn has_parent(&self, pdg: i32) -> bool;

    /// Signed azimuthal separation to `other`.
    fn delta_phi(&self, other: &ParticleRecord) -> f64;

    /// Angular distance to `other` (pseudorapidity based).
    fn delta_r(&self, other: &ParticleRecord) -> f64;
}

impl ParticleView for ParticleRecord {
    fn get(&self, obs: Observable) -> f64 {
        match obs {
            Observable::Pt => self.pt,
            Observable::Eta => self.eta,
            Observable::Phi => self.phi,
            Observable::Energy => self.energy,
            Observable::Mass => self.mass,
            Observable::Px => self.px,
            Observable::Py => self.py,
            Observable::Pz => self.pz,
            Observable::Charge => self.charge,
        }
    }

    fn four_momentum(&self) -> FourMomentum {
        FourMomentum::new(self.px, self.py, self.pz, self.energy)
    }

    fn descends_from(&self, pdg: i32) -> bool {
        self.pdg_id_mother1 == pdg && self.pdg_id_mother2 == pdg
    }

    fn has_parent(&self, pdg: i32) -> bool {
        self.pdg_id_mother1 == pdg || self.pdg_id_mother2 == pdg
    }

    fn delta_phi(&self, other: &ParticleRecord) -> f64 {
        delta_phi(self.phi, other.phi)
    }

    fn delta_r(&self, other: &ParticleRecord) -> f64 {
        delta_r(self.eta, self.phi, other.eta, other.phi)
    }
}

/// `(a - b) / (a + b)` of one observable, `0` when the sum is not positive.
pub fn asymmetry(obs: Observable, a: &ParticleRecord, b: &ParticleRecord) -> f64 {
    let (x, y) = (a.get(obs), b.get(obs));
    let sum = x + y;
    if sum > 0.0 { (x - y) / sum } else { 0.0 }
}

/// Invariant mass of a set of particles.
pub fn invariant_mass<'p>(particles: impl IntoIterator<Item = &'p ParticleRecord>) -> f64 {
    particles
        .into_iter()
        .map(|p| p.four_momentum())
        .fold(FourMomentum::default(), |acc, p| acc + p)
        .mass()
}
