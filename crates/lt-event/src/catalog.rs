//! Species catalog: PDG code → (species name, charge).
//!
//! The catalog is an ordered list of species, each owning a set of PDG codes.
//! A code belongs to at most one species. Resolution walks species in
//! registration order, so iteration order is part of the contract.

use std::fmt;
use std::str::FromStr;

use lt_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Electric charge as an exact multiple of e/3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Charge {
    thirds: i32,
}

impl Charge {
    /// Neutral.
    pub const ZERO: Charge = Charge { thirds: 0 };

    /// Charge of `n` × e/3.
    pub const fn thirds(n: i32) -> Self {
        Self { thirds: n }
    }

    /// Integer charge of `n` × e.
    pub const fn integer(n: i32) -> Self {
        Self { thirds: 3 * n }
    }

    /// Numerator over a denominator of 3.
    pub fn in_thirds(self) -> i32 {
        self.thirds
    }

    /// Value in units of e.
    pub fn as_f64(self) -> f64 {
        f64::from(self.thirds) / 3.0
    }

    /// Parse from a float, accepting only multiples of 1/3 (within 1e-9).
    pub fn from_f64(value: f64) -> Result<Self> {
        let scaled = value * 3.0;
        let rounded = scaled.round();
        if !value.is_finite() || (scaled - rounded).abs() > 1e-9 {
            return Err(Error::Validation(format!(
                "charge {value} is not a multiple of e/3"
            )));
        }
        Ok(Self { thirds: rounded as i32 })
    }
}

impl fmt::Display for Charge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.thirds % 3 == 0 {
            write!(f, "{}", self.thirds / 3)
        } else {
            write!(f, "{}/3", self.thirds)
        }
    }
}

impl FromStr for Charge {
    type Err = Error;

    /// Accepts integers, decimals that are multiples of 1/3, and `"n/3"` or `"n/1"` fractions.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((num, den)) = s.split_once('/') {
            let num: i32 = num
                .trim()
                .parse()
                .map_err(|_| Error::Validation(format!("bad charge numerator in '{s}'")))?;
            let den: i32 = den
                .trim()
                .parse()
                .map_err(|_| Error::Validation(format!("bad charge denominator in '{s}'")))?;
            return match den {
                1 => Ok(Self::integer(num)),
                3 => Ok(Self::thirds(num)),
                _ => Err(Error::Validation(format!(
                    "charge '{s}' must have denominator 1 or 3"
                ))),
            };
        }
        let v: f64 =
            s.parse().map_err(|_| Error::Validation(format!("bad charge value '{s}'")))?;
        Self::from_f64(v)
    }
}

impl Serialize for Charge {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Charge {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Charge::from_f64(v).map_err(serde::de::Error::custom),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// One `(species, pdg, charge)` registration, as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    /// Species (column) name.
    pub name: String,
    /// PDG code.
    pub pdg_id: i32,
    /// Charge, either a number or a `"n/3"` string.
    pub charge: Charge,
}

#[derive(Debug, Clone)]
struct Species {
    name: String,
    codes: Vec<(i32, Charge)>,
}

/// Ordered species registry.
#[derive(Debug, Clone)]
pub struct SpeciesCatalog {
    species: Vec<Species>,
}

impl Default for SpeciesCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SpeciesCatalog {
    /// A catalog without any species.
    pub fn empty() -> Self {
        Self { species: Vec::new() }
    }

    /// Standard Model leptons, quarks and bosons.
    pub fn with_defaults() -> Self {
        const E: i32 = 3;
        const DEFAULTS: &[(&str, &[(i32, i32)])] = &[
            ("Electron", &[(11, -E), (-11, E)]),
            ("Muon", &[(13, -E), (-13, E)]),
            ("Tau", &[(15, -E), (-15, E)]),
            ("Neutrino", &[(12, 0), (14, 0), (16, 0), (-12, 0), (-14, 0), (-16, 0)]),
            ("Top", &[(6, 2), (-6, -2)]),
            ("Bottom", &[(5, -1), (-5, 1)]),
            ("Charm", &[(4, 2), (-4, -2)]),
            ("Strange", &[(3, -1), (-3, 1)]),
            ("Up", &[(2, 2), (-2, -2)]),
            ("Down", &[(1, -1), (-1, 1)]),
            ("Gluon", &[(21, 0)]),
            ("Gamma", &[(22, 0)]),
            ("Z", &[(23, 0)]),
            ("W", &[(24, E), (-24, -E)]),
            ("H", &[(25, 0)]),
        ];

        let mut c = Self::empty();
        for &(name, codes) in DEFAULTS {
            for &(pdg, thirds) in codes {
                c.insert(name, pdg, Charge::thirds(thirds));
            }
        }
        c
    }

    /// Register `pdg` under `species`.
    ///
    /// Creates the species if needed. A code already owned by another species
    /// is moved, so the last registration wins.
    pub fn register(&mut self, species: &str, pdg: i32, charge: Charge) -> Result<()> {
        if species.trim().is_empty() {
            return Err(Error::Validation("species name must be non-empty".into()));
        }
        if self.species_index(species).is_none() {
            tracing::info!(species, "species added");
        }
        if let Some(previous) = self.resolve(pdg).map(|(s, _)| s.to_string())
            && previous != species
        {
            tracing::warn!(pdg, from = %previous, to = species, "PDG code moved between species");
        }
        self.insert(species, pdg, charge);
        tracing::info!(species, pdg, charge = %charge, "PDG code registered");
        Ok(())
    }

    /// Register every definition in order.
    pub fn extend(&mut self, defs: &[SpeciesDefinition]) -> Result<()> {
        for d in defs {
            self.register(&d.name, d.pdg_id, d.charge)?;
        }
        Ok(())
    }

    fn insert(&mut self, species: &str, pdg: i32, charge: Charge) {
        for s in &mut self.species {
            if s.name != species {
                s.codes.retain(|(code, _)| *code != pdg);
            }
        }
        let idx = match self.species_index(species) {
            Some(i) => i,
            None => {
                self.species.push(Species { name: species.to_string(), codes: Vec::new() });
                self.species.len() - 1
            }
        };
        let codes = &mut self.species[idx].codes;
        match codes.iter_mut().find(|(code, _)| *code == pdg) {
            Some(entry) => entry.1 = charge,
            None => codes.push((pdg, charge)),
        }
    }

    /// Species name and charge for a PDG code.
    pub fn resolve(&self, pdg: i32) -> Option<(&str, Charge)> {
        self.resolve_index(pdg).map(|(i, q)| (self.species[i].name.as_str(), q))
    }

    /// Species position and charge for a PDG code.
    pub fn resolve_index(&self, pdg: i32) -> Option<(usize, Charge)> {
        self.species.iter().enumerate().find_map(|(i, s)| {
            s.codes.iter().find(|(code, _)| *code == pdg).map(|&(_, q)| (i, q))
        })
    }

    /// Position of a species.
    pub fn species_index(&self, species: &str) -> Option<usize> {
        self.species.iter().position(|s| s.name == species)
    }

    /// Species names in registration order.
    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }

    /// PDG codes and charges of one species, in registration order.
    pub fn codes(&self, species: &str) -> &[(i32, Charge)] {
        self.species_index(species).map(|i| self.species[i].codes.as_slice()).unwrap_or(&[])
    }

    /// Number of species.
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// `true` if no species is registered.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let c = SpeciesCatalog::with_defaults();
        assert_eq!(c.len(), 15);
        assert_eq!(c.species_names()[0], "Electron");
        assert_eq!(c.species_names()[14], "H");
        assert_eq!(c.resolve(11), Some(("Electron", Charge::integer(-1))));
        assert_eq!(c.resolve(-11), Some(("Electron", Charge::integer(1))));
        assert_eq!(c.resolve(-16), Some(("Neutrino", Charge::ZERO)));
        assert_eq!(c.resolve(6), Some(("Top", Charge::thirds(2))));
        assert_eq!(c.resolve(-5), Some(("Bottom", Charge::thirds(1))));
        assert_eq!(c.resolve(-24), Some(("W", Charge::integer(-1))));
        assert_eq!(c.resolve(9999), None);
        assert_eq!(c.resolve(0), None);
    }

    #[test]
    fn test_register_new_species() {
        let mut c = SpeciesCatalog::with_defaults();
        c.register("Zprime", 32, Charge::ZERO).unwrap();
        assert_eq!(c.len(), 16);
        assert_eq!(c.species_index("Zprime"), Some(15));
        assert_eq!(c.resolve(32), Some(("Zprime", Charge::ZERO)));
    }

    #[test]
    fn test_reregistration_moves_code() {
        let mut c = SpeciesCatalog::with_defaults();
        c.register("Lepton", 11, Charge::integer(-1)).unwrap();
        assert_eq!(c.resolve(11).map(|(s, _)| s), Some("Lepton"));
        assert!(c.codes("Electron").iter().all(|(code, _)| *code != 11));
        // the old species keeps its column
        assert!(c.species_index("Electron").is_some());

        // every registered code resolves to exactly one species
        for name in c.species_names() {
            for &(code, _) in c.codes(&name) {
                let owners =
                    c.species_names().iter().filter(|n| c.codes(n).iter().any(|(k, _)| *k == code)).count();
                assert_eq!(owners, 1, "code {code} owned by {owners} species");
            }
        }
    }

    #[test]
    fn test_register_overwrites_charge() {
        let mut c = SpeciesCatalog::empty();
        c.register("X", 9000, Charge::ZERO).unwrap();
        c.register("X", 9000, Charge::integer(2)).unwrap();
        assert_eq!(c.codes("X"), &[(9000, Charge::integer(2))]);
        assert!(c.register("", 1, Charge::ZERO).is_err());
    }

    #[test]
    fn test_charge_parsing() {
        assert_eq!("2/3".parse::<Charge>().unwrap(), Charge::thirds(2));
        assert_eq!("-1".parse::<Charge>().unwrap(), Charge::integer(-1));
        assert_eq!("-1/1".parse::<Charge>().unwrap(), Charge::integer(-1));
        assert!("1/2".parse::<Charge>().is_err());
        assert!("0.5".parse::<Charge>().is_err());
        assert_eq!(Charge::from_f64(2.0 / 3.0).unwrap(), Charge::thirds(2));
        assert_eq!(Charge::thirds(-1).to_string(), "-1/3");
        assert_eq!(Charge::integer(1).to_string(), "1");
    }

    #[test]
    fn test_definition_from_json() {
        let defs: Vec<SpeciesDefinition> = serde_json::from_str(
            r#"[{"name":"Zprime","pdg_id":32,"charge":0},{"name":"Tprime","pdg_id":8,"charge":"2/3"}]"#,
        )
        .unwrap();
        let mut c = SpeciesCatalog::empty();
        c.extend(&defs).unwrap();
        assert_eq!(c.species_names(), vec!["Zprime".to_string(), "Tprime".to_string()]);
        assert_eq!(c.resolve(8), Some(("Tprime", Charge::thirds(2))));
    }
}
