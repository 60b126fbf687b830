//! Kinematic observables derived from a four-momentum.
//!
//! No unit conversion is applied: outputs carry the units of the input
//! (GeV for LHE files).

use std::f64::consts::PI;
use std::ops::Add;

/// Transverse momentum `sqrt(px² + py²)`.
#[inline]
pub fn transverse_momentum(px: f64, py: f64) -> f64 {
    (px * px + py * py).sqrt()
}

/// Azimuthal angle `atan2(py, px)`, in (-π, π].
///
/// `py == -0.0` with negative `px` maps to `π`, not `-π`.
#[inline]
pub fn azimuth(px: f64, py: f64) -> f64 {
    let phi = py.atan2(px);
    if phi == -PI { PI } else { phi }
}

/// Pseudorapidity `0.5 * ln((E + pz) / (E - pz))`.
///
/// Returns exactly `0.0` when `E == |pz|`. The guard is an exact float
/// comparison; nearly-degenerate momenta go through the formula.
#[inline]
pub fn pseudorapidity(pz: f64, energy: f64) -> f64 {
    if energy == pz.abs() {
        return 0.0;
    }
    0.5 * ((energy + pz) / (energy - pz)).ln()
}

/// Azimuthal separation wrapped into [-π, π].
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut d = phi1 - phi2;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d < -PI {
        d += 2.0 * PI;
    }
    d
}

/// Angular distance `sqrt(Δη² + Δφ²)` using pseudorapidity.
pub fn delta_r(eta1: f64, phi1: f64, eta2: f64, phi2: f64) -> f64 {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    (deta * deta + dphi * dphi).sqrt()
}

/// Plain `(px, py, pz, E)` four-vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourMomentum {
    /// x component.
    pub px: f64,
    /// y component.
    pub py: f64,
    /// z component.
    pub pz: f64,
    /// Energy.
    pub e: f64,
}

impl FourMomentum {
    /// Build from components.
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        transverse_momentum(self.px, self.py)
    }

    /// Azimuth.
    pub fn phi(&self) -> f64 {
        azimuth(self.px, self.py)
    }

    /// Pseudorapidity.
    pub fn eta(&self) -> f64 {
        pseudorapidity(self.pz, self.e)
    }

    /// Invariant mass. Space-like vectors give `-sqrt(-m²)`.
    pub fn mass(&self) -> f64 {
        let m2 = self.e * self.e - (self.px * self.px + self.py * self.py + self.pz * self.pz);
        if m2 < 0.0 { -(-m2).sqrt() } else { m2.sqrt() }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum::new(self.px + rhs.px, self.py + rhs.py, self.pz + rhs.pz, self.e + rhs.e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pt_and_phi() {
        assert_relative_eq!(transverse_momentum(3.0, 4.0), 5.0);
        assert_relative_eq!(azimuth(3.0, 4.0), 4.0_f64.atan2(3.0));
        assert_relative_eq!(azimuth(-1.0, 0.0), PI);
        assert_relative_eq!(azimuth(0.0, -1.0), -PI / 2.0);
    }

    #[test]
    fn test_phi_negative_zero_py() {
        assert_eq!(azimuth(-1.0, -0.0), PI);
        assert_eq!(azimuth(-1.0, 0.0), PI);
        assert_eq!(FourMomentum::new(-2.0, -0.0, 1.0, 3.0).phi(), PI);
    }

    #[test]
    fn test_eta_formula() {
        let (pz, e) = (3.0, 5.0);
        assert_relative_eq!(pseudorapidity(pz, e), 0.5 * (8.0_f64 / 2.0).ln());
        assert_relative_eq!(pseudorapidity(-pz, e), -0.5 * (8.0_f64 / 2.0).ln());
        assert_eq!(pseudorapidity(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_eta_degenerate_is_zero() {
        // E == |pz|: massless along the beam axis
        assert_eq!(pseudorapidity(7.5, 7.5), 0.0);
        assert_eq!(pseudorapidity(-7.5, 7.5), 0.0);
        assert_eq!(pseudorapidity(0.0, 0.0), 0.0);

        // not degenerate: finite, large
        let eta = pseudorapidity(7.5, 7.5 + 1e-9);
        assert!(eta.is_finite() && eta > 5.0);
    }

    #[test]
    fn test_delta_phi_wraps() {
        assert_relative_eq!(delta_phi(3.0, -3.0), 6.0 - 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(delta_phi(-3.0, 3.0), 2.0 * PI - 6.0, epsilon = 1e-12);
        assert_relative_eq!(delta_phi(0.5, 0.25), 0.25);
        assert_relative_eq!(delta_r(1.0, 0.0, 4.0, 0.0), 3.0);
    }

    #[test]
    fn test_invariant_mass() {
        // two back-to-back 50 GeV photons
        let a = FourMomentum::new(50.0, 0.0, 0.0, 50.0);
        let b = FourMomentum::new(-50.0, 0.0, 0.0, 50.0);
        assert_relative_eq!((a + b).mass(), 100.0);
        assert_relative_eq!(a.mass(), 0.0);
        assert_relative_eq!(FourMomentum::new(3.0, 4.0, 0.0, 13.0).mass(), 12.0);
        assert_relative_eq!(FourMomentum::new(3.0, 4.0, 0.0, 5.0).pt(), 5.0);
    }
}
