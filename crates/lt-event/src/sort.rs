//! pT ordering of species buckets.

use lt_core::ParticleRecord;

/// Sort descending by transverse momentum.
///
/// The sort is stable: particles with equal pT keep their input order.
pub fn sort_by_pt(particles: &mut [ParticleRecord]) {
    particles.sort_by(|a, b| b.pt.total_cmp(&a.pt));
}

/// `true` if `particles` is ordered by non-increasing pT.
pub fn is_pt_ordered(particles: &[ParticleRecord]) -> bool {
    particles.windows(2).all(|w| w[0].pt >= w[1].pt)
}
