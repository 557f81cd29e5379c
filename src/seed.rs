//! Seed derivation for reproducible sweeps.

use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Derives the seed for temperature point `index` of a sweep.
///
/// The seed is SipHash-1-3 (zero keys) of `(master_seed, index)`, so every
/// point gets an independent stream that depends only on its position in the
/// sweep and not on which worker ends up running it.
pub fn derive_point_seed(master_seed: u64, index: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(index);
    hasher.finish()
}
