//! Seeds for reproducible window sampling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seed for a sampler's random generator.
///
/// Every sampler owns its own generator built from a `Seed`, so two
/// samplers constructed with the same seed draw the same windows.
///
/// # Example
///
/// ```rust
/// use recur_core::Seed;
/// use rand::Rng;
///
/// let mut a = Seed::new(7).to_rng();
/// let mut b = Seed::new(7).to_rng();
/// assert_eq!(a.gen::<u32>(), b.gen::<u32>());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(u64);

impl Seed {
    /// Wrap a raw seed value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Draw a fresh seed from the thread-local generator.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(rand::random())
    }

    /// The raw seed value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Build a ChaCha8 generator from this seed.
    #[must_use]
    pub fn to_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0)
    }

    /// Derive an independent seed keyed by a name.
    ///
    /// Derivation goes through the standard library's `DefaultHasher`,
    /// whose algorithm is not fixed across Rust releases. Derived values
    /// are stable within one toolchain but may change after an upgrade;
    /// store the derived `Seed` itself when it must be reproduced later.
    ///
    /// ```rust
    /// use recur_core::Seed;
    ///
    /// let master = Seed::new(42);
    /// assert_ne!(master.derive("train"), master.derive("valid"));
    /// assert_eq!(master.derive("train"), master.derive("train"));
    /// ```
    #[must_use]
    pub fn derive(&self, key: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        key.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Seed for the `index`-th parallel worker.
    ///
    /// Workers that each build their own sampler should use distinct
    /// worker seeds so their window streams do not coincide. Subject to
    /// the same toolchain caveat as [`derive`](Self::derive).
    #[must_use]
    pub fn for_worker(&self, index: usize) -> Self {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        "worker".hash(&mut hasher);
        index.hash(&mut hasher);
        Self(hasher.finish())
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Seed> for u64 {
    fn from(seed: Seed) -> Self {
        seed.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seed_reproducibility() {
        let mut rng1 = Seed::new(42).to_rng();
        let mut rng2 = Seed::new(42).to_rng();

        for _ in 0..100 {
            let a: usize = rng1.gen_range(0..1000);
            let b: usize = rng2.gen_range(0..1000);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_seed_derive() {
        let master = Seed::new(42);
        assert_ne!(master.derive("a").value(), master.derive("b").value());
        assert_eq!(master.derive("a").value(), master.derive("a").value());
    }

    #[test]
    fn test_derived_seed_can_be_stored() {
        let worker = Seed::new(42).for_worker(3);
        let json = serde_json::to_string(&worker).unwrap();
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, worker);
        assert_eq!(restored.to_rng().gen::<u64>(), worker.to_rng().gen::<u64>());
    }

    #[test]
    fn test_worker_seeds_differ() {
        let master = Seed::new(3);
        let seeds: Vec<u64> = (0..8).map(|i| master.for_worker(i).value()).collect();
        for i in 0..seeds.len() {
            for j in (i + 1)..seeds.len() {
                assert_ne!(seeds[i], seeds[j]);
            }
        }
        assert_eq!(master.for_worker(2), master.for_worker(2));
    }

    #[test]
    fn test_seed_conversions() {
        let seed: Seed = 99u64.into();
        assert_eq!(u64::from(seed), 99);
        assert_eq!(Seed::default().value(), 0);
    }

    #[test]
    fn test_seed_serialization() {
        let seed = Seed::new(12345);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "12345");
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(seed, restored);
    }
}
