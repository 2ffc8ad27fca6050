//! Window start strategies.
//!
//! A window sampler asks its [`OffsetSampler`] for one start offset per
//! batch slot. Training uses [`UniformOffsets`]; [`SequentialOffsets`]
//! walks the series deterministically, which is handy for evaluation.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use recur_core::Seed;

/// Produces window start offsets.
pub trait OffsetSampler: Send + std::fmt::Debug {
    /// Draw a start offset in `0..n_windows`.
    ///
    /// Callers guarantee `n_windows > 0`.
    fn draw(&mut self, n_windows: usize) -> usize;
}

/// Independent uniform draws, with replacement.
#[derive(Debug, Clone)]
pub struct UniformOffsets {
    rng: ChaCha8Rng,
}

impl UniformOffsets {
    /// Create a uniform offset sampler from a seed.
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self { rng: seed.to_rng() }
    }

    /// Create a uniform offset sampler with an entropy-based seed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl OffsetSampler for UniformOffsets {
    fn draw(&mut self, n_windows: usize) -> usize {
        self.rng.gen_range(0..n_windows)
    }
}

/// Deterministic sweep `0, stride, 2 * stride, ...`, wrapping at the end
/// of the series.
#[derive(Debug, Clone)]
pub struct SequentialOffsets {
    next: usize,
    stride: usize,
}

impl SequentialOffsets {
    /// Create a sweep with the given stride. A stride of 0 is treated as 1.
    #[must_use]
    pub fn new(stride: usize) -> Self {
        Self {
            next: 0,
            stride: stride.max(1),
        }
    }

    /// Restart the sweep at offset 0.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

impl Default for SequentialOffsets {
    fn default() -> Self {
        Self::new(1)
    }
}

impl OffsetSampler for SequentialOffsets {
    fn draw(&mut self, n_windows: usize) -> usize {
        let offset = self.next % n_windows;
        // both terms are below n_windows, so the sum cannot overflow
        self.next = offset + self.stride % n_windows;
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_offsets_in_range() {
        let mut sampler = UniformOffsets::new(Seed::new(42));
        for _ in 0..1000 {
            assert!(sampler.draw(7) < 7);
        }
    }

    #[test]
    fn test_uniform_offsets_determinism() {
        let mut a = UniformOffsets::new(Seed::new(42));
        let mut b = UniformOffsets::new(Seed::new(42));
        let xs: Vec<usize> = (0..50).map(|_| a.draw(100)).collect();
        let ys: Vec<usize> = (0..50).map(|_| b.draw(100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_uniform_offsets_cover_range() {
        let mut sampler = UniformOffsets::new(Seed::new(1));
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[sampler.draw(5)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_sequential_offsets_wrap() {
        let mut sampler = SequentialOffsets::new(3);
        let offsets: Vec<usize> = (0..5).map(|_| sampler.draw(7)).collect();
        assert_eq!(offsets, vec![0, 3, 6, 2, 5]);

        sampler.reset();
        assert_eq!(sampler.draw(7), 0);
    }

    #[test]
    fn test_sequential_huge_stride() {
        let mut sampler = SequentialOffsets::new(usize::MAX);
        let step = usize::MAX % 7;
        let offsets: Vec<usize> = (0..4).map(|_| sampler.draw(7)).collect();
        let expected: Vec<usize> = (0..4).map(|k| k * step % 7).collect();
        assert_eq!(offsets, expected);
    }

    #[test]
    fn test_sequential_zero_stride() {
        let mut sampler = SequentialOffsets::new(0);
        assert_eq!(sampler.draw(4), 0);
        assert_eq!(sampler.draw(4), 1);
    }
}
