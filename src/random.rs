//! Random source abstraction.
//!
//! The batch strategy draws one permutation per run and both strategies draw
//! weighted samples. Routing every draw through [`RandomSource`] lets tests
//! pin the sequence with a seed.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Source of uniform random numbers.
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// Uniform index in `[0, upper)`. `upper` must be positive.
    fn next_index(&self, upper: usize) -> usize;

    /// Uniformly random ordering of `0..n`.
    fn permutation(&self, n: usize) -> Vec<usize>;
}

/// [`RandomSource`] backed by [`StdRng`].
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Deterministic source.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Source seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Seeded when `seed` is set, OS-seeded otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_os(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }

    fn next_index(&self, upper: usize) -> usize {
        self.rng.lock().random_range(0..upper)
    }

    fn permutation(&self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut *self.rng.lock());
        order
    }
}

impl std::fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededRandom").finish_non_exhaustive()
    }
}

/// Reorders `items` by one draw of [`RandomSource::permutation`].
pub fn shuffle<T>(items: Vec<T>, rng: &dyn RandomSource) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    rng.permutation(slots.len())
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let a = SeededRandom::from_seed(7);
        let b = SeededRandom::from_seed(7);
        for _ in 0..20 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn test_next_f64_range() {
        let rng = SeededRandom::from_seed(1);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_permutation_covers_every_index() {
        let rng = SeededRandom::from_seed(3);
        let mut order = rng.permutation(50);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_permutation() {
        let a = SeededRandom::from_seed(11);
        let b = SeededRandom::from_seed(11);
        assert_eq!(a.permutation(20), b.permutation(20));
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let rng = SeededRandom::from_seed(3);
        let items: Vec<u32> = (0..50).collect();
        let mut shuffled = shuffle(items, &rng);
        assert_eq!(shuffled.len(), 50);
        shuffled.sort_unstable();
        assert_eq!(shuffled, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_trivial_inputs() {
        let rng = SeededRandom::from_seed(3);
        assert!(shuffle(Vec::<u32>::new(), &rng).is_empty());
        assert_eq!(shuffle(vec![9], &rng), vec![9]);
    }
}
