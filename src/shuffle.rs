use std::time::{SystemTime, UNIX_EPOCH};

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const MODULUS_MASK: u64 = 0x7fff_ffff;

/// Linear congruential generator used to reorder ports.
///
/// `next()` advances the state as `state = (state * 1103515245 + 12345) mod 2^31`
/// and returns the new state, so every value is in `0..2^31`. Two generators
/// built from the same seed yield the same sequence.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed from the current wall clock in nanoseconds.
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(nanos)
    }

    pub fn next(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MODULUS_MASK;
        self.state as u32
    }

    /// Uniform-ish index in `0..bound`. `bound` must be non-zero.
    pub fn next_index(&mut self, bound: usize) -> usize {
        self.next() as usize % bound
    }
}

/// Fisher-Yates shuffle driven by `rng`, in place.
pub fn shuffle<T>(items: &mut [T], rng: &mut Lcg) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_matches_recurrence() {
        let mut rng = Lcg::new(1);
        assert_eq!(rng.next(), 1_103_527_590);
        let expected = (1_103_527_590u64 * MULTIPLIER + INCREMENT) & MODULUS_MASK;
        assert_eq!(rng.next() as u64, expected);
    }

    #[test]
    fn values_stay_below_2_pow_31() {
        let mut rng = Lcg::new(u64::MAX);
        for _ in 0..1000 {
            assert!(rng.next() < 1 << 31);
        }
    }

    #[test]
    fn same_seed_same_order() {
        let mut a: Vec<u16> = (1..=500).collect();
        let mut b = a.clone();
        shuffle(&mut a, &mut Lcg::new(42));
        shuffle(&mut b, &mut Lcg::new(42));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let original: Vec<u16> = (1..=1024).collect();
        let mut ports = original.clone();
        shuffle(&mut ports, &mut Lcg::new(7));
        assert_ne!(ports, original);
        ports.sort_unstable();
        assert_eq!(ports, original);
    }

    #[test]
    fn tiny_inputs_untouched() {
        let mut empty: Vec<u16> = Vec::new();
        shuffle(&mut empty, &mut Lcg::new(3));
        assert!(empty.is_empty());
        let mut one = vec![80u16];
        shuffle(&mut one, &mut Lcg::new(3));
        assert_eq!(one, vec![80]);
    }
}
