// Seedable pseudo-random number generator for map generation.
//
// xoshiro256++ (Blackman & Vigna, 2019) with its state expanded from a single
// `u64` by SplitMix64. Written out by hand so the output stream is fixed
// across platforms and dependency upgrades: a map saved under seed N must
// regenerate bit-for-bit under seed N.
//
// `shoreline_map` threads a `MapRng` through the solver explicitly. Nothing
// in the workspace reads randomness from ambient or global state.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state. Float helpers derive their value from
// the integer stream only.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ generator. Cheap to clone; cloning forks the stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRng {
    s: [u64; 4],
}

impl MapRng {
    /// Create a generator from a `u64` seed.
    ///
    /// Equal seeds give equal sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Next raw `u64`.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1), built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[low, high)` without modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        // Reject the short tail so every residue is equally likely.
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform index in `[0, len)`. Panics if `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        self.range_u64(0, len as u64) as usize
    }

    /// `true` with probability `p`. `p <= 0.0` is never true, `p >= 1.0`
    /// always is.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// SplitMix64 step, used only to expand the seed.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = MapRng::new(7);
        let mut b = MapRng::new(7);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn neighbouring_seeds_diverge() {
        let mut a = MapRng::new(7);
        let mut b = MapRng::new(8);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f64_stays_in_unit_interval() {
        let mut rng = MapRng::new(2024);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn index_covers_every_slot() {
        let mut rng = MapRng::new(3);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            let i = rng.index(5);
            assert!(i < 5);
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s), "every index should appear: {seen:?}");
    }

    #[test]
    fn range_u64_respects_bounds() {
        let mut rng = MapRng::new(99);
        for _ in 0..10_000 {
            let v = rng.range_u64(10, 17);
            assert!((10..17).contains(&v), "range_u64 out of range: {v}");
        }
    }

    #[test]
    fn random_bool_extremes_are_fixed() {
        let mut rng = MapRng::new(1);
        for _ in 0..200 {
            assert!(!rng.random_bool(0.0));
            assert!(rng.random_bool(1.0));
        }
    }

    #[test]
    fn random_bool_half_is_roughly_even() {
        let mut rng = MapRng::new(42);
        let hits = (0..10_000).filter(|_| rng.random_bool(0.5)).count();
        let pct = hits as f64 / 10_000.0;
        assert!((0.45..0.55).contains(&pct), "expected ~50%, got {pct}");
    }

    #[test]
    fn state_survives_json() {
        let mut rng = MapRng::new(42);
        for _ in 0..37 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: MapRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
