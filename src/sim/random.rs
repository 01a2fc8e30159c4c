//! Random source helpers
//!
//! Thin wrappers over any `rand::Rng` so toy contexts can be driven by a
//! seeded `Pcg32` in the browser and in tests alike.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Uniform integer in `[min, max]` (inclusive). Returns `min` for an empty range.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// `true` with the given probability. Out-of-range chances saturate.
pub fn random_bool<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    if chance.is_nan() || chance <= 0.0 {
        false
    } else if chance >= 1.0 {
        true
    } else {
        rng.random_bool(chance)
    }
}

/// Uniform pick from a list
pub fn random_pick<'a, R: Rng + ?Sized, T>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Uniform integer in `[min, max]`, rounded to the nearest multiple of `multiple`
pub fn random_int_multiple<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32, multiple: i32) -> i32 {
    let value = random_int(rng, min, max);
    if multiple <= 0 {
        return value;
    }
    round_to_multiple(value, multiple)
}

/// Round to the nearest multiple (halves away from zero)
#[inline]
pub fn round_to_multiple(value: i32, multiple: i32) -> i32 {
    ((value as f64 / multiple as f64).round() as i32) * multiple
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded_rng;

    #[test]
    fn test_random_int_inclusive_bounds() {
        let mut rng = seeded_rng(7);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..500 {
            let v = random_int(&mut rng, -1, 1);
            assert!((-1..=1).contains(&v));
            seen_min |= v == -1;
            seen_max |= v == 1;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_random_int_empty_range() {
        let mut rng = seeded_rng(7);
        assert_eq!(random_int(&mut rng, 5, 5), 5);
        assert_eq!(random_int(&mut rng, 9, 3), 9);
    }

    #[test]
    fn test_random_bool_saturates() {
        let mut rng = seeded_rng(1);
        for _ in 0..50 {
            assert!(!random_bool(&mut rng, 0.0));
            assert!(random_bool(&mut rng, 1.0));
            assert!(!random_bool(&mut rng, f64::NAN));
            assert!(random_bool(&mut rng, 3.0));
        }
    }

    #[test]
    fn test_random_int_multiple() {
        let mut rng = seeded_rng(3);
        for _ in 0..200 {
            let v = random_int_multiple(&mut rng, 20, 380, 20);
            assert_eq!(v % 20, 0);
            assert!((20..=380).contains(&v));
        }
    }

    #[test]
    fn test_random_pick() {
        let mut rng = seeded_rng(11);
        let items = [-5, 0, 5];
        for _ in 0..50 {
            assert!(items.contains(random_pick(&mut rng, &items).unwrap()));
        }
        let empty: [i32; 0] = [];
        assert!(random_pick(&mut rng, &empty).is_none());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        for _ in 0..20 {
            assert_eq!(random_int(&mut a, 0, 1000), random_int(&mut b, 0, 1000));
        }
    }
}
