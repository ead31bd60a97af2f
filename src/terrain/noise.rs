//! 1D gradient noise over a seeded permutation table.

use crate::math::{Rng, Seed};

/// 256 shuffled byte values duplicated to 512 entries, so `perm[i + 1]`
/// never needs a wrap check.
#[derive(Clone)]
pub struct Permutation {
    table: [u8; 512],
}

impl std::fmt::Debug for Permutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permutation")
            .field("head", &&self.table[..8])
            .finish()
    }
}

impl Permutation {
    /// Fisher-Yates shuffle of 0..=255 from a seeded stream.
    pub fn new(seed: impl Into<Seed>) -> Self {
        let mut rng = Rng::new(seed);
        let mut base: [u8; 256] = std::array::from_fn(|i| i as u8);
        rng.shuffle(&mut base);

        let mut table = [0u8; 512];
        table[..256].copy_from_slice(&base);
        table[256..].copy_from_slice(&base);
        Self { table }
    }

    pub fn table(&self) -> &[u8; 512] {
        &self.table
    }

    #[inline]
    fn at(&self, i: usize) -> u8 {
        self.table[i]
    }
}

/// Quintic fade `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn grad(hash: u8, d: f64) -> f64 {
    if hash & 1 == 0 { d } else { -d }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Classic 1D Perlin noise. Zero at every integer lattice point.
pub fn gradient_1d(perm: &Permutation, x: f64) -> f64 {
    let floor = x.floor();
    let xi = ((floor as i64) & 255) as usize;
    let xf = x - floor;
    let t = fade(xf);

    let g0 = grad(perm.at(xi), xf);
    let g1 = grad(perm.at(xi + 1), xf - 1.0);
    lerp(g0, g1, t)
}

/// Sum of `octaves` rounds of [`gradient_1d`], amplitude halving and
/// frequency doubling each round, normalized by the total amplitude.
pub fn octave_noise(perm: &Permutation, x: f64, octaves: u32) -> f64 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut total = 0.0;

    for _ in 0..octaves {
        sum += amplitude * gradient_1d(perm, x * frequency);
        total += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    if total > 0.0 { sum / total } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_is_duplicated_shuffle() {
        let perm = Permutation::new(42);
        let table = perm.table();
        assert_eq!(&table[..256], &table[256..]);

        let mut seen = [false; 256];
        for &v in &table[..256] {
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_permutation_deterministic() {
        assert_eq!(Permutation::new(7).table(), Permutation::new(7).table());
        assert_ne!(Permutation::new(7).table(), Permutation::new(8).table());
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gradient_zero_at_lattice() {
        let perm = Permutation::new(3);
        for i in -20..20 {
            assert_eq!(gradient_1d(&perm, i as f64), 0.0);
        }
    }

    #[test]
    fn test_gradient_range() {
        let perm = Permutation::new(11);
        let mut x = -300.0;
        while x < 300.0 {
            let v = gradient_1d(&perm, x);
            assert!((-1.0..=1.0).contains(&v), "gradient {} at {}", v, x);
            x += 0.173;
        }
    }

    #[test]
    fn test_gradient_continuous() {
        let perm = Permutation::new(11);
        let mut x = -10.0;
        while x < 10.0 {
            let a = gradient_1d(&perm, x);
            let b = gradient_1d(&perm, x + 1e-6);
            assert!((a - b).abs() < 1e-4);
            x += 0.01;
        }
    }

    #[test]
    fn test_octave_noise_range_and_determinism() {
        let perm = Permutation::new(42);
        let mut x = -50.0;
        while x < 50.0 {
            let v = octave_noise(&perm, x, 4);
            assert!((-1.0..=1.0).contains(&v));
            assert_eq!(v, octave_noise(&perm, x, 4));
            x += 0.37;
        }
    }

    #[test]
    fn test_octave_noise_zero_octaves() {
        let perm = Permutation::new(1);
        assert_eq!(octave_noise(&perm, 0.3, 0), 0.0);
    }

    #[test]
    fn test_noise_varies() {
        let perm = Permutation::new(42);
        let values: Vec<f64> = (0..50).map(|i| octave_noise(&perm, i as f64 * 0.31 + 0.1, 3)).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.05);
    }
}
