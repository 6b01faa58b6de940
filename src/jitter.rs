//! Injectable jitter source for hand-stamped imperfections.
//!
//! Every randomized perturbation in the drawing code (stroke width, glyph
//! position and rotation, ink opacity, blob placement) pulls from a
//! `JitterSource` passed down by the caller instead of a global RNG.
//! Tests substitute [`NoJitter`] or a seeded [`InkJitter`] to make
//! assertions tractable; production callers use entropy-seeded jitter so
//! every stamp comes out slightly different.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of bounded random perturbations.
pub trait JitterSource {
  /// Uniform sample in `[0.0, 1.0)`.
  fn unit(&mut self) -> f32;

  /// Symmetric sample in `[-width / 2, width / 2)`.
  ///
  /// `width` is the full spread, matching the hand-stamped convention
  /// of `(random - 0.5) * width`.
  fn spread(&mut self, width: f32) -> f32 {
    (self.unit() - 0.5) * width
  }

  /// Uniform sample in `[lo, hi)`.
  fn range(&mut self, lo: f32, hi: f32) -> f32 {
    lo + self.unit() * (hi - lo)
  }

  /// True with probability `p`.
  fn chance(&mut self, p: f32) -> bool {
    self.unit() < p
  }
}

/// Entropy- or seed-backed jitter used for real rendering.
pub struct InkJitter {
  rng: SmallRng,
}

impl InkJitter {
  /// Jitter seeded from OS entropy; every stamp is unique.
  pub fn from_entropy() -> Self {
    Self {
      rng: SmallRng::from_entropy(),
    }
  }

  /// Deterministic jitter for reproducible output and tests.
  pub fn seeded(seed: u64) -> Self {
    Self {
      rng: SmallRng::seed_from_u64(seed),
    }
  }
}

impl JitterSource for InkJitter {
  fn unit(&mut self) -> f32 {
    self.rng.gen::<f32>()
  }
}

/// Zero-spread jitter: geometry lands exactly on the ideal positions.
///
/// `unit` returns 0.5 so `spread` is 0 and `chance` never fires, which
/// turns off fades, blobs, and smudges entirely.
pub struct NoJitter;

impl JitterSource for NoJitter {
  fn unit(&mut self) -> f32 {
    0.5
  }

  fn spread(&mut self, _width: f32) -> f32 {
    0.0
  }

  fn chance(&mut self, _p: f32) -> bool {
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn spread_stays_within_bounds() {
    let mut jitter = InkJitter::seeded(7);
    for _ in 0..1000 {
      let v = jitter.spread(1.5);
      assert!(v >= -0.75 && v < 0.75, "spread out of bounds: {v}");
    }
  }

  #[test]
  fn range_stays_within_bounds() {
    let mut jitter = InkJitter::seeded(11);
    for _ in 0..1000 {
      let v = jitter.range(0.5, 2.5);
      assert!((0.5..2.5).contains(&v));
    }
  }

  #[test]
  fn seeded_jitter_is_reproducible() {
    let mut a = InkJitter::seeded(42);
    let mut b = InkJitter::seeded(42);
    for _ in 0..64 {
      assert_eq!(a.unit(), b.unit());
    }
  }

  #[test]
  fn chance_frequency_is_statistically_plausible() {
    let mut jitter = InkJitter::seeded(3);
    let hits = (0..10_000).filter(|_| jitter.chance(0.05)).count();
    // 5% of 10k with generous slack.
    assert!((300..=700).contains(&hits), "unexpected hit count {hits}");
  }

  #[test]
  fn no_jitter_is_inert() {
    let mut jitter = NoJitter;
    assert_eq!(jitter.spread(10.0), 0.0);
    assert!(!jitter.chance(0.99));
    assert_eq!(jitter.range(2.0, 4.0), 3.0);
  }
}
