//! Ink/aging post-processor.
//!
//! Runs once per generation over the finished surface: a per-pixel pass
//! that unevens the ink density, then an overlay pass of sepia blots and
//! faint smudge streaks. Repeated application compounds the randomness
//! and is out of contract.

use crate::color::Rgba;
use crate::jitter::JitterSource;
use crate::surface::PixelBuffer;
use std::f32::consts::TAU;
use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Full spread of the per-channel color perturbation.
const CHANNEL_VARIATION: f32 = 30.0;
/// Probability of an ink fade at a pixel.
const FADE_CHANCE: f32 = 0.05;
/// Maximum alpha lost to a fade.
const FADE_DEPTH: f32 = 60.0;
/// Probability of a heavy ink spot at a pixel.
const SPOT_CHANCE: f32 = 0.01;
/// Alpha gained by a heavy spot.
const SPOT_WEIGHT: f32 = 40.0;

/// Overlay counts for the aging pass.
#[derive(Debug, Clone, Copy)]
pub struct InkOptions {
  /// Number of low-opacity sepia ink blots.
  pub blots: usize,
  /// Number of short smudge streaks.
  pub smudges: usize,
}

impl Default for InkOptions {
  fn default() -> Self {
    Self {
      blots: 200,
      smudges: 50,
    }
  }
}

/// Applies the full ink/aging treatment to `pixmap` in place.
pub fn apply_ink_effects(pixmap: &mut Pixmap, options: &InkOptions, jitter: &mut dyn JitterSource) {
  perturb_ink_density(pixmap, jitter);
  overlay_blots_and_smudges(pixmap, options, jitter);
}

/// Per-pixel pass: channel perturbation plus random fades and heavy spots.
///
/// Operates on straight-alpha bytes so the perturbation matches what the
/// ink actually looks like, not its premultiplied encoding.
fn perturb_ink_density(pixmap: &mut Pixmap, jitter: &mut dyn JitterSource) {
  let mut buffer = PixelBuffer::from_pixmap(pixmap);
  for chunk in buffer.data_mut().chunks_exact_mut(4) {
    let alpha = chunk[3];
    if alpha == 0 {
      continue;
    }
    let variation = jitter.spread(CHANNEL_VARIATION);
    for channel in chunk.iter_mut().take(3) {
      *channel = (*channel as f32 + variation).clamp(0.0, 255.0) as u8;
    }
    if jitter.chance(FADE_CHANCE) {
      chunk[3] = (alpha as f32 - jitter.unit() * FADE_DEPTH).max(0.0) as u8;
    }
    if jitter.chance(SPOT_CHANCE) {
      chunk[3] = (chunk[3] as f32 + SPOT_WEIGHT).min(255.0) as u8;
    }
  }
  if let Err(err) = buffer.write_back(pixmap) {
    // Extracted from this same pixmap, so this cannot mismatch; keep the
    // surface untouched if it somehow does.
    log::warn!("ink density pass skipped: {err}");
  }
}

/// Overlay pass in device coordinates: sepia blots and smudge streaks at
/// low global opacity across the full canvas.
fn overlay_blots_and_smudges(pixmap: &mut Pixmap, options: &InkOptions, jitter: &mut dyn JitterSource) {
  let w = pixmap.width() as f32;
  let h = pixmap.height() as f32;

  for _ in 0..options.blots {
    let x = jitter.unit() * w;
    let y = jitter.unit() * h;
    let radius = jitter.unit() * 4.0 + 1.0;
    let mut pb = PathBuilder::new();
    pb.push_circle(x, y, radius);
    if let Some(path) = pb.finish() {
      let paint = sepia_paint(jitter.unit() * 0.15);
      pixmap.fill_path(
        &path,
        &paint,
        tiny_skia::FillRule::Winding,
        Transform::identity(),
        None,
      );
    }
  }

  for _ in 0..options.smudges {
    let x = jitter.unit() * w;
    let y = jitter.unit() * h;
    let length = jitter.unit() * 20.0 + 5.0;
    let angle = jitter.unit() * TAU;
    let mut pb = PathBuilder::new();
    pb.move_to(x, y);
    pb.line_to(x + angle.cos() * length, y + angle.sin() * length);
    if let Some(path) = pb.finish() {
      let paint = sepia_paint(jitter.unit() * 0.1);
      let stroke = Stroke {
        width: jitter.unit() * 2.0 + 0.5,
        line_cap: LineCap::Round,
        ..Stroke::default()
      };
      pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
  }
}

fn sepia_paint(opacity: f32) -> Paint<'static> {
  let sepia = Rgba::SEPIA.with_opacity(opacity);
  let mut paint = Paint::default();
  paint.set_color_rgba8(sepia.r, sepia.g, sepia.b, sepia.alpha_u8());
  paint.anti_alias = true;
  paint
}
