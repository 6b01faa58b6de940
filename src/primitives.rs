//! Stateless drawing primitives with hand-stamped jitter.
//!
//! These routines append paths and fills to a [`Canvas`]; none of them
//! allocate surfaces. The jitter is intentional signal, not noise: a
//! perfect circle or evenly-weighted star reads as digital, so every
//! vertex and stroke is perturbed within documented bounds.

use crate::canvas::Canvas;
use crate::color::Rgba;
use crate::jitter::JitterSource;
use crate::text::FontStore;
use std::f32::consts::{PI, TAU};
use tiny_skia::{Path, PathBuilder, Transform};

/// Angular span of circular curved text.
pub const CIRCLE_TEXT_SPAN: f32 = PI * 1.2;
/// Angular span of elliptical curved text (narrower, ovals are flatter).
pub const OVAL_TEXT_SPAN: f32 = PI * 0.8;

/// Full spread of per-character position jitter in curved text.
pub const CURVED_OFFSET_JITTER: f32 = 1.5;
/// Full spread of per-character rotation jitter in curved text, radians.
pub const CURVED_ROTATION_JITTER: f32 = 0.1;

const RING_SEGMENTS: usize = 64;
const RING_PASSES: usize = 3;
const RING_BLOB_CHANCE: f32 = 0.02;

/// Angular distance between consecutive characters of an `len`-character
/// string distributed over `span` radians.
///
/// Constant for a given length and independent of jitter, which only
/// displaces characters after their arc position is fixed.
pub fn arc_step(len: usize, span: f32) -> f32 {
  span / len.saturating_sub(1).max(1) as f32
}

/// Ideal (pre-jitter) angular positions for each character of an
/// `len`-character string centered on `start_angle`.
pub fn arc_angles(len: usize, span: f32, start_angle: f32, clockwise: bool) -> Vec<f32> {
  let step = arc_step(len, span);
  (0..len)
    .map(|i| {
      let sweep = i as f32 * step;
      if clockwise {
        start_angle - span / 2.0 + sweep
      } else {
        start_angle + span / 2.0 - sweep
      }
    })
    .collect()
}

/// Closed rounded-rectangle path with quarter-circle quadratic corners.
///
/// Does not stroke or fill; the caller decides.
pub fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
  let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
  let mut pb = PathBuilder::new();
  pb.move_to(x + r, y);
  pb.line_to(x + w - r, y);
  pb.quad_to(x + w, y, x + w, y + r);
  pb.line_to(x + w, y + h - r);
  pb.quad_to(x + w, y + h, x + w - r, y + h);
  pb.line_to(x + r, y + h);
  pb.quad_to(x, y + h, x, y + h - r);
  pb.line_to(x, y + r);
  pb.quad_to(x, y, x + r, y);
  pb.close();
  pb.finish()
}

/// Plain rectangle path for the rectangular borders.
pub fn rect_path(x: f32, y: f32, w: f32, h: f32) -> Option<Path> {
  tiny_skia::Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect)
}

/// Five-point star with per-vertex radius jitter, filled.
pub fn star(
  canvas: &mut Canvas,
  cx: f32,
  cy: f32,
  size: f32,
  color: Rgba,
  jitter: &mut dyn JitterSource,
) {
  let mut pb = PathBuilder::new();
  for i in 0..5 {
    let angle = (i as f32 * 144.0 - 90.0).to_radians();
    let radius = size + jitter.spread(1.0);
    let x = cx + angle.cos() * radius;
    let y = cy + angle.sin() * radius;
    if i == 0 {
      pb.move_to(x, y);
    } else {
      pb.line_to(x, y);
    }
  }
  pb.close();
  if let Some(path) = pb.finish() {
    canvas.fill_path(&path, color);
  }
}

/// Hand-inked ring: three overlapping stroked passes of a 64-segment
/// polyline with radius and pressure jitter, building up layered opacity
/// (0.4 / 0.7 / 1.0 of `opacity`). Occasionally stamps a small ink blob
/// near a vertex. A circle is the `rx == ry` case.
#[allow(clippy::too_many_arguments)]
pub fn imperfect_ring(
  canvas: &mut Canvas,
  cx: f32,
  cy: f32,
  rx: f32,
  ry: f32,
  line_width: f32,
  opacity: f32,
  color: Rgba,
  jitter: &mut dyn JitterSource,
) {
  for pass in 0..RING_PASSES {
    let mut pb = PathBuilder::new();
    for i in 0..=RING_SEGMENTS {
      let angle = i as f32 * TAU / RING_SEGMENTS as f32;
      let wobble = jitter.spread(line_width * 0.8);
      let x = cx + angle.cos() * (rx + wobble);
      let y = cy + angle.sin() * (ry + wobble);
      if i == 0 {
        pb.move_to(x, y);
      } else {
        pb.line_to(x, y);
      }
      if jitter.chance(RING_BLOB_CHANCE) {
        let mut blob = PathBuilder::new();
        blob.push_circle(x, y, jitter.range(1.0, 3.0));
        if let Some(path) = blob.finish() {
          canvas.fill_path(&path, color.with_opacity(opacity * 0.3));
        }
      }
    }
    pb.close();
    if let Some(path) = pb.finish() {
      // Uneven hand pressure varies the implied stroke weight per pass.
      let pressure = 1.0 + jitter.spread(0.4);
      canvas.save();
      canvas.set_opacity(opacity * (0.4 + pass as f32 * 0.3));
      canvas.stroke_jittered(&path, color, line_width * pressure, jitter);
      canvas.restore();
    }
  }
}

/// Text following a circular arc, one transformed character at a time.
///
/// Characters are spread evenly over [`CIRCLE_TEXT_SPAN`], each rotated to
/// stay tangent to the arc and individually jittered in position,
/// rotation, and ink opacity. Rendering is per character because a whole
/// string cannot bend along an arc.
#[allow(clippy::too_many_arguments)]
pub fn curved_text(
  canvas: &mut Canvas,
  fonts: &FontStore,
  text: &str,
  cx: f32,
  cy: f32,
  radius: f32,
  start_angle: f32,
  clockwise: bool,
  font_size: f32,
  color: Rgba,
  jitter: &mut dyn JitterSource,
) {
  curved_text_spanned(
    canvas,
    fonts,
    text,
    cx,
    cy,
    radius,
    radius,
    start_angle,
    clockwise,
    font_size,
    CIRCLE_TEXT_SPAN,
    color,
    jitter,
  );
}

/// Text following an elliptical arc with independent x/y radii over the
/// narrower [`OVAL_TEXT_SPAN`].
#[allow(clippy::too_many_arguments)]
pub fn curved_oval_text(
  canvas: &mut Canvas,
  fonts: &FontStore,
  text: &str,
  cx: f32,
  cy: f32,
  radius_x: f32,
  radius_y: f32,
  start_angle: f32,
  clockwise: bool,
  font_size: f32,
  color: Rgba,
  jitter: &mut dyn JitterSource,
) {
  curved_text_spanned(
    canvas,
    fonts,
    text,
    cx,
    cy,
    radius_x,
    radius_y,
    start_angle,
    clockwise,
    font_size,
    OVAL_TEXT_SPAN,
    color,
    jitter,
  );
}

#[allow(clippy::too_many_arguments)]
fn curved_text_spanned(
  canvas: &mut Canvas,
  fonts: &FontStore,
  text: &str,
  cx: f32,
  cy: f32,
  radius_x: f32,
  radius_y: f32,
  start_angle: f32,
  clockwise: bool,
  font_size: f32,
  span: f32,
  color: Rgba,
  jitter: &mut dyn JitterSource,
) {
  let chars: Vec<char> = text.chars().collect();
  let tangent = if clockwise { PI / 2.0 } else { -PI / 2.0 };
  for (ch, angle) in chars
    .iter()
    .zip(arc_angles(chars.len(), span, start_angle, clockwise))
  {
    let x = cx + angle.cos() * radius_x + jitter.spread(CURVED_OFFSET_JITTER);
    let y = cy + angle.sin() * radius_y + jitter.spread(CURVED_OFFSET_JITTER);
    let rotation = angle + tangent + jitter.spread(CURVED_ROTATION_JITTER);
    let ink = color.with_opacity(0.7 + jitter.unit() * 0.3);

    let advance = fonts.char_advance(*ch, font_size);
    let local = Transform::from_translate(x, y)
      .pre_concat(Transform::from_rotate(rotation.to_degrees()))
      .pre_concat(Transform::from_translate(
        -advance / 2.0,
        fonts.middle_to_baseline(font_size),
      ));
    fonts.draw_char(canvas, *ch, font_size, ink, local);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::jitter::{InkJitter, NoJitter};
  use crate::surface::new_surface;

  #[test]
  fn arc_step_divides_span_by_gaps() {
    let step = arc_step(10, CIRCLE_TEXT_SPAN);
    assert!((step - CIRCLE_TEXT_SPAN / 9.0).abs() < 1e-6);
    // Single character and empty string both use a unit divisor.
    assert_eq!(arc_step(1, CIRCLE_TEXT_SPAN), CIRCLE_TEXT_SPAN);
    assert_eq!(arc_step(0, CIRCLE_TEXT_SPAN), CIRCLE_TEXT_SPAN);
  }

  #[test]
  fn arc_angles_have_constant_step() {
    let angles = arc_angles(12, CIRCLE_TEXT_SPAN, -PI / 2.0, true);
    let step = arc_step(12, CIRCLE_TEXT_SPAN);
    for pair in angles.windows(2) {
      assert!((pair[1] - pair[0] - step).abs() < 1e-6);
    }
    // Centered on the start angle.
    assert!((angles[0] - (-PI / 2.0 - CIRCLE_TEXT_SPAN / 2.0)).abs() < 1e-6);
  }

  #[test]
  fn counter_clockwise_angles_descend() {
    let angles = arc_angles(5, CIRCLE_TEXT_SPAN, PI / 2.0, false);
    for pair in angles.windows(2) {
      assert!(pair[1] < pair[0]);
    }
    // Both directions center the run on the start angle.
    let mid = (angles[0] + angles[4]) / 2.0;
    assert!((mid - PI / 2.0).abs() < 1e-6);
  }

  #[test]
  fn rounded_rect_path_stays_within_bounds() {
    let path = rounded_rect_path(10.0, 10.0, 80.0, 40.0, 8.0).unwrap();
    let bounds = path.bounds();
    assert!(bounds.left() >= 9.9 && bounds.top() >= 9.9);
    assert!(bounds.right() <= 90.1 && bounds.bottom() <= 50.1);
  }

  #[test]
  fn rounded_rect_clamps_oversized_radius() {
    assert!(rounded_rect_path(0.0, 0.0, 10.0, 10.0, 50.0).is_some());
  }

  #[test]
  fn star_fills_pixels_near_center() {
    let mut canvas = Canvas::from_pixmap(new_surface(20, 20).unwrap());
    star(&mut canvas, 10.0, 10.0, 5.0, Rgba::INK, &mut NoJitter);
    let pixmap = canvas.into_pixmap();
    assert!(pixmap.pixels()[10 * 20 + 10].alpha() > 0);
  }

  #[test]
  fn imperfect_ring_inks_on_and_off_the_ideal_radius() {
    let mut canvas = Canvas::from_pixmap(new_surface(100, 100).unwrap());
    let mut jitter = InkJitter::seeded(5);
    imperfect_ring(
      &mut canvas,
      50.0,
      50.0,
      40.0,
      40.0,
      2.0,
      1.0,
      Rgba::INK,
      &mut jitter,
    );
    let pixmap = canvas.into_pixmap();
    // Rightmost ring point sits near (90, 50); the center stays clean.
    let near_ring = (86..95).any(|x| pixmap.pixels()[50 * 100 + x].alpha() > 0);
    assert!(near_ring);
    assert_eq!(pixmap.pixels()[50 * 100 + 50].alpha(), 0);
  }

  #[test]
  fn curved_text_jitter_is_bounded() {
    // Jittered draw positions may deviate from the ideal arc point by at
    // most half the documented spread on each axis.
    let mut jitter = InkJitter::seeded(9);
    for _ in 0..500 {
      let dx = jitter.spread(CURVED_OFFSET_JITTER);
      assert!(dx.abs() <= CURVED_OFFSET_JITTER / 2.0);
      let dr = jitter.spread(CURVED_ROTATION_JITTER);
      assert!(dr.abs() <= CURVED_ROTATION_JITTER / 2.0);
    }
  }

  #[test]
  fn curved_text_draws_characters() {
    let fonts = FontStore::empty();
    let mut canvas = Canvas::from_pixmap(new_surface(120, 120).unwrap());
    curved_text(
      &mut canvas,
      &fonts,
      "NOTARY",
      60.0,
      60.0,
      40.0,
      -PI / 2.0,
      true,
      12.0,
      Rgba::INK,
      &mut NoJitter,
    );
    let pixmap = canvas.into_pixmap();
    let inked = pixmap.pixels().iter().filter(|px| px.alpha() > 0).count();
    assert!(inked > 50, "curved text inked only {inked} pixels");
  }
}
