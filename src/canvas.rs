//! Canvas wrapper over a tiny-skia pixmap.
//!
//! Provides the small slice of 2D-context behavior the stamp layouts
//! need: a save/restore state stack carrying transform and opacity,
//! solid fills and strokes, and an explicit jittered-stroke wrapper.
//! Stroke-width jitter is applied here, at each stroke site, never by
//! mutating the context the way the original canvas code monkey-patched
//! `stroke`.

use crate::color::Rgba;
use crate::jitter::JitterSource;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, Path, Pixmap, Stroke, Transform};

/// Full spread of stroke-width jitter applied by [`Canvas::stroke_jittered`].
pub const STROKE_WIDTH_JITTER: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
struct CanvasState {
  transform: Transform,
  opacity: f32,
}

impl CanvasState {
  fn new() -> Self {
    Self {
      transform: Transform::identity(),
      opacity: 1.0,
    }
  }
}

/// Drawing surface plus graphics state.
///
/// Not thread-safe; each generation call owns its canvas exclusively.
pub struct Canvas {
  pixmap: Pixmap,
  state_stack: Vec<CanvasState>,
  state: CanvasState,
}

impl Canvas {
  /// Wraps an existing pixmap without clearing it.
  pub fn from_pixmap(pixmap: Pixmap) -> Self {
    Self {
      pixmap,
      state_stack: Vec::new(),
      state: CanvasState::new(),
    }
  }

  /// Wraps a pixmap with a uniform scale pre-applied, so all subsequent
  /// drawing happens in logical (unscaled) coordinates.
  pub fn oversampled(pixmap: Pixmap, scale: f32) -> Self {
    let mut canvas = Self::from_pixmap(pixmap);
    canvas.state.transform = Transform::from_scale(scale, scale);
    canvas
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.pixmap.width()
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.pixmap.height()
  }

  /// Consumes the canvas and returns the underlying pixmap.
  pub fn into_pixmap(self) -> Pixmap {
    self.pixmap
  }

  #[inline]
  pub fn pixmap_mut(&mut self) -> &mut Pixmap {
    &mut self.pixmap
  }

  /// Saves the current graphics state.
  pub fn save(&mut self) {
    self.state_stack.push(self.state);
  }

  /// Restores the most recently saved state; no-op on an empty stack.
  pub fn restore(&mut self) {
    if let Some(state) = self.state_stack.pop() {
      self.state = state;
    }
  }

  /// Sets the current opacity, multiplied into every subsequent draw.
  pub fn set_opacity(&mut self, opacity: f32) {
    self.state.opacity = opacity.clamp(0.0, 1.0);
  }

  #[inline]
  pub fn opacity(&self) -> f32 {
    self.state.opacity
  }

  /// Current logical-to-device transform.
  #[inline]
  pub fn transform(&self) -> Transform {
    self.state.transform
  }

  fn paint(&self, color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (color.a * self.state.opacity).clamp(0.0, 1.0);
    paint.set_color_rgba8(color.r, color.g, color.b, (alpha * 255.0).round() as u8);
    paint.anti_alias = true;
    paint
  }

  /// Fills `path` (logical coordinates) with `color`.
  pub fn fill_path(&mut self, path: &Path, color: Rgba) {
    self.fill_path_with(path, color, Transform::identity());
  }

  /// Fills `path` after applying `local` ahead of the canvas transform.
  ///
  /// Used by the text painter, whose glyph paths live in font units and
  /// carry their own placement/rotation transform.
  pub fn fill_path_with(&mut self, path: &Path, color: Rgba, local: Transform) {
    let paint = self.paint(color);
    let transform = self.state.transform.pre_concat(local);
    self
      .pixmap
      .fill_path(path, &paint, FillRule::Winding, transform, None);
  }

  /// Strokes `path` with round caps and joins at exactly `width`.
  pub fn stroke_path(&mut self, path: &Path, color: Rgba, width: f32) {
    let paint = self.paint(color);
    let stroke = Stroke {
      width: width.max(0.1),
      line_cap: LineCap::Round,
      line_join: LineJoin::Round,
      ..Stroke::default()
    };
    self
      .pixmap
      .stroke_path(path, &paint, &stroke, self.state.transform, None);
  }

  /// Strokes `path` with the line width perturbed by the jitter source.
  ///
  /// This is the imperfection contract of the engine: every border stroke
  /// passes through here so no two stamped lines carry identical weight.
  pub fn stroke_jittered(
    &mut self,
    path: &Path,
    color: Rgba,
    width: f32,
    jitter: &mut dyn JitterSource,
  ) {
    let jittered = width + jitter.spread(STROKE_WIDTH_JITTER);
    self.stroke_path(path, color, jittered);
  }
}
