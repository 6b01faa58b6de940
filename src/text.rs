//! Font lookup and glyph painting.
//!
//! Glyph outlines come from `ttf-parser` and are converted into tiny-skia
//! paths in font design units (y-up); placement applies a y-flipping
//! scale transform at draw time. The face is found through `fontdb` with
//! a typewriter/monospace preference to match the stamped look. When no
//! usable face exists the painter degrades to filled box glyphs so stamp
//! layouts still produce ink instead of failing.

use crate::canvas::Canvas;
use crate::color::Rgba;
use crate::jitter::JitterSource;
use fontdb::{Database, Family, Query};
use std::sync::Arc;
use tiny_skia::{Path, PathBuilder, Rect, Transform};

/// Full spread of per-line position jitter, logical units.
pub const TEXT_OFFSET_JITTER: f32 = 1.0;
/// Full spread of per-line rotation jitter, radians.
pub const TEXT_ROTATION_JITTER: f32 = 0.02;

/// Horizontal alignment of a drawn line relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
  Left,
  Center,
}

/// Vertical anchoring of a drawn line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
  /// Anchor is the top of the glyph box.
  Top,
  /// Anchor is the optical middle of the line.
  Middle,
}

/// Owned font face bytes plus the face index within the file.
///
/// Holds no parsed state; `ttf_parser::Face` borrows the bytes per draw
/// call, which is cheap at stamp text volumes.
pub struct FontStore {
  data: Option<Arc<Vec<u8>>>,
  index: u32,
}

impl FontStore {
  /// Finds a system face, preferring typewriter-style monospace families.
  ///
  /// Never fails: a machine without usable fonts gets the box-glyph
  /// fallback.
  pub fn system() -> Self {
    let mut db = Database::new();
    db.load_system_fonts();
    let families = [
      Family::Name("Courier New"),
      Family::Name("Courier Prime"),
      Family::Monospace,
      Family::Serif,
      Family::SansSerif,
    ];
    let query = Query {
      families: &families,
      ..Query::default()
    };
    let loaded = db
      .query(&query)
      .and_then(|id| db.with_face_data(id, |bytes, index| (bytes.to_vec(), index)));
    match loaded {
      Some((data, index)) => Self {
        data: Some(Arc::new(data)),
        index,
      },
      None => {
        log::debug!("no usable system font found; text falls back to box glyphs");
        Self {
          data: None,
          index: 0,
        }
      }
    }
  }

  /// Uses the provided font file bytes instead of querying the system.
  pub fn from_font_data(data: Vec<u8>, index: u32) -> Self {
    Self {
      data: Some(Arc::new(data)),
      index,
    }
  }

  /// A store with no face at all; every glyph becomes a box glyph.
  pub fn empty() -> Self {
    Self {
      data: None,
      index: 0,
    }
  }

  /// True when real glyph outlines are available.
  pub fn has_outlines(&self) -> bool {
    self.face().is_some()
  }

  fn face(&self) -> Option<ttf_parser::Face<'_>> {
    let data = self.data.as_ref()?;
    ttf_parser::Face::parse(data, self.index).ok()
  }

  /// Advance width of one character at `font_size`, logical units.
  pub fn char_advance(&self, ch: char, font_size: f32) -> f32 {
    if let Some(face) = self.face() {
      let upem = face.units_per_em() as f32;
      if let Some(advance) = face
        .glyph_index(ch)
        .and_then(|gid| face.glyph_hor_advance(gid))
      {
        return advance as f32 / upem * font_size;
      }
    }
    // Typewriter-ish default for missing glyphs and the box fallback.
    font_size * 0.6
  }

  /// Total advance width of `text` at `font_size`, logical units.
  pub fn measure(&self, text: &str, font_size: f32) -> f32 {
    text
      .chars()
      .map(|ch| self.char_advance(ch, font_size))
      .sum()
  }

  fn ascent(&self, font_size: f32) -> f32 {
    match self.face() {
      Some(face) => face.ascender() as f32 / face.units_per_em() as f32 * font_size,
      None => font_size * 0.8,
    }
  }

  /// Distance from the optical middle of a line down to its baseline.
  pub(crate) fn middle_to_baseline(&self, font_size: f32) -> f32 {
    let cap = self.face().and_then(|face| {
      let upem = face.units_per_em() as f32;
      face.capital_height().map(|h| h as f32 / upem * font_size)
    });
    cap.unwrap_or(font_size * 0.7) / 2.0
  }

  /// Draws one character with its baseline origin at `(0, 0)` of `local`.
  ///
  /// `local` already carries placement and rotation; this only appends the
  /// design-unit scale (with y flip) or the fallback box.
  pub fn draw_char(&self, canvas: &mut Canvas, ch: char, font_size: f32, color: Rgba, local: Transform) {
    if ch.is_whitespace() {
      return;
    }
    if let Some(face) = self.face() {
      if let Some(path) = face.glyph_index(ch).and_then(|gid| build_glyph_path(&face, gid)) {
        let scale = font_size / face.units_per_em() as f32;
        let glyph = local.pre_concat(Transform::from_row(scale, 0.0, 0.0, -scale, 0.0, 0.0));
        canvas.fill_path_with(&path, color, glyph);
        return;
      }
    }
    // Box glyph: a filled block roughly the shape of a typewriter slug.
    let advance = self.char_advance(ch, font_size);
    if let Some(rect) = Rect::from_xywh(
      advance * 0.08,
      -font_size * 0.72,
      advance * 0.84,
      font_size * 0.72,
    ) {
      let path = PathBuilder::from_rect(rect);
      canvas.fill_path_with(&path, color, local);
    }
  }

  /// Draws a line of text with hand-stamped imperfections.
  ///
  /// The whole line is nudged by up to ±0.5 logical units, rotated by up
  /// to ±0.01 rad, and drawn at 80-100% ink opacity, mirroring how a
  /// physical stamp never strikes twice the same way.
  #[allow(clippy::too_many_arguments)]
  pub fn draw_line(
    &self,
    canvas: &mut Canvas,
    text: &str,
    x: f32,
    y: f32,
    font_size: f32,
    color: Rgba,
    align: TextAlign,
    anchor: TextAnchor,
    jitter: &mut dyn JitterSource,
  ) {
    let dx = jitter.spread(TEXT_OFFSET_JITTER);
    let dy = jitter.spread(TEXT_OFFSET_JITTER);
    let rotation = jitter.spread(TEXT_ROTATION_JITTER);
    let ink = color.with_opacity(0.8 + jitter.unit() * 0.2);

    let line = Transform::from_translate(x + dx, y + dy)
      .pre_concat(Transform::from_rotate(rotation.to_degrees()));

    let start_x = match align {
      TextAlign::Left => 0.0,
      TextAlign::Center => -self.measure(text, font_size) / 2.0,
    };
    let baseline_y = match anchor {
      TextAnchor::Top => self.ascent(font_size),
      TextAnchor::Middle => self.middle_to_baseline(font_size),
    };

    let mut pen_x = start_x;
    for ch in text.chars() {
      let local = line.pre_concat(Transform::from_translate(pen_x, baseline_y));
      self.draw_char(canvas, ch, font_size, ink, local);
      pen_x += self.char_advance(ch, font_size);
    }
  }
}

struct GlyphPathBuilder {
  builder: PathBuilder,
}

impl ttf_parser::OutlineBuilder for GlyphPathBuilder {
  fn move_to(&mut self, x: f32, y: f32) {
    self.builder.move_to(x, y);
  }

  fn line_to(&mut self, x: f32, y: f32) {
    self.builder.line_to(x, y);
  }

  fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
    self.builder.quad_to(x1, y1, x, y);
  }

  fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
    self.builder.cubic_to(x1, y1, x2, y2, x, y);
  }

  fn close(&mut self) {
    self.builder.close();
  }
}

/// Converts a glyph outline to a tiny-skia path in font design units.
fn build_glyph_path(face: &ttf_parser::Face<'_>, glyph_id: ttf_parser::GlyphId) -> Option<Path> {
  let mut builder = GlyphPathBuilder {
    builder: PathBuilder::new(),
  };
  face.outline_glyph(glyph_id, &mut builder)?;
  builder.builder.finish()
}
