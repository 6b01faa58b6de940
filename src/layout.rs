//! Stamp layout engine.
//!
//! `StampRenderer` turns a [`StampConfig`] into a rendered surface:
//! it selects the archetype's canvas size, draws in logical coordinates
//! under the pre-applied oversampling transform, dispatches to the
//! per-archetype layout routine, and finishes with one ink/aging pass.
//! Every border stroke and text draw goes through the jittered helpers;
//! that imperfection is the visual contract of the engine, not a
//! cosmetic option.

use crate::canvas::Canvas;
use crate::color::Rgba;
use crate::config::{StampConfig, StampType, OVERSAMPLE};
use crate::error::Result;
use crate::ink::{apply_ink_effects, InkOptions};
use crate::jitter::{InkJitter, JitterSource};
use crate::primitives::{
  curved_oval_text, curved_text, imperfect_ring, rect_path, rounded_rect_path, star,
};
use crate::surface::{PixmapFactory, SurfaceFactory};
use crate::text::{FontStore, TextAlign, TextAnchor};
use std::f32::consts::PI;
use tiny_skia::Pixmap;

/// Left/top padding of the address archetype, logical units.
pub const ADDRESS_PADDING: f32 = 20.0;
/// Extra space between address baselines beyond the font size.
pub const ADDRESS_LINE_GAP: f32 = 8.0;
/// Extra space between stacked business lines.
pub const BUSINESS_LINE_GAP: f32 = 3.0;
/// Extra space between stacked logo lines.
pub const LOGO_LINE_GAP: f32 = 5.0;

/// Top anchor of each address line: fixed padding plus
/// `font_size + ADDRESS_LINE_GAP` per line.
pub fn address_line_tops(line_count: usize, font_size: f32) -> Vec<f32> {
  (0..line_count)
    .map(|i| ADDRESS_PADDING + i as f32 * (font_size + ADDRESS_LINE_GAP))
    .collect()
}

/// Vertical centers of a stack of `line_count` lines spaced by
/// `line_height`, centered on `center_y`.
pub fn stacked_line_centers(line_count: usize, center_y: f32, line_height: f32) -> Vec<f32> {
  let start = center_y - (line_count.saturating_sub(1) as f32 * line_height) / 2.0;
  (0..line_count).map(|i| start + i as f32 * line_height).collect()
}

/// Renders stamps from configurations.
///
/// Owns its surface factory and font store so the core has no ambient
/// dependencies; tests inject failing factories or empty font stores.
pub struct StampRenderer {
  factory: Box<dyn SurfaceFactory>,
  fonts: FontStore,
  ink: InkOptions,
}

impl Default for StampRenderer {
  fn default() -> Self {
    Self::new()
  }
}

impl StampRenderer {
  /// Renderer with the default pixmap factory and a system font.
  pub fn new() -> Self {
    Self::with_parts(Box::new(PixmapFactory), FontStore::system())
  }

  pub fn with_parts(factory: Box<dyn SurfaceFactory>, fonts: FontStore) -> Self {
    Self {
      factory,
      fonts,
      ink: InkOptions::default(),
    }
  }

  /// Overrides the ink/aging overlay counts.
  pub fn with_ink_options(mut self, ink: InkOptions) -> Self {
    self.ink = ink;
    self
  }

  /// Renders `config` to a finished stamp surface.
  ///
  /// The surface is `base size * OVERSAMPLE` pixels; a failure to acquire
  /// it aborts the generation (callers treat this as "generation failed").
  /// Missing text lines never fail: an entirely empty `stamp_text` falls
  /// back to the archetype's placeholder text and archetype-specific
  /// rules drop or substitute individual lines.
  pub fn render(&self, config: &StampConfig, jitter: &mut dyn JitterSource) -> Result<Pixmap> {
    let (base_w, base_h) = config.stamp_type.base_size();
    let pixmap = self
      .factory
      .create(base_w * OVERSAMPLE, base_h * OVERSAMPLE)?;
    let mut canvas = Canvas::oversampled(pixmap, OVERSAMPLE as f32);

    let text_source: &str = if config.lines().is_empty() {
      log::debug!(
        "empty stamp text for {}; using placeholder",
        config.stamp_type
      );
      config.stamp_type.placeholder_text()
    } else {
      &config.stamp_text
    };
    let lines: Vec<&str> = text_source
      .split('\n')
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .collect();

    let w = base_w as f32;
    let h = base_h as f32;
    match config.stamp_type {
      StampType::NotaryCircle => self.notary_circle(&mut canvas, w, h, &lines, config, jitter),
      StampType::BusinessRectangle => {
        self.business_rectangle(&mut canvas, w, h, &lines, config, jitter)
      }
      StampType::AddressRectangle => {
        self.address_rectangle(&mut canvas, w, h, &lines, config, jitter)
      }
      StampType::SignatureOval => self.signature_oval(&mut canvas, w, h, &lines, config, jitter),
      StampType::LogoSquare => self.logo_square(&mut canvas, w, h, &lines, config, jitter),
      StampType::PaidCircle => self.paid_circle(&mut canvas, w, h, &lines, config, jitter),
    }

    let mut pixmap = canvas.into_pixmap();
    apply_ink_effects(&mut pixmap, &self.ink, jitter);
    Ok(pixmap)
  }

  fn center_line(
    &self,
    canvas: &mut Canvas,
    text: &str,
    x: f32,
    y: f32,
    font_size: f32,
    jitter: &mut dyn JitterSource,
  ) {
    self.fonts.draw_line(
      canvas,
      text,
      x,
      y,
      font_size,
      Rgba::INK,
      TextAlign::Center,
      TextAnchor::Middle,
      jitter,
    );
  }

  /// Two concentric circle borders; name curved along the top inner arc,
  /// NOTARY/PUBLIC centered, the state curved along the bottom arc, a
  /// star flanked by tick marks under the center block.
  fn notary_circle(
    &self,
    canvas: &mut Canvas,
    w: f32,
    h: f32,
    lines: &[&str],
    config: &StampConfig,
    jitter: &mut dyn JitterSource,
  ) {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let fs = config.font_size;
    let outer = (w.min(h) - 10.0) / 2.0;
    let text_radius = outer - 17.0;

    imperfect_ring(
      canvas,
      cx,
      cy,
      outer,
      outer,
      config.border_width,
      1.0,
      Rgba::INK,
      jitter,
    );
    imperfect_ring(canvas, cx, cy, outer - 8.0, outer - 8.0, 1.0, 1.0, Rgba::INK, jitter);

    if lines.len() >= 2 {
      self.center_line(canvas, lines[1], cx, cy - fs / 2.0, fs, jitter);
      let third = lines.get(2).copied().unwrap_or("PUBLIC");
      self.center_line(canvas, third, cx, cy + fs / 2.0, fs, jitter);
    }

    if let Some(name) = lines.first() {
      curved_text(
        canvas,
        &self.fonts,
        name,
        cx,
        cy,
        text_radius,
        -PI / 2.0,
        true,
        fs,
        Rgba::INK,
        jitter,
      );
    }

    curved_text(
      canvas,
      &self.fonts,
      &config.state,
      cx,
      cy,
      text_radius,
      PI / 2.0,
      false,
      fs,
      Rgba::INK,
      jitter,
    );

    let marks_y = cy + fs;
    star(canvas, cx, marks_y, 3.0, Rgba::INK, jitter);
    for (from, to) in [(cx - 25.0, cx - 8.0), (cx + 8.0, cx + 25.0)] {
      let mut pb = tiny_skia::PathBuilder::new();
      pb.move_to(from, marks_y);
      pb.line_to(to, marks_y);
      if let Some(path) = pb.finish() {
        canvas.stroke_jittered(&path, Rgba::INK, 1.0, jitter);
      }
    }
  }

  /// Double rectangular border with all lines stacked around the center.
  fn business_rectangle(
    &self,
    canvas: &mut Canvas,
    w: f32,
    h: f32,
    lines: &[&str],
    config: &StampConfig,
    jitter: &mut dyn JitterSource,
  ) {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let fs = config.font_size;

    if let Some(outer) = rect_path(10.0, 10.0, w - 20.0, h - 20.0) {
      canvas.stroke_jittered(&outer, Rgba::INK, config.border_width, jitter);
    }
    if let Some(inner) = rect_path(15.0, 15.0, w - 30.0, h - 30.0) {
      canvas.stroke_jittered(&inner, Rgba::INK, 1.0, jitter);
    }

    let centers = stacked_line_centers(lines.len(), cy, fs + BUSINESS_LINE_GAP);
    for (line, y) in lines.iter().zip(centers) {
      self.center_line(canvas, line, cx, y, fs, jitter);
    }
  }

  /// Single border, left-aligned top-anchored lines with per-line jitter.
  fn address_rectangle(
    &self,
    canvas: &mut Canvas,
    w: f32,
    h: f32,
    lines: &[&str],
    config: &StampConfig,
    jitter: &mut dyn JitterSource,
  ) {
    if let Some(border) = rect_path(10.0, 10.0, w - 20.0, h - 20.0) {
      canvas.stroke_jittered(&border, Rgba::INK, config.border_width, jitter);
    }

    let tops = address_line_tops(lines.len(), config.font_size);
    for (line, top) in lines.iter().zip(tops) {
      let x = ADDRESS_PADDING + jitter.spread(2.0);
      let y = top + jitter.spread(2.0);
      self.fonts.draw_line(
        canvas,
        line,
        x,
        y,
        config.font_size,
        Rgba::INK,
        TextAlign::Left,
        TextAnchor::Top,
        jitter,
      );
    }
  }

  /// Double elliptical border; text layout depends on line count.
  fn signature_oval(
    &self,
    canvas: &mut Canvas,
    w: f32,
    h: f32,
    lines: &[&str],
    config: &StampConfig,
    jitter: &mut dyn JitterSource,
  ) {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let fs = config.font_size;
    let (rx, ry) = ((w - 20.0) / 2.0, (h - 20.0) / 2.0);

    imperfect_ring(canvas, cx, cy, rx, ry, config.border_width, 1.0, Rgba::INK, jitter);
    imperfect_ring(
      canvas,
      cx,
      cy,
      (w - 35.0) / 2.0,
      (h - 35.0) / 2.0,
      1.0,
      1.0,
      Rgba::INK,
      jitter,
    );

    let arc_rx = rx - 14.0;
    let arc_ry = ry - 8.0;
    match lines {
      [] => {}
      [only] => self.center_line(canvas, only, cx, cy, fs, jitter),
      [top, bottom] => {
        curved_oval_text(
          canvas, &self.fonts, top, cx, cy, arc_rx, arc_ry, -PI / 2.0, true, fs, Rgba::INK, jitter,
        );
        curved_oval_text(
          canvas, &self.fonts, bottom, cx, cy, arc_rx, arc_ry, PI / 2.0, false, fs, Rgba::INK,
          jitter,
        );
      }
      // Lines past the third are dropped.
      [top, middle, bottom, ..] => {
        curved_oval_text(
          canvas, &self.fonts, top, cx, cy, arc_rx, arc_ry, -PI / 2.0, true, fs, Rgba::INK, jitter,
        );
        self.center_line(canvas, middle, cx, cy, fs, jitter);
        curved_oval_text(
          canvas, &self.fonts, bottom, cx, cy, arc_rx, arc_ry, PI / 2.0, false, fs, Rgba::INK,
          jitter,
        );
      }
    }
  }

  /// Double rounded-rectangle border with a centered line stack.
  fn logo_square(
    &self,
    canvas: &mut Canvas,
    w: f32,
    h: f32,
    lines: &[&str],
    config: &StampConfig,
    jitter: &mut dyn JitterSource,
  ) {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let fs = config.font_size;

    if let Some(outer) = rounded_rect_path(10.0, 10.0, w - 20.0, h - 20.0, 8.0) {
      canvas.stroke_jittered(&outer, Rgba::INK, config.border_width, jitter);
    }
    if let Some(inner) = rounded_rect_path(15.0, 15.0, w - 30.0, h - 30.0, 5.0) {
      canvas.stroke_jittered(&inner, Rgba::INK, 1.0, jitter);
    }

    let centers = stacked_line_centers(lines.len(), cy, fs + LOGO_LINE_GAP);
    for (line, y) in lines.iter().zip(centers) {
      self.center_line(canvas, line, cx, y, fs, jitter);
    }
  }

  /// Three concentric circles, company lines curved along the upper and
  /// lower arcs, a large PAID through the middle, a DATE rule, and a fan
  /// of five stars across the upper interior.
  fn paid_circle(
    &self,
    canvas: &mut Canvas,
    w: f32,
    h: f32,
    lines: &[&str],
    config: &StampConfig,
    jitter: &mut dyn JitterSource,
  ) {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let fs = config.font_size;
    let outer = (w.min(h) - 10.0) / 2.0;

    imperfect_ring(canvas, cx, cy, outer, outer, config.border_width, 1.0, Rgba::INK, jitter);
    imperfect_ring(canvas, cx, cy, outer - 4.0, outer - 4.0, 1.0, 1.0, Rgba::INK, jitter);
    imperfect_ring(canvas, cx, cy, outer - 15.0, outer - 15.0, 1.0, 1.0, Rgba::INK, jitter);

    let arc_radius = outer - 10.0;
    if let Some(company) = lines.first() {
      curved_text(
        canvas, &self.fonts, company, cx, cy, arc_radius, -PI / 2.0, true, fs * 0.6, Rgba::INK,
        jitter,
      );
    }
    if let Some(department) = lines.get(1) {
      curved_text(
        canvas, &self.fonts, department, cx, cy, arc_radius, PI / 2.0, false, fs * 0.6, Rgba::INK,
        jitter,
      );
    }

    self.center_line(canvas, "PAID", cx, cy, fs * 1.6, jitter);

    let date_y = cy + 16.0;
    self.fonts.draw_line(
      canvas,
      "DATE:",
      cx - 26.0,
      date_y,
      fs * 0.5,
      Rgba::INK,
      TextAlign::Left,
      TextAnchor::Middle,
      jitter,
    );
    for (from, to) in [(cx - 6.0, cx + 6.0), (cx + 10.0, cx + 22.0)] {
      let mut pb = tiny_skia::PathBuilder::new();
      pb.move_to(from, date_y + 2.0);
      pb.line_to(to, date_y + 2.0);
      if let Some(path) = pb.finish() {
        canvas.stroke_jittered(&path, Rgba::INK, 0.8, jitter);
      }
    }

    let star_radius = 22.0;
    for i in -2i32..=2 {
      let angle = (-90.0 + i as f32 * 24.0).to_radians();
      star(
        canvas,
        cx + angle.cos() * star_radius,
        cy + angle.sin() * star_radius,
        2.5,
        Rgba::INK,
        jitter,
      );
    }
  }
}

/// Generates a stamp with the default renderer and entropy-seeded jitter.
///
/// Convenience entry point matching the one-shot flow of the stamp
/// creator page: configuration in, finished surface out.
pub fn generate_stamp(config: &StampConfig) -> Result<Pixmap> {
  StampRenderer::new().render(config, &mut InkJitter::from_entropy())
}
