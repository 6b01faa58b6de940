//! Document stamping: decode an uploaded page and composite stamps on it.
//!
//! Pages come in as PNG/JPEG images or (feature-gated) PDF files, first
//! page only; DOCX uploads are rejected with a conversion hint. Placed
//! stamps are tracked as positions over the untouched page surface, so
//! moving or removing a stamp never degrades the page; compositing
//! happens fresh on every render.

use crate::config::{StampConfig, OVERSAMPLE};
use crate::error::{DocumentError, Result};
use crate::jitter::JitterSource;
use crate::layout::StampRenderer;
use crate::output::encode_png;
use crate::surface::new_surface;
use serde::{Deserialize, Serialize};
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

/// Placed stamps render at half their generated logical size.
pub const PLACEMENT_SCALE: f32 = 0.5;
/// Placed stamps render slightly translucent, like real ink over print.
pub const PLACEMENT_OPACITY: f32 = 0.8;
/// PDF pages rasterize at twice their nominal point size.
#[cfg(feature = "pdf")]
const PDF_ZOOM: f32 = 2.0;
/// Download filename for an exported stamped page.
pub const EXPORT_FILENAME: &str = "stamped-document.png";

/// Container formats recognized in uploaded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
  Png,
  Jpeg,
  Pdf,
  Docx,
  Unknown,
}

/// Sniffs the upload's container from magic bytes, falling back to the
/// filename extension for zip-based formats.
pub fn detect_format(bytes: &[u8], name_hint: Option<&str>) -> DocumentKind {
  match bytes {
    [0x89, b'P', b'N', b'G', ..] => DocumentKind::Png,
    [0xff, 0xd8, 0xff, ..] => DocumentKind::Jpeg,
    [b'%', b'P', b'D', b'F', ..] => DocumentKind::Pdf,
    // DOCX is a zip container; anything zip-shaped from the upload form
    // is treated as one.
    [b'P', b'K', 0x03, 0x04, ..] => DocumentKind::Docx,
    _ => match name_hint.and_then(|n| n.rsplit('.').next()) {
      Some(ext) if ext.eq_ignore_ascii_case("docx") => DocumentKind::Docx,
      Some(ext) if ext.eq_ignore_ascii_case("pdf") => DocumentKind::Pdf,
      _ => DocumentKind::Unknown,
    },
  }
}

/// Decodes an uploaded document into a page surface.
///
/// Images decode directly. PDFs decode their first page when the `pdf`
/// feature is enabled; without it the error says so rather than
/// pretending the format is unknown. DOCX is never decoded.
pub fn decode_document(bytes: &[u8], name_hint: Option<&str>) -> Result<Pixmap> {
  match detect_format(bytes, name_hint) {
    DocumentKind::Png | DocumentKind::Jpeg => decode_image_page(bytes),
    DocumentKind::Pdf => decode_pdf_first_page(bytes),
    DocumentKind::Docx => Err(
      DocumentError::UnsupportedFormat {
        format: "DOCX".to_string(),
        hint: "export the document as PDF and upload that instead".to_string(),
      }
      .into(),
    ),
    DocumentKind::Unknown => Err(
      DocumentError::UnsupportedFormat {
        format: "unknown".to_string(),
        hint: "upload a PNG, JPEG or PDF document".to_string(),
      }
      .into(),
    ),
  }
}

fn decode_image_page(bytes: &[u8]) -> Result<Pixmap> {
  let image = image::load_from_memory(bytes)
    .map_err(|err| DocumentError::DecodeFailed {
      format: "image".to_string(),
      reason: err.to_string(),
    })?
    .to_rgba8();
  rgba_to_pixmap(image.width(), image.height(), image.as_raw())
}

fn rgba_to_pixmap(width: u32, height: u32, rgba: &[u8]) -> Result<Pixmap> {
  let mut pixmap = new_surface(width, height)?;
  for (px, chunk) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
    *px = tiny_skia::ColorU8::from_rgba(chunk[0], chunk[1], chunk[2], chunk[3]).premultiply();
  }
  Ok(pixmap)
}

#[cfg(feature = "pdf")]
fn decode_pdf_first_page(bytes: &[u8]) -> Result<Pixmap> {
  use pdfium_render::prelude::*;

  let bindings = Pdfium::bind_to_system_library().map_err(|err| DocumentError::PdfUnavailable {
    reason: format!("pdfium library not loadable: {err}"),
  })?;
  let pdfium = Pdfium::new(bindings);
  let document =
    pdfium
      .load_pdf_from_byte_slice(bytes, None)
      .map_err(|err| DocumentError::DecodeFailed {
        format: "PDF".to_string(),
        reason: err.to_string(),
      })?;

  let page = document
    .pages()
    .first()
    .map_err(|err| DocumentError::DecodeFailed {
      format: "PDF".to_string(),
      reason: format!("document has no pages: {err}"),
    })?;
  let config = PdfRenderConfig::new().scale_page_by_factor(PDF_ZOOM);
  let rendered = page
    .render_with_config(&config)
    .map_err(|err| DocumentError::DecodeFailed {
      format: "PDF".to_string(),
      reason: err.to_string(),
    })?
    .as_image()
    .to_rgba8();
  rgba_to_pixmap(rendered.width(), rendered.height(), rendered.as_raw())
}

#[cfg(not(feature = "pdf"))]
fn decode_pdf_first_page(_bytes: &[u8]) -> Result<Pixmap> {
  Err(
    DocumentError::PdfUnavailable {
      reason: "built without the `pdf` feature".to_string(),
    }
    .into(),
  )
}

/// One stamp placed on the document page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampPosition {
  pub id: u64,
  /// Center of the stamp in page pixels.
  pub x: f32,
  pub y: f32,
  /// Rotation about the center, degrees clockwise.
  pub rotation: f32,
  pub config: StampConfig,
}

impl StampPosition {
  /// Half extents of the stamp as displayed on the page.
  fn half_extents(&self) -> (f32, f32) {
    let (w, h) = self.config.stamp_type.base_size();
    (
      w as f32 * PLACEMENT_SCALE / 2.0,
      h as f32 * PLACEMENT_SCALE / 2.0,
    )
  }

  /// True when the page point `(x, y)` falls inside the displayed stamp.
  fn contains(&self, x: f32, y: f32) -> bool {
    // Undo the stamp's rotation, then box-test.
    let (dx, dy) = (x - self.x, y - self.y);
    let theta = -self.rotation.to_radians();
    let local_x = dx * theta.cos() - dy * theta.sin();
    let local_y = dx * theta.sin() + dy * theta.cos();
    let (hw, hh) = self.half_extents();
    local_x.abs() <= hw && local_y.abs() <= hh
  }
}

/// Composites stamps over a decoded document page.
///
/// The page surface is never mutated; [`DocumentStamper::render`]
/// re-composites from scratch so edits and removals are lossless.
pub struct DocumentStamper {
  page: Pixmap,
  positions: Vec<StampPosition>,
  renderer: StampRenderer,
  next_id: u64,
}

impl DocumentStamper {
  pub fn new(page: Pixmap) -> Self {
    Self::with_renderer(page, StampRenderer::new())
  }

  pub fn with_renderer(page: Pixmap, renderer: StampRenderer) -> Self {
    Self {
      page,
      positions: Vec::new(),
      renderer,
      next_id: 1,
    }
  }

  pub fn page_size(&self) -> (u32, u32) {
    (self.page.width(), self.page.height())
  }

  pub fn positions(&self) -> &[StampPosition] {
    &self.positions
  }

  /// Places a stamp centered at `(x, y)` and returns its id.
  pub fn place(&mut self, x: f32, y: f32, config: StampConfig) -> u64 {
    let id = self.next_id;
    self.next_id += 1;
    self.positions.push(StampPosition {
      id,
      x,
      y,
      rotation: 0.0,
      config,
    });
    id
  }

  /// Moves a placed stamp. Returns false if the id is unknown.
  pub fn move_stamp(&mut self, id: u64, x: f32, y: f32) -> bool {
    match self.position_mut(id) {
      Some(position) => {
        position.x = x;
        position.y = y;
        true
      }
      None => false,
    }
  }

  /// Sets a placed stamp's rotation in degrees. Returns false if the id
  /// is unknown.
  pub fn rotate_stamp(&mut self, id: u64, degrees: f32) -> bool {
    match self.position_mut(id) {
      Some(position) => {
        position.rotation = degrees;
        true
      }
      None => false,
    }
  }

  /// Removes a placed stamp, returning it if it existed.
  pub fn remove_stamp(&mut self, id: u64) -> Option<StampPosition> {
    let at = self.positions.iter().position(|p| p.id == id)?;
    Some(self.positions.remove(at))
  }

  /// Removes every placed stamp.
  pub fn clear(&mut self) {
    self.positions.clear();
  }

  /// Id of the topmost stamp under the page point `(x, y)`, if any.
  ///
  /// Later placements sit on top, so the search runs newest-first.
  pub fn stamp_at(&self, x: f32, y: f32) -> Option<u64> {
    self
      .positions
      .iter()
      .rev()
      .find(|p| p.contains(x, y))
      .map(|p| p.id)
  }

  fn position_mut(&mut self, id: u64) -> Option<&mut StampPosition> {
    self.positions.iter_mut().find(|p| p.id == id)
  }

  /// Renders the page with its stamps composited on top.
  ///
  /// Each stamp is generated fresh, then drawn centered on its position
  /// at [`PLACEMENT_SCALE`] of its logical size, rotated, at
  /// [`PLACEMENT_OPACITY`].
  ///
  /// Clones the page and regenerates every stamp, so call it once per
  /// edit and reuse the result, not once per displayed frame.
  pub fn render(&self, jitter: &mut dyn JitterSource) -> Result<Pixmap> {
    let mut out = self.page.clone();
    let paint = PixmapPaint {
      opacity: PLACEMENT_OPACITY,
      quality: FilterQuality::Bilinear,
      ..PixmapPaint::default()
    };
    for position in &self.positions {
      let stamp = self.renderer.render(&position.config, jitter)?;
      let scale = PLACEMENT_SCALE / OVERSAMPLE as f32;
      let transform = Transform::from_translate(position.x, position.y)
        .pre_concat(Transform::from_rotate(position.rotation))
        .pre_concat(Transform::from_scale(scale, scale))
        .pre_concat(Transform::from_translate(
          -(stamp.width() as f32) / 2.0,
          -(stamp.height() as f32) / 2.0,
        ));
      out.draw_pixmap(0, 0, stamp.as_ref(), &paint, transform, None);
    }
    Ok(out)
  }

  /// Renders the page and encodes it as PNG.
  pub fn export_png(&self, jitter: &mut dyn JitterSource) -> Result<Vec<u8>> {
    let rendered = self.render(jitter)?;
    encode_png(&rendered)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::StampType;
  use crate::jitter::NoJitter;

  fn blank_page(size: u32) -> Pixmap {
    let mut page = new_surface(size, size).unwrap();
    page.fill(tiny_skia::Color::WHITE);
    page
  }

  #[test]
  fn placement_ids_are_unique_and_editable() {
    let mut stamper = DocumentStamper::new(blank_page(200));
    let config = StampConfig::placeholder(StampType::LogoSquare);
    let a = stamper.place(50.0, 50.0, config.clone());
    let b = stamper.place(120.0, 80.0, config);
    assert_ne!(a, b);

    assert!(stamper.move_stamp(a, 10.0, 10.0));
    assert!(stamper.rotate_stamp(b, 15.0));
    assert!(!stamper.move_stamp(999, 0.0, 0.0));
    assert!(!stamper.rotate_stamp(999, 0.0));

    let removed = stamper.remove_stamp(a).unwrap();
    assert_eq!((removed.x, removed.y), (10.0, 10.0));
    assert!(stamper.remove_stamp(a).is_none());
    assert_eq!(stamper.positions().len(), 1);

    stamper.clear();
    assert!(stamper.positions().is_empty());
  }

  #[test]
  fn hit_test_finds_the_topmost_stamp() {
    let mut stamper = DocumentStamper::new(blank_page(200));
    let config = StampConfig::placeholder(StampType::LogoSquare);
    // Logo square displays as a 50x50 box.
    let below = stamper.place(100.0, 100.0, config.clone());
    let above = stamper.place(110.0, 100.0, config);

    assert_eq!(stamper.stamp_at(110.0, 100.0), Some(above));
    // Only the earlier stamp covers its far-left edge.
    assert_eq!(stamper.stamp_at(80.0, 100.0), Some(below));
    assert_eq!(stamper.stamp_at(5.0, 5.0), None);
  }

  #[test]
  fn hit_test_respects_rotation() {
    let mut stamper = DocumentStamper::new(blank_page(200));
    let config = StampConfig::placeholder(StampType::BusinessRectangle);
    // Displays as 80x30; the point 35 px above center is outside.
    let id = stamper.place(100.0, 100.0, config);
    assert_eq!(stamper.stamp_at(100.0, 65.0), None);
    // Rotated 90 degrees the long side is vertical and covers it.
    assert!(stamper.rotate_stamp(id, 90.0));
    assert_eq!(stamper.stamp_at(100.0, 65.0), Some(id));
  }

  #[test]
  fn magic_byte_detection_beats_extensions() {
    assert_eq!(
      detect_format(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a], Some("page.pdf")),
      DocumentKind::Png
    );
    assert_eq!(detect_format(b"%PDF-1.7", None), DocumentKind::Pdf);
    assert_eq!(
      detect_format(b"PK\x03\x04rest", Some("letter.docx")),
      DocumentKind::Docx
    );
    assert_eq!(detect_format(b"???", Some("letter.docx")), DocumentKind::Docx);
    assert_eq!(detect_format(b"???", Some("letter.txt")), DocumentKind::Unknown);
  }

  #[test]
  fn docx_uploads_are_rejected_with_a_hint() {
    let err = decode_document(b"PK\x03\x04", Some("letter.docx")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("DOCX"), "{message}");
    assert!(message.contains("PDF"), "{message}");
  }
}
