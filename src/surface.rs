//! Surface allocation and pixel-buffer extraction.
//!
//! Stamp rendering never touches an ambient canvas constructor: surfaces
//! are created through a [`SurfaceFactory`] owned by the renderer, so the
//! core stays free of globals and tests can inject allocation failures.
//! Allocation is guarded against zero sizes, overflow, and runaway byte
//! counts before handing the buffer to tiny-skia.

use crate::error::{FilterError, RenderError};
use tiny_skia::{ColorU8, IntSize, Pixmap};

const BYTES_PER_PIXEL: u64 = 4;
/// Upper bound on a single surface allocation.
pub(crate) const MAX_SURFACE_BYTES: u64 = 256 * 1024 * 1024;

fn guard_dimensions(width: u32, height: u32) -> Result<usize, RenderError> {
  if width == 0 || height == 0 {
    return Err(RenderError::SurfaceCreation {
      message: format!("surface size is zero ({width}x{height})"),
    });
  }
  let bytes = (width as u64)
    .checked_mul(height as u64)
    .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
    .ok_or(RenderError::SurfaceCreation {
      message: format!("surface byte size overflow ({width}x{height})"),
    })?;
  if bytes > MAX_SURFACE_BYTES {
    return Err(RenderError::SurfaceCreation {
      message: format!(
        "surface {width}x{height} would allocate {bytes} bytes (limit {MAX_SURFACE_BYTES})"
      ),
    });
  }
  Ok(bytes as usize)
}

/// Allocates a zeroed (fully transparent) pixmap with guarded dimensions.
pub fn new_surface(width: u32, height: u32) -> Result<Pixmap, RenderError> {
  let bytes = guard_dimensions(width, height)?;
  let mut buffer = Vec::new();
  buffer
    .try_reserve_exact(bytes)
    .map_err(|err| RenderError::SurfaceCreation {
      message: format!("surface allocation failed for {bytes} bytes: {err}"),
    })?;
  buffer.resize(bytes, 0);
  let size = IntSize::from_wh(width, height).ok_or(RenderError::SurfaceCreation {
    message: format!("surface dimensions out of range ({width}x{height})"),
  })?;
  Pixmap::from_vec(buffer, size).ok_or(RenderError::SurfaceCreation {
    message: format!("surface creation failed for {width}x{height}"),
  })
}

/// Capability for creating drawing surfaces.
///
/// The renderer and the filters take this instead of calling a global
/// constructor; a test can hand in a factory that always fails to drive
/// the "generation failed, abort action" and "filter no-op fallback"
/// paths.
pub trait SurfaceFactory {
  fn create(&self, width: u32, height: u32) -> Result<Pixmap, RenderError>;
}

/// Default factory backed by [`new_surface`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PixmapFactory;

impl SurfaceFactory for PixmapFactory {
  fn create(&self, width: u32, height: u32) -> Result<Pixmap, RenderError> {
    new_surface(width, height)
  }
}

/// Straight-alpha RGBA bytes extracted from a surface for one filter pass.
///
/// tiny-skia stores premultiplied pixels; the per-pixel filters want the
/// straight values the original canvas `ImageData` exposed. The buffer is
/// created transiently per filter invocation, mutated in place, and
/// written back.
pub struct PixelBuffer {
  width: u32,
  height: u32,
  data: Vec<u8>,
}

impl PixelBuffer {
  /// Extracts straight RGBA bytes from `pixmap`.
  pub fn from_pixmap(pixmap: &Pixmap) -> Self {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
      let straight = px.demultiply();
      data.extend_from_slice(&[straight.red(), straight.green(), straight.blue(), straight.alpha()]);
    }
    Self {
      width: pixmap.width(),
      height: pixmap.height(),
      data,
    }
  }

  #[inline]
  pub fn width(&self) -> u32 {
    self.width
  }

  #[inline]
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Flat RGBA bytes, row-major.
  #[inline]
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  #[inline]
  pub fn data_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }

  /// Byte offset of the pixel at `(x, y)`.
  #[inline]
  pub fn offset(&self, x: u32, y: u32) -> usize {
    ((y * self.width + x) * 4) as usize
  }

  /// Writes the (possibly mutated) bytes back into `pixmap`.
  ///
  /// Dimensions must match the pixmap this buffer was extracted from.
  pub fn write_back(&self, pixmap: &mut Pixmap) -> Result<(), FilterError> {
    if pixmap.width() != self.width || pixmap.height() != self.height {
      return Err(FilterError::SurfaceUnavailable {
        message: format!(
          "pixel buffer {}x{} does not match surface {}x{}",
          self.width,
          self.height,
          pixmap.width(),
          pixmap.height()
        ),
      });
    }
    for (px, chunk) in pixmap.pixels_mut().iter_mut().zip(self.data.chunks_exact(4)) {
      *px = ColorU8::from_rgba(chunk[0], chunk[1], chunk[2], chunk[3]).premultiply();
    }
    Ok(())
  }

  /// Consumes the buffer into a fresh surface of the same size.
  pub fn into_pixmap(self, factory: &dyn SurfaceFactory) -> Result<Pixmap, RenderError> {
    let mut pixmap = factory.create(self.width, self.height)?;
    self
      .write_back(&mut pixmap)
      .map_err(|err| RenderError::SurfaceCreation {
        message: err.to_string(),
      })?;
    Ok(pixmap)
  }
}
