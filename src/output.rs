//! Finished-stamp export: PNG bytes, data URLs, download filenames.

use crate::config::StampType;
use crate::error::{RenderError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use tiny_skia::Pixmap;

/// Encodes `pixmap` as PNG at maximum quality.
///
/// tiny-skia stores premultiplied pixels; PNG wants straight alpha, so
/// every pixel is unpremultiplied first.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>> {
  let mut rgba = Vec::with_capacity(pixmap.pixels().len() * 4);
  for px in pixmap.pixels() {
    let straight = px.demultiply();
    rgba.extend_from_slice(&[
      straight.red(),
      straight.green(),
      straight.blue(),
      straight.alpha(),
    ]);
  }

  let img = RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba).ok_or_else(|| {
    RenderError::EncodeFailed {
      format: "PNG".to_string(),
      reason: "failed to assemble RGBA image".to_string(),
    }
  })?;

  let mut buffer = Vec::new();
  img
    .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
    .map_err(|err| RenderError::EncodeFailed {
      format: "PNG".to_string(),
      reason: err.to_string(),
    })?;
  Ok(buffer)
}

/// Encodes `pixmap` as a `data:image/png;base64,...` URL, the form the
/// download anchor consumes.
pub fn png_data_url(pixmap: &Pixmap) -> Result<String> {
  let bytes = encode_png(pixmap)?;
  Ok(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
}

/// Download filename convention for a generated stamp.
pub fn download_filename(stamp_type: StampType) -> String {
  format!("{}-stamp.png", stamp_type.as_str())
}
