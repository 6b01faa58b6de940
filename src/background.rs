//! Naive white-background removal.
//!
//! A per-pixel color-threshold filter that converts near-white pixels to
//! transparent, applied downstream of stamp generation (or any other
//! image source). The public entry point never raises: on any internal
//! failure the original surface comes back unchanged and callers proceed
//! with the unfiltered image.

use crate::error::FilterError;
use crate::surface::{PixelBuffer, PixmapFactory, SurfaceFactory};
use tiny_skia::Pixmap;

/// Tuning for the background classifier.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundOptions {
  /// A pixel is background only if every channel exceeds this value.
  pub threshold: u8,
  /// ...and the channel spread (max - min) stays under this value,
  /// rejecting tinted near-whites.
  pub max_channel_spread: u8,
  /// Force every non-background pixel to full opacity.
  ///
  /// Off by default: forcing alpha to 255 clips legitimate anti-aliased
  /// edge pixels and exists only to reproduce the stricter legacy cutout.
  pub force_opaque: bool,
  /// Average alpha over a 3x3 neighborhood for intermediate-alpha pixels
  /// to soften jagged cutout edges.
  pub smooth_edges: bool,
}

impl Default for BackgroundOptions {
  fn default() -> Self {
    Self {
      threshold: 240,
      max_channel_spread: 30,
      force_opaque: false,
      smooth_edges: true,
    }
  }
}

/// Removes the near-white background from `pixmap`.
///
/// The returned surface is the authoritative result; on internal failure
/// it is the input itself, unmodified (no-op fallback, logged).
pub fn remove_white_background(pixmap: Pixmap, options: &BackgroundOptions) -> Pixmap {
  remove_white_background_with(&PixmapFactory, pixmap, options)
}

/// Like [`remove_white_background`] but with an injectable surface
/// factory, so failure handling can be exercised.
pub fn remove_white_background_with(
  factory: &dyn SurfaceFactory,
  pixmap: Pixmap,
  options: &BackgroundOptions,
) -> Pixmap {
  match filter_background(factory, &pixmap, options) {
    Ok(filtered) => filtered,
    Err(err) => {
      log::warn!("background removal failed, keeping unfiltered surface: {err}");
      pixmap
    }
  }
}

fn filter_background(
  factory: &dyn SurfaceFactory,
  pixmap: &Pixmap,
  options: &BackgroundOptions,
) -> Result<Pixmap, FilterError> {
  let mut buffer = PixelBuffer::from_pixmap(pixmap);
  for chunk in buffer.data_mut().chunks_exact_mut(4) {
    let (r, g, b) = (chunk[0], chunk[1], chunk[2]);
    if is_background(r, g, b, options) {
      chunk[3] = 0;
    } else if options.force_opaque {
      chunk[3] = 255;
    }
  }
  if options.smooth_edges {
    smooth_intermediate_alpha(&mut buffer);
  }
  buffer
    .into_pixmap(factory)
    .map_err(|err| FilterError::SurfaceUnavailable {
      message: err.to_string(),
    })
}

#[inline]
fn is_background(r: u8, g: u8, b: u8, options: &BackgroundOptions) -> bool {
  let near_white = r > options.threshold && g > options.threshold && b > options.threshold;
  let spread = r.max(g).max(b) - r.min(g).min(b);
  near_white && spread < options.max_channel_spread
}

/// Averages alpha over each pixel's 3x3 neighborhood, but only for pixels
/// already at intermediate alpha; fully transparent and fully opaque
/// pixels are left alone so the pass is idempotent on settled areas.
fn smooth_intermediate_alpha(buffer: &mut PixelBuffer) {
  let (w, h) = (buffer.width(), buffer.height());
  let alphas: Vec<u8> = buffer.data().chunks_exact(4).map(|px| px[3]).collect();

  for y in 0..h {
    for x in 0..w {
      let at = buffer.offset(x, y);
      let alpha = buffer.data()[at + 3];
      if alpha == 0 || alpha == 255 {
        continue;
      }
      let mut sum = 0u32;
      let mut count = 0u32;
      for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
        for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
          sum += alphas[(ny * w + nx) as usize] as u32;
          count += 1;
        }
      }
      buffer.data_mut()[at + 3] = (sum / count) as u8;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::RenderError;
  use crate::surface::new_surface;
  use tiny_skia::Color;

  struct FailingFactory;

  impl SurfaceFactory for FailingFactory {
    fn create(&self, _width: u32, _height: u32) -> Result<Pixmap, RenderError> {
      Err(RenderError::SurfaceCreation {
        message: "injected failure".to_string(),
      })
    }
  }

  fn solid(size: u32, r: u8, g: u8, b: u8) -> Pixmap {
    let mut pixmap = new_surface(size, size).unwrap();
    pixmap.fill(Color::from_rgba8(r, g, b, 255));
    pixmap
  }

  #[test]
  fn all_white_becomes_fully_transparent() {
    let out = remove_white_background(solid(8, 255, 255, 255), &BackgroundOptions::default());
    assert!(out.pixels().iter().all(|px| px.alpha() == 0));
  }

  #[test]
  fn all_black_keeps_full_alpha() {
    let out = remove_white_background(solid(8, 0, 0, 0), &BackgroundOptions::default());
    assert!(out.pixels().iter().all(|px| px.alpha() == 255));
  }

  #[test]
  fn tinted_near_white_is_kept_by_spread_test() {
    // 250/250/215: bright but visibly tinted; spread 35 >= 30.
    let out = remove_white_background(solid(4, 250, 250, 215), &BackgroundOptions::default());
    assert!(out.pixels().iter().all(|px| px.alpha() == 255));
  }

  #[test]
  fn threshold_boundary_is_exclusive() {
    // Exactly 240 on every channel is not "greater than 240".
    let out = remove_white_background(solid(4, 240, 240, 240), &BackgroundOptions::default());
    assert!(out.pixels().iter().all(|px| px.alpha() == 255));
  }

  #[test]
  fn injected_failure_returns_original_surface() {
    let src = solid(6, 255, 255, 255);
    let out = remove_white_background_with(&FailingFactory, src, &BackgroundOptions::default());
    assert_eq!(out.width(), 6);
    assert_eq!(out.height(), 6);
    // Unfiltered: the white background is still opaque.
    assert!(out.pixels().iter().all(|px| px.alpha() == 255));
  }

  #[test]
  fn second_pass_is_idempotent_on_opaque_pixels() {
    let once = remove_white_background(solid(8, 26, 26, 26), &BackgroundOptions::default());
    let twice = remove_white_background(once, &BackgroundOptions::default());
    assert!(twice.pixels().iter().all(|px| px.alpha() == 255));
  }

  #[test]
  fn force_opaque_clips_intermediate_alpha() {
    let mut pixmap = new_surface(2, 2).unwrap();
    pixmap.fill(Color::from_rgba8(26, 26, 26, 100));
    let strict = BackgroundOptions {
      force_opaque: true,
      smooth_edges: false,
      ..BackgroundOptions::default()
    };
    let out = remove_white_background(pixmap, &strict);
    assert!(out.pixels().iter().all(|px| px.alpha() == 255));
  }

  #[test]
  fn smoothing_averages_edge_alpha_toward_neighbors() {
    // One semi-transparent pixel surrounded by transparency drifts down.
    let mut pixmap = new_surface(3, 3).unwrap();
    let mut buffer = PixelBuffer::from_pixmap(&pixmap);
    let at = buffer.offset(1, 1);
    buffer.data_mut()[at..at + 4].copy_from_slice(&[10, 10, 10, 180]);
    buffer.write_back(&mut pixmap).unwrap();

    let options = BackgroundOptions {
      smooth_edges: true,
      ..BackgroundOptions::default()
    };
    let out = remove_white_background(pixmap, &options);
    let center = out.pixels()[4].demultiply().alpha();
    assert!(center < 180, "alpha was not smoothed: {center}");
  }
}
