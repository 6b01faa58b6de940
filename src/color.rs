//! Straight-alpha color values and the stamp ink palette.

/// Solid color with u8 channels and a straight (unpremultiplied) f32
/// alpha, matching how the drawing code reasons about ink opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: f32,
}

impl Rgba {
  /// Near-black stamp ink.
  pub const INK: Rgba = Rgba::rgb(0x1a, 0x1a, 0x1a);
  /// Aged sepia ink used by the blot/smudge overlay.
  pub const SEPIA: Rgba = Rgba::rgb(0x2a, 0x18, 0x10);
  pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
  pub const TRANSPARENT: Rgba = Rgba {
    r: 0,
    g: 0,
    b: 0,
    a: 0.0,
  };

  /// Opaque color from RGB channels.
  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b, a: 1.0 }
  }

  /// Same color at `opacity`, clamped to `[0, 1]`.
  pub fn with_opacity(self, opacity: f32) -> Self {
    Self {
      a: opacity.clamp(0.0, 1.0),
      ..self
    }
  }

  /// Alpha as a byte, rounding.
  pub fn alpha_u8(self) -> u8 {
    (self.a * 255.0).round() as u8
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ink_is_near_black_and_opaque() {
    assert_eq!((Rgba::INK.r, Rgba::INK.g, Rgba::INK.b), (26, 26, 26));
    assert_eq!(Rgba::INK.alpha_u8(), 255);
  }

  #[test]
  fn with_opacity_clamps() {
    assert_eq!(Rgba::INK.with_opacity(1.5).a, 1.0);
    assert_eq!(Rgba::INK.with_opacity(-0.2).a, 0.0);
    assert_eq!(Rgba::INK.with_opacity(0.5).alpha_u8(), 128);
  }

  #[test]
  fn transparent_has_zero_alpha_byte() {
    assert_eq!(Rgba::TRANSPARENT.alpha_u8(), 0);
  }
}
