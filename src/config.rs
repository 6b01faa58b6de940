//! Stamp configuration: archetype, text, and sizing.
//!
//! `StampConfig` is the immutable value object the form UI hands to the
//! layout engine. The engine never mutates it; text lines are consumed
//! positionally by the per-archetype layout rules and missing lines
//! degrade to placeholder text or are dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Factor by which stamps are rasterized above their logical size.
///
/// All layout code works in logical coordinates; the surface is allocated
/// at `base size * OVERSAMPLE` and a uniform scale transform is
/// pre-applied, so downstream scaling stays sharp.
pub const OVERSAMPLE: u32 = 4;

/// The six supported stamp archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StampType {
  NotaryCircle,
  BusinessRectangle,
  AddressRectangle,
  SignatureOval,
  LogoSquare,
  PaidCircle,
}

impl StampType {
  pub const ALL: [StampType; 6] = [
    StampType::NotaryCircle,
    StampType::BusinessRectangle,
    StampType::AddressRectangle,
    StampType::SignatureOval,
    StampType::LogoSquare,
    StampType::PaidCircle,
  ];

  /// Kebab-case identifier, as used by the form UI and download filenames.
  pub fn as_str(self) -> &'static str {
    match self {
      StampType::NotaryCircle => "notary-circle",
      StampType::BusinessRectangle => "business-rectangle",
      StampType::AddressRectangle => "address-rectangle",
      StampType::SignatureOval => "signature-oval",
      StampType::LogoSquare => "logo-square",
      StampType::PaidCircle => "paid-circle",
    }
  }

  /// Logical canvas size in layout units, before oversampling.
  ///
  /// Circle and square archetypes are square; rectangle and oval
  /// archetypes are wider than tall. The rendered surface is this size
  /// multiplied by [`OVERSAMPLE`].
  pub fn base_size(self) -> (u32, u32) {
    match self {
      StampType::NotaryCircle | StampType::PaidCircle | StampType::LogoSquare => (100, 100),
      StampType::SignatureOval => (160, 70),
      StampType::BusinessRectangle => (160, 60),
      StampType::AddressRectangle => (160, 100),
    }
  }

  /// Default text shown (and rendered) when the user has typed nothing.
  pub fn placeholder_text(self) -> &'static str {
    match self {
      StampType::NotaryCircle => "YOUR NAME\nNOTARY\nPUBLIC",
      StampType::BusinessRectangle => "COMPANY NAME\nESTABLISHED 2024\nPROFESSIONAL SERVICES",
      StampType::AddressRectangle => "John Smith\n123 Main Street\nNew York, NY 10001",
      StampType::SignatureOval => "JOHN SMITH\nSIGNATURE\nAUTHORIZED",
      StampType::LogoSquare => "LOGO\nCOMPANY",
      StampType::PaidCircle => "COMPANY FULL NAME\nFINANCE DEPARTMENT",
    }
  }
}

impl fmt::Display for StampType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for StampType {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    StampType::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| format!("unknown stamp type '{s}'"))
  }
}

/// Configuration for one stamp generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampConfig {
  /// Newline-delimited text lines, consumed positionally per archetype.
  pub stamp_text: String,
  /// Font size in logical units.
  pub font_size: f32,
  pub stamp_type: StampType,
  /// Border stroke width in logical units.
  pub border_width: f32,
  /// Locale line, e.g. "STATE OF NEW YORK"; drawn by the notary archetype.
  pub state: String,
}

impl StampConfig {
  /// A ready-to-render configuration with the archetype's placeholder text.
  pub fn placeholder(stamp_type: StampType) -> Self {
    Self {
      stamp_text: stamp_type.placeholder_text().to_string(),
      font_size: 16.0,
      stamp_type,
      border_width: 3.0,
      state: "STATE OF NEW YORK".to_string(),
    }
  }

  /// Non-blank text lines, in order. Blank-only lines are dropped.
  pub fn lines(&self) -> Vec<&str> {
    self
      .stamp_text
      .split('\n')
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stamp_type_round_trips_through_strings() {
    for t in StampType::ALL {
      assert_eq!(t.as_str().parse::<StampType>().unwrap(), t);
    }
    assert!("wax-seal".parse::<StampType>().is_err());
  }

  #[test]
  fn serde_uses_kebab_case() {
    let json = serde_json::to_string(&StampType::NotaryCircle).unwrap();
    assert_eq!(json, "\"notary-circle\"");
    let back: StampType = serde_json::from_str("\"paid-circle\"").unwrap();
    assert_eq!(back, StampType::PaidCircle);
  }

  #[test]
  fn square_archetypes_are_square_and_rects_are_wide() {
    for t in StampType::ALL {
      let (w, h) = t.base_size();
      match t {
        StampType::NotaryCircle | StampType::PaidCircle | StampType::LogoSquare => {
          assert_eq!(w, h, "{t} should be square")
        }
        _ => assert!(w > h, "{t} should be wider than tall"),
      }
    }
  }

  #[test]
  fn lines_drop_blank_entries() {
    let config = StampConfig {
      stamp_text: "ONE\n \n\nTWO\n".to_string(),
      ..StampConfig::placeholder(StampType::LogoSquare)
    };
    assert_eq!(config.lines(), vec!["ONE", "TWO"]);
  }

  #[test]
  fn placeholder_text_exists_for_every_type() {
    for t in StampType::ALL {
      assert!(!t.placeholder_text().is_empty());
    }
  }
}
