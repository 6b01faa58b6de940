//! stampforge: procedural rubber-stamp rendering.
//!
//! Generates realistic custom stamps entirely in code: six archetypes
//! (notary circle, business rectangle, address rectangle, signature oval,
//! logo square, paid circle) drawn with deliberately imperfect strokes,
//! curved text, and an ink/aging pass, plus a white-background cutout
//! filter and a document compositor for placing stamps on uploaded pages.
//!
//! The quickest path from a configuration to PNG bytes:
//!
//! ```no_run
//! use stampforge::{generate_stamp, encode_png, StampConfig, StampType};
//!
//! let config = StampConfig::placeholder(StampType::NotaryCircle);
//! let stamp = generate_stamp(&config)?;
//! let png = encode_png(&stamp)?;
//! # Ok::<(), stampforge::Error>(())
//! ```

pub mod background;
pub mod canvas;
pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod ink;
pub mod jitter;
pub mod layout;
pub mod output;
pub mod primitives;
pub mod surface;
pub mod text;

pub use background::{remove_white_background, BackgroundOptions};
pub use canvas::Canvas;
pub use color::Rgba;
pub use config::{StampConfig, StampType, OVERSAMPLE};
pub use document::{decode_document, DocumentStamper, StampPosition};
pub use error::{DocumentError, Error, FilterError, RenderError, Result};
pub use ink::{apply_ink_effects, InkOptions};
pub use jitter::{InkJitter, JitterSource, NoJitter};
pub use layout::{generate_stamp, StampRenderer};
pub use output::{download_filename, encode_png, png_data_url};
pub use surface::{new_surface, PixmapFactory, SurfaceFactory};
pub use text::FontStore;
