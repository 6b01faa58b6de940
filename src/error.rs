//! Error types for stamp generation, filtering, and document handling.
//!
//! All errors use the `thiserror` crate. The taxonomy mirrors how failures
//! surface to a caller: render failures abort the triggering action,
//! filter failures are recovered locally by falling back to the unfiltered
//! image, and document failures reject the uploaded input with a message.

use thiserror::Error;

/// Result type alias for stampforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
  /// Surface allocation or rasterization error
  #[error("Render error: {0}")]
  Render(#[from] RenderError),

  /// Post-processing error (callers normally fall back instead of raising)
  #[error("Filter error: {0}")]
  Filter(#[from] FilterError),

  /// Uploaded-document decoding or compositing error
  #[error("Document error: {0}")]
  Document(#[from] DocumentError),

  /// I/O error
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Errors raised while rendering a stamp to pixels.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
  /// The drawing surface could not be created
  #[error("Failed to create surface: {message}")]
  SurfaceCreation { message: String },

  /// Encoding the finished surface failed
  #[error("Failed to encode image as {format}: {reason}")]
  EncodeFailed { format: String, reason: String },

  /// Invalid drawing parameters
  #[error("Invalid render parameters: {message}")]
  InvalidParameters { message: String },
}

/// Errors raised by the pixel post-processors.
///
/// These never escape the public filter entry points: the filters catch
/// them and return the original surface unchanged.
#[derive(Error, Debug, Clone)]
pub enum FilterError {
  /// A scratch surface for the filter pass could not be allocated
  #[error("Filter surface unavailable: {message}")]
  SurfaceUnavailable { message: String },
}

/// Errors raised while decoding or stamping an uploaded document.
#[derive(Error, Debug, Clone)]
pub enum DocumentError {
  /// The file type is not supported; `hint` tells the user what to do
  #[error("Unsupported document format '{format}': {hint}")]
  UnsupportedFormat { format: String, hint: String },

  /// The document bytes could not be decoded
  #[error("Failed to decode {format} document: {reason}")]
  DecodeFailed { format: String, reason: String },

  /// PDF rasterization is unavailable (missing feature or system library)
  #[error("PDF rendering unavailable: {reason}")]
  PdfUnavailable { reason: String },
}
