//! Format detection
//!
//! Each container format is handled by an `ImageDecoder`; the
//! `FormatDetector` tries them in registration order.

pub mod decoder;
pub mod detector;

pub use decoder::{ImageDecoder, ImageFormat};
pub use detector::FormatDetector;
