#![warn(missing_docs)]
//! # Synthetic character images
//!
//! This crate renders single characters of a font into small images and
//! records where the glyph ended up, to produce labeled training and test
//! data for character recognition.
//!
//! - [`generator::ImageGenerator`] draws text centered on an opaque square and
//!   writes the image together with the box around the text.
//! - [`chars::Char`] is a glyph on a transparent canvas with its bounding
//!   quadrilateral, which can be put on a background, blurred or warped.

pub mod chars;
pub mod error;
pub mod font;
pub mod generator;
pub mod rect;

pub use chars::Char;
pub use error::{GlyphError, GlyphResult};
pub use font::Font;
pub use generator::ImageGenerator;
pub use rect::{Bounds, Rect};
