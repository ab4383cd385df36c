//! Errors relating to glyph rendering

use std::io;

use image::ImageError;
use thiserror::Error;

use crate::rect::Rect;

#[derive(Debug, Error)]
/// Error when rendering or transforming a glyph
pub enum GlyphError {
    /// Neither or both of font color and font texture were given
    #[error("Exactly one of these must be provided: font_color, font_texture")]
    Argument,
    /// The texture does not cover the canvas
    #[error(
        "Texture image ({tex_width}x{tex_height}) must have at least \
         the dimensions of the canvas ({width}x{height})"
    )]
    Dimension {
        /// Width of the canvas
        width: u32,
        /// Height of the canvas
        height: u32,
        /// Width of the texture
        tex_width: u32,
        /// Height of the texture
        tex_height: u32,
    },
    /// The font parser rejected the font data
    #[error("Failed to load font: {0}")]
    Font(&'static str),
    /// The font has no glyph for a character
    #[error("Font has no glyph for {0:?}")]
    MissingGlyph(char),
    /// Rendering left the canvas blank
    #[error("Glyph for {0:?} has no visible pixels")]
    EmptyGlyph(char),
    /// The corner points admit no projective transform
    #[error("No homography maps {from} onto {to}")]
    Homography {
        /// The source quadrilateral
        from: Rect,
        /// The destination quadrilateral
        to: Rect,
    },
    /// The IO failed
    #[error("Failed IO")]
    Io(#[from] io::Error),
    /// Encoding or decoding an image failed
    #[error("Image processing failed")]
    Image(#[from] ImageError),
}

/// Type alias for convenience
pub type GlyphResult<T> = Result<T, GlyphError>;
