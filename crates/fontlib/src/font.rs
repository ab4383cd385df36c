//! # Font loading and text rasterization
//!
//! Thin wrapper around a [`fontdue::Font`] at a fixed pixel size.

use std::{fs, path::Path};

use fontdue::FontSettings;
use image::{Rgba, RgbaImage};
use log::{debug, trace};

use crate::error::{GlyphError, GlyphResult};

/// A font face loaded at a fixed pixel size
pub struct Font {
    inner: fontdue::Font,
    size: f32,
}

impl Font {
    /// Parse a font from the bytes of a TTF/OTF file
    pub fn from_bytes(data: &[u8], size: f32) -> GlyphResult<Self> {
        let inner = fontdue::Font::from_bytes(
            data,
            FontSettings {
                scale: size,
                ..FontSettings::default()
            },
        )
        .map_err(GlyphError::Font)?;
        Ok(Self { inner, size })
    }

    /// Read and parse a font file
    pub fn open(path: impl AsRef<Path>, size: f32) -> GlyphResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let font = Self::from_bytes(&data, size)?;
        debug!(
            "Loaded font {:?} from '{}' at {}px",
            font.name().unwrap_or("<unnamed>"),
            path.display(),
            size
        );
        Ok(font)
    }

    /// The pixel size of the font
    pub fn size(&self) -> f32 {
        self.size
    }

    /// The name stored in the font file, if any
    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    /// Whether the font has a glyph for the character
    pub fn has_glyph(&self, c: char) -> bool {
        self.inner.has_glyph(c)
    }

    fn check_glyphs(&self, text: &str) -> GlyphResult<()> {
        match text.chars().find(|&c| !self.inner.has_glyph(c)) {
            Some(c) => Err(GlyphError::MissingGlyph(c)),
            None => Ok(()),
        }
    }

    /// Distance from the top of the line to the baseline, and total line height
    fn line_metrics(&self) -> (f32, f32) {
        match self.inner.horizontal_line_metrics(self.size) {
            Some(lm) => (lm.ascent, lm.ascent - lm.descent),
            None => (self.size, self.size),
        }
    }

    /// Horizontal pen advance after each character, kerning included
    fn advances<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (char, f32)> + 'a {
        let mut chars = text.chars().peekable();
        std::iter::from_fn(move || {
            let c = chars.next()?;
            let mut advance = self.inner.metrics(c, self.size).advance_width;
            if let Some(&next) = chars.peek() {
                advance += self.inner.horizontal_kern(c, next, self.size).unwrap_or(0.0);
            }
            Some((c, advance))
        })
    }

    /// The size of the box the text occupies when drawn, in whole pixels
    ///
    /// The width is the sum of the advances, the height spans from the
    /// ascender line to the descender line.
    pub fn text_size(&self, text: &str) -> GlyphResult<(u32, u32)> {
        self.check_glyphs(text)?;
        let width: f32 = self.advances(text).map(|(_, adv)| adv).sum();
        let (_, height) = self.line_metrics();
        Ok((width.ceil().max(0.0) as u32, height.ceil().max(0.0) as u32))
    }

    /// Draw the text with its top left corner at `origin`
    ///
    /// Every channel of a covered pixel, alpha included, is interpolated
    /// between the canvas and `ink` by the glyph coverage. Pixels without
    /// coverage keep their exact value.
    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        origin: (f32, f32),
        text: &str,
        ink: Rgba<u8>,
    ) -> GlyphResult<()> {
        self.check_glyphs(text)?;
        let (ascent, _) = self.line_metrics();
        let baseline = (origin.1 + ascent).round() as i64;
        let mut pen_x = origin.0;
        for (c, advance) in self.advances(text) {
            let (metrics, coverage) = self.inner.rasterize(c, self.size);
            let left = pen_x.round() as i64 + i64::from(metrics.xmin);
            let top = baseline - i64::from(metrics.ymin) - metrics.height as i64;
            trace!(
                "Placing {:?} ({}x{}) at ({}, {})",
                c,
                metrics.width,
                metrics.height,
                left,
                top
            );
            if metrics.width > 0 {
                for (row, line) in coverage.chunks(metrics.width).enumerate() {
                    for (col, &cov) in line.iter().enumerate() {
                        let x = left + col as i64;
                        let y = top + row as i64;
                        blend_pixel(canvas, x, y, ink, cov);
                    }
                }
            }
            pen_x += advance;
        }
        Ok(())
    }
}

fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, ink: Rgba<u8>, coverage: u8) {
    let (width, height) = canvas.dimensions();
    if coverage == 0 || x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let a = u32::from(coverage);
    for (dst, &src) in pixel.0.iter_mut().zip(ink.0.iter()) {
        let value = (u32::from(src) * a + u32::from(*dst) * (255 - a) + 127) / 255;
        *dst = value as u8;
    }
}
