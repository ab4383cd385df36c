//! # Labeled letter images
//!
//! The [`ImageGenerator`] draws a piece of text centered on an opaque white
//! square and records the box around it, optionally shifted and scaled by
//! margins, as the label.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect as PixelRect};
use log::debug;

use crate::{error::GlyphResult, font::Font, rect::Bounds};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

/// Where the text lands on the canvas
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextLayout {
    /// The box around the text, centered on the canvas
    pub natural: Bounds,
    /// The natural box shifted and scaled by the margins
    pub inner: Bounds,
    /// The top left corner of the drawn text
    pub origin: (f32, f32),
}

/// Renders text into labeled square images
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    font_file: PathBuf,
    font_size: f32,
    image_size: u32,
    margin_left: f32,
    margin_top: f32,
    draw_borders: bool,
}

impl ImageGenerator {
    /// Create a generator without margins and without debug borders
    pub fn new(font_file: impl Into<PathBuf>, font_size: f32, image_size: u32) -> Self {
        Self {
            font_file: font_file.into(),
            font_size,
            image_size,
            margin_left: 0.0,
            margin_top: 0.0,
            draw_borders: false,
        }
    }

    /// Set the margins, as fractions of the text width and height
    ///
    /// The values are not validated: `1.0` collapses the inner box and
    /// negative values grow it.
    pub fn with_margins(self, margin_left: f32, margin_top: f32) -> Self {
        Self {
            margin_left,
            margin_top,
            ..self
        }
    }

    /// Draw the natural (red) and inner (blue) boxes below the text
    pub fn with_borders(self, draw_borders: bool) -> Self {
        Self {
            draw_borders,
            ..self
        }
    }

    /// The path of the font file
    pub fn font_file(&self) -> &Path {
        &self.font_file
    }

    /// The font size in pixels
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// The width and height of the images
    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    /// The left and top margin fractions
    pub fn margins(&self) -> (f32, f32) {
        (self.margin_left, self.margin_top)
    }

    /// Whether debug borders are drawn
    pub fn draw_borders(&self) -> bool {
        self.draw_borders
    }

    fn load_font(&self) -> GlyphResult<Font> {
        Font::open(&self.font_file, self.font_size)
    }

    fn layout_with(&self, font: &Font, text: &str) -> GlyphResult<TextLayout> {
        let (width, height) = font.text_size(text)?;
        let (width, height) = (width as f32, height as f32);
        let size = self.image_size as f32;

        let x = (size - width) / 2.0;
        let y = (size - height) / 2.0;

        let x1 = x + self.margin_left * width;
        let y1 = y - self.margin_top * height;
        let x2 = x1 + width * (1.0 - self.margin_left).powi(2);
        let y2 = y1 + height * (1.0 + self.margin_top).powi(2);

        Ok(TextLayout {
            natural: Bounds::new(x, y, x + width, y + height),
            inner: Bounds::new(x1, y1, x2, y2),
            origin: (x + self.margin_left * width, y + self.margin_top * height),
        })
    }

    /// Compute where the text and its boxes go, without drawing
    pub fn layout(&self, text: &str) -> GlyphResult<TextLayout> {
        let font = self.load_font()?;
        self.layout_with(&font, text)
    }

    /// Draw the text and return the image with its inner box
    pub fn render(&self, text: &str) -> GlyphResult<(RgbaImage, Bounds)> {
        let font = self.load_font()?;
        let layout = self.layout_with(&font, text)?;
        debug!("Layout for {:?}: {:?}", text, layout);

        let mut image = RgbaImage::from_pixel(self.image_size, self.image_size, WHITE);
        if self.draw_borders {
            fill_bounds(&mut image, layout.natural, RED);
            fill_bounds(&mut image, layout.inner, BLUE);
        }
        font.draw_text(&mut image, layout.origin, text, BLACK)?;
        Ok((image, layout.inner))
    }

    /// Render the text, save the image as PNG and the inner box as text
    ///
    /// The text file holds a single line `x1 y1 x2 y2`. Neither file's
    /// directory is created.
    pub fn to_image(
        &self,
        text: &str,
        image_file: impl AsRef<Path>,
        text_file: impl AsRef<Path>,
    ) -> GlyphResult<Bounds> {
        let (image, inner) = self.render(text)?;
        image.save_with_format(image_file.as_ref(), ImageFormat::Png)?;
        fs::write(text_file.as_ref(), inner.to_string())?;
        Ok(inner)
    }
}

/// Fill a box, edges included, with the corners rounded to whole pixels
///
/// The box is clipped to the image first; nothing is drawn if no pixel of it
/// is visible.
fn fill_bounds(image: &mut RgbaImage, bounds: Bounds, color: Rgba<u8>) {
    let (max_x, max_y) = (image.width() as f32 - 1.0, image.height() as f32 - 1.0);
    let (left, right) = min_max(bounds.x1.round(), bounds.x2.round());
    let (top, bottom) = min_max(bounds.y1.round(), bounds.y2.round());
    let (left, right) = (left.max(0.0), right.min(max_x));
    let (top, bottom) = (top.max(0.0), bottom.min(max_y));
    if left > right || top > bottom {
        return;
    }
    let width = (right - left) as u32 + 1;
    let height = (bottom - top) as u32 + 1;
    let rect = PixelRect::at(left as i32, top as i32).of_size(width, height);
    draw_filled_rect_mut(image, rect, color);
}

fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
