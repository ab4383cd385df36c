//! # Single rendered characters
//!
//! A [`Char`] is one glyph on a transparent canvas together with the
//! quadrilateral that bounds it. The transforms take `&self` and return a
//! new [`Char`] with its own copy of the raster.

use std::path::Path;

use image::{imageops, DynamicImage, ImageFormat, Rgb, Rgba, RgbaImage};
use imageproc::{
    filter::Kernel,
    geometric_transformations::{warp_into, Interpolation, Projection},
};
use log::debug;

use crate::{
    error::{GlyphError, GlyphResult},
    font::Font,
    rect::Rect,
};

/// The color of canvas pixels without ink
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// The file the cropped texture is written to by [`Char::from_font`]
pub const TEXTURE_SNAPSHOT: &str = "tex.png";

/// Ink used when a texture supplies the visible colors
const TEXTURE_INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Pixels mapped from outside the source by a warp
const WARP_FILL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How the glyph gets its colors
enum Fill<'a> {
    Color(Rgb<u8>),
    Texture(&'a DynamicImage),
}

impl<'a> Fill<'a> {
    fn new(color: Option<Rgb<u8>>, texture: Option<&'a DynamicImage>) -> GlyphResult<Self> {
        match (color, texture) {
            (Some(color), None) => Ok(Self::Color(color)),
            (None, Some(texture)) => Ok(Self::Texture(texture)),
            _ => Err(GlyphError::Argument),
        }
    }

    fn ink(&self) -> Rgba<u8> {
        match self {
            Self::Color(Rgb([r, g, b])) => Rgba([*r, *g, *b, 255]),
            Self::Texture(_) => TEXTURE_INK,
        }
    }
}

/// A rendered character
#[derive(Debug, Clone)]
pub struct Char {
    ch: char,
    font_size: f32,
    image: RgbaImage,
    rect: Rect,
    font_color: Option<Rgb<u8>>,
}

impl Char {
    /// Bundle a rendered image with its metadata
    pub fn new(
        ch: char,
        font_size: f32,
        image: RgbaImage,
        rect: Rect,
        font_color: Option<Rgb<u8>>,
    ) -> Self {
        Self {
            ch,
            font_size,
            image,
            rect,
            font_color,
        }
    }

    /// The character
    pub fn char(&self) -> char {
        self.ch
    }

    /// The font size it was rendered with
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// The raster image
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the raster image
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// The boundary of the glyph
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// The font color, `None` if a texture was used
    pub fn font_color(&self) -> Option<Rgb<u8>> {
        self.font_color
    }

    fn with_image(&self, image: RgbaImage) -> Self {
        Self::new(self.ch, self.font_size, image, self.rect, self.font_color)
    }

    /// Render a character centered on a transparent canvas
    ///
    /// Exactly one of `font_color` and `font_texture` must be given. A
    /// texture must be at least as large as the canvas: it is cropped to
    /// the canvas, written to [`TEXTURE_SNAPSHOT`], and shows only where the
    /// glyph left ink.
    ///
    /// The returned rect is the tight, axis-aligned box around all pixels
    /// that differ from [`BACKGROUND`].
    pub fn from_font(
        ch: char,
        font: &Font,
        (width, height): (u32, u32),
        font_color: Option<Rgb<u8>>,
        font_texture: Option<&DynamicImage>,
    ) -> GlyphResult<Self> {
        let fill = Fill::new(font_color, font_texture)?;

        let mut buf = [0u8; 4];
        let text: &str = ch.encode_utf8(&mut buf);
        let (text_width, text_height) = font.text_size(text)?;
        let x = (width as f32 - text_width as f32) / 2.0;
        let y = (height as f32 - text_height as f32) / 2.0;

        let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);
        font.draw_text(&mut image, (x, y), text, fill.ink())?;

        if let Fill::Texture(texture) = fill {
            image = apply_texture(&image, texture)?;
        }

        let (x0, y0, x1, y1) = ink_bounds(&image).ok_or(GlyphError::EmptyGlyph(ch))?;
        let rect = Rect::axis_aligned(x0 as f32, y0 as f32, x1 as f32, y1 as f32);
        debug!("Rendered {:?} at {}px into {}", ch, font.size(), rect);

        Ok(Self::new(ch, font.size(), image, rect, font_color))
    }

    /// Put the glyph on top of a background image
    ///
    /// The background is placed at the top left corner without scaling. The
    /// glyph is composited with the "over" operator, so an opaque background
    /// gives an opaque result.
    pub fn add_background(&self, bg_img: &DynamicImage) -> Self {
        let (width, height) = self.image.dimensions();
        let mut result = RgbaImage::new(width, height);
        imageops::replace(&mut result, &bg_img.to_rgba8(), 0, 0);
        for (dst, src) in result.pixels_mut().zip(self.image.pixels()) {
            *dst = composite_over(*src, *dst);
        }
        self.with_image(result)
    }

    /// Box-blur the image with a `(width, height)` kernel
    ///
    /// The rect is kept as is.
    pub fn blur(&self, kernel: (u32, u32)) -> Self {
        self.with_image(box_blur(&self.image, kernel))
    }

    /// Warp the glyph so that its rect lands on `dst_rect`
    ///
    /// The result is a square as wide as the current image and its rect is
    /// `dst_rect`.
    pub fn apply_homography(&self, dst_rect: &Rect) -> GlyphResult<Self> {
        let projection = Projection::from_control_points(self.rect.corners(), dst_rect.corners())
            .ok_or(GlyphError::Homography {
                from: self.rect,
                to: *dst_rect,
            })?;

        let side = self.image.width();
        let mut warped = RgbaImage::new(side, side);
        warp_into(
            &self.image,
            &projection,
            Interpolation::Bilinear,
            WARP_FILL,
            &mut warped,
        );
        debug!("Warped {:?} from {} to {}", self.ch, self.rect, dst_rect);

        Ok(Self {
            rect: *dst_rect,
            ..self.with_image(warped)
        })
    }

    /// Save the image as PNG
    pub fn save(&self, path: impl AsRef<Path>) -> GlyphResult<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// Confine a texture to the inked pixels of `canvas`
fn apply_texture(canvas: &RgbaImage, texture: &DynamicImage) -> GlyphResult<RgbaImage> {
    let (width, height) = canvas.dimensions();
    if texture.width() < width || texture.height() < height {
        return Err(GlyphError::Dimension {
            width,
            height,
            tex_width: texture.width(),
            tex_height: texture.height(),
        });
    }

    let rgba = texture.to_rgba8();
    let mut texture = imageops::crop_imm(&rgba, 0, 0, width, height).to_image();

    // FIXME: the snapshot path is fixed and written on every textured render
    texture.save_with_format(TEXTURE_SNAPSHOT, ImageFormat::Png)?;
    debug!("Wrote texture snapshot to '{}'", TEXTURE_SNAPSHOT);

    for (src, dst) in canvas.pixels().zip(texture.pixels_mut()) {
        if *src == BACKGROUND {
            *dst = BACKGROUND;
        }
    }
    Ok(texture)
}

/// The inclusive `(x0, y0, x1, y1)` box around all non-background pixels
fn ink_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    image
        .enumerate_pixels()
        .filter(|(_, _, p)| **p != BACKGROUND)
        .fold(None, |acc, (x, y, _)| match acc {
            None => Some((x, y, x, y)),
            Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
        })
}

/// `src` over `dst` in 8-bit integer arithmetic, rounded to nearest
fn composite_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = u32::from(src[3]);
    let da = u32::from(dst[3]);
    // alpha of the result, scaled by 255
    let alpha = sa * 255 + da * (255 - sa);
    if alpha == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |c: usize| {
        let value = u32::from(src[c]) * sa * 255 + u32::from(dst[c]) * da * (255 - sa);
        ((value + alpha / 2) / alpha) as u8
    };
    Rgba([channel(0), channel(1), channel(2), ((alpha + 127) / 255) as u8])
}

/// Normalized `kx` by `ky` box filter over all four channels
///
/// The kernel is anchored at `(kx / 2, ky / 2)` and the image is clamped at
/// the edges. An empty kernel leaves the image as is.
fn box_blur(image: &RgbaImage, (kx, ky): (u32, u32)) -> RgbaImage {
    if kx == 0 || ky == 0 {
        return image.clone();
    }
    let weights = vec![1.0 / (kx * ky) as f32; (kx * ky) as usize];
    Kernel::new(&weights, kx, ky).filter(image, |channel: &mut u8, acc: f32| {
        *channel = acc.round().clamp(0.0, 255.0) as u8;
    })
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    use super::{ink_bounds, Char, BACKGROUND, TEXTURE_SNAPSHOT};
    use crate::{error::GlyphError, font::tests::font, rect::Rect};

    const RED: Rgb<u8> = Rgb([200, 10, 10]);

    fn red_char(ch: char) -> Char {
        Char::from_font(ch, &font(60.0), (100, 100), Some(RED), None).unwrap()
    }

    #[test]
    fn test_arguments() {
        let font = font(40.0);
        let texture = DynamicImage::ImageRgb8(RgbImage::new(100, 100));
        assert!(matches!(
            Char::from_font('a', &font, (100, 100), None, None),
            Err(GlyphError::Argument)
        ));
        assert!(matches!(
            Char::from_font('a', &font, (100, 100), Some(RED), Some(&texture)),
            Err(GlyphError::Argument)
        ));
    }

    #[test]
    fn test_small_texture() {
        let font = font(40.0);
        let texture = DynamicImage::ImageRgb8(RgbImage::new(100, 99));
        assert!(matches!(
            Char::from_font('a', &font, (100, 100), None, Some(&texture)),
            Err(GlyphError::Dimension {
                width: 100,
                height: 100,
                tex_width: 100,
                tex_height: 99,
            })
        ));
    }

    #[test]
    fn test_empty_glyph() {
        let font = font(40.0);
        assert!(matches!(
            Char::from_font(' ', &font, (100, 100), Some(RED), None),
            Err(GlyphError::EmptyGlyph(' '))
        ));
    }

    #[test]
    fn test_rect_bounds_ink() {
        for ch in ['a', 'g', 'W', 'i', '.'] {
            let chr = red_char(ch);
            let image = chr.image();
            let rect = chr.rect();
            let [(x0, y0), (x1, top), (left, y1), (right, bottom)] = rect.corners();
            assert_eq!((x1, top, left, right, bottom), (x1, y0, x0, x1, y1));

            let ink = |x: u32, y: u32| image.get_pixel(x, y) != &BACKGROUND;
            let (x0, y0, x1, y1) = (x0 as u32, y0 as u32, x1 as u32, y1 as u32);
            for (x, y, _) in image.enumerate_pixels() {
                if ink(x, y) {
                    assert!(x >= x0 && x <= x1 && y >= y0 && y <= y1, "{:?}", ch);
                }
            }
            assert!((y0..=y1).any(|y| ink(x0, y)));
            assert!((y0..=y1).any(|y| ink(x1, y)));
            assert!((x0..=x1).any(|x| ink(x, y0)));
            assert!((x0..=x1).any(|x| ink(x, y1)));
        }
    }

    #[test]
    fn test_color_ink() {
        let chr = red_char('H');
        assert_eq!(chr.char(), 'H');
        assert_eq!(chr.font_size(), 60.0);
        assert_eq!(chr.font_color(), Some(RED));
        assert_eq!(chr.image().dimensions(), (100, 100));
        // fully covered pixels carry the exact font color
        assert!(chr.image().pixels().any(|p| p == &Rgba([200, 10, 10, 255])));
        // the glyph is roughly centered
        let [(x0, y0), _, _, (x1, y1)] = chr.rect().corners();
        assert!(((x0 + x1) / 2.0 - 50.0).abs() < 5.0);
        assert!(((y0 + y1) / 2.0 - 50.0).abs() < 10.0);
    }

    #[test]
    fn test_texture() {
        let font = font(60.0);
        let texture = RgbImage::from_pixel(120, 110, Rgb([10, 200, 30]));
        let texture = DynamicImage::ImageRgb8(texture);
        let chr = Char::from_font('x', &font, (100, 100), None, Some(&texture)).unwrap();
        assert_eq!(chr.font_color(), None);
        assert_eq!(chr.image().dimensions(), (100, 100));
        for p in chr.image().pixels() {
            assert!(p == &BACKGROUND || p == &Rgba([10, 200, 30, 255]));
        }
        let textured = chr.image().pixels().filter(|p| **p != BACKGROUND).count();

        let plain = Char::from_font('x', &font, (100, 100), Some(RED), None).unwrap();
        let inked = plain.image().pixels().filter(|p| **p != BACKGROUND).count();
        assert_eq!(textured, inked);
        assert_eq!(chr.rect(), plain.rect());
        // masked pixels are reset to the exact background tuple
        assert_eq!(chr.image().get_pixel(0, 0), &BACKGROUND);
        assert_eq!(chr.image().get_pixel(99, 99), &BACKGROUND);

        // the cropped, unmasked texture is kept as a snapshot
        let snapshot = image::open(TEXTURE_SNAPSHOT).unwrap().to_rgba8();
        assert_eq!(snapshot.dimensions(), (100, 100));
        assert!(snapshot.pixels().all(|p| p == &Rgba([10, 200, 30, 255])));
    }

    #[test]
    fn test_add_background() {
        let chr = red_char('o');
        let bg = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([0, 0, 255])));
        let result = chr.add_background(&bg);
        assert_eq!(result.rect(), chr.rect());
        assert!(result.image().pixels().all(|p| p.0[3] == 255));
        assert_eq!(result.image().get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert!(result.image().pixels().any(|p| p == &Rgba([200, 10, 10, 255])));
        // the original is untouched
        assert_eq!(chr.image().get_pixel(0, 0), &BACKGROUND);

        // a smaller background leaves the rest transparent
        let small = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([0, 0, 255])));
        let result = chr.add_background(&small);
        assert_eq!(result.image().get_pixel(5, 5), &Rgba([0, 0, 255, 255]));
        assert_eq!(result.image().get_pixel(99, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_composite_over() {
        let half_red = Rgba([200, 10, 10, 128]);
        let pixel = |p: Rgba<u8>| {
            Char::new(
                'x',
                10.0,
                RgbaImage::from_pixel(1, 1, p),
                Rect::axis_aligned(0.0, 0.0, 0.0, 0.0),
                None,
            )
        };
        let bg = |p: Rgba<u8>| DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, p));

        let over = |src, dst| *pixel(src).add_background(&bg(dst)).image().get_pixel(0, 0);
        assert_eq!(over(half_red, Rgba([0, 0, 255, 255])), Rgba([100, 5, 132, 255]));
        assert_eq!(over(half_red, Rgba([0, 0, 0, 0])), half_red);
        assert_eq!(over(half_red, Rgba([0, 0, 255, 128])), Rgba([134, 7, 91, 192]));
        assert_eq!(over(BACKGROUND, Rgba([0, 0, 255, 255])), Rgba([0, 0, 255, 255]));
        assert_eq!(over(Rgba([1, 2, 3, 255]), Rgba([0, 0, 255, 255])), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_blur() {
        let chr = red_char('l');
        let blurred = chr.blur((5, 5));
        assert_eq!(blurred.rect(), chr.rect());
        assert_eq!(blurred.image().dimensions(), chr.image().dimensions());
        assert_ne!(blurred.image(), chr.image());
        // ink spreads past the old bounds
        assert!(ink_bounds(blurred.image()).unwrap().0 < ink_bounds(chr.image()).unwrap().0);

        let flat = Char::new(
            'x',
            10.0,
            RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 4])),
            Rect::axis_aligned(0.0, 0.0, 7.0, 7.0),
            None,
        );
        assert_eq!(flat.blur((3, 7)).image(), flat.image());
        assert_eq!(flat.blur((1, 1)).image(), flat.image());
        assert_eq!(flat.blur((0, 4)).image(), flat.image());
    }

    #[test]
    fn test_blur_even_kernel() {
        let mut row = RgbaImage::new(11, 1);
        row.put_pixel(5, 0, Rgba([200, 200, 200, 200]));
        let chr = Char::new('x', 10.0, row, Rect::axis_aligned(5.0, 0.0, 5.0, 0.0), None);

        let blurred = chr.blur((4, 1));
        let values: Vec<u8> = blurred.image().pixels().map(|p| p[0]).collect();
        assert_eq!(values, [0, 0, 0, 0, 50, 50, 50, 50, 0, 0, 0]);
        assert!(blurred.image().pixels().all(|p| p[0] == p[3]));

        let values: Vec<u8> = chr.blur((3, 1)).image().pixels().map(|p| p[0]).collect();
        assert_eq!(values, [0, 0, 0, 0, 67, 67, 67, 0, 0, 0, 0]);
    }

    #[test]
    fn test_identity_homography() {
        let chr = red_char('A').blur((3, 3));
        let warped = chr.apply_homography(chr.rect()).unwrap();
        assert_eq!(warped.rect(), chr.rect());
        let (width, height) = chr.image().dimensions();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let a = chr.image().get_pixel(x, y);
                let b = warped.image().get_pixel(x, y);
                for c in 0..4 {
                    let diff = (i16::from(a[c]) - i16::from(b[c])).abs();
                    assert!(diff <= 2, "({}, {}): {:?} vs {:?}", x, y, a, b);
                }
            }
        }
    }

    #[test]
    fn test_homography() {
        let chr = red_char('E');
        let [(x0, y0), _, _, (x1, y1)] = chr.rect().corners();
        let dst = Rect::new(x0 + 5.0, y0, x1, y0 + 8.0, x0, y1 - 3.0, x1 - 6.0, y1);
        let warped = chr.apply_homography(&dst).unwrap();
        assert_eq!(warped.rect(), &dst);
        assert_eq!(warped.image().dimensions(), (100, 100));
        assert_ne!(warped.image(), chr.image());

        // moved into an empty corner, the glyph is gone from the center
        let corner = Rect::axis_aligned(0.0, 0.0, 10.0, 10.0);
        let small = chr.apply_homography(&corner).unwrap();
        assert_eq!(small.image().get_pixel(50, 50).0[3], 0);
        let covered = small
            .image()
            .enumerate_pixels()
            .filter(|(x, y, p)| *x <= 10 && *y <= 10 && p.0[3] > 0)
            .count();
        assert!(covered > 10);

        let degenerate = Rect::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            chr.apply_homography(&degenerate),
            Err(GlyphError::Homography { .. })
        ));
    }

    #[test]
    fn test_warp_keeps_width_for_both_axes() {
        let chr = Char::new(
            'x',
            10.0,
            RgbaImage::from_pixel(20, 10, Rgba([0, 0, 0, 255])),
            Rect::axis_aligned(0.0, 0.0, 19.0, 9.0),
            None,
        );
        let warped = chr.apply_homography(chr.rect()).unwrap();
        assert_eq!(warped.image().dimensions(), (20, 20));
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k.png");
        let chr = red_char('k');
        chr.save(&path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(&loaded, chr.image());
    }
}
