use std::{io, num::ParseIntError, path::PathBuf, str::FromStr};

use clap::Parser;
use fontlib::{ImageGenerator, Rect};
use image::Rgb;
use serde::Deserialize;
use thiserror::*;

mod de;
use de::{
    deserialize_opt_bool, deserialize_opt_f32, deserialize_opt_path, deserialize_opt_string,
    deserialize_opt_u32,
};

/// The font used when none is given
pub const DEFAULT_FONT_FILE: &str = "fonts/DejaVuSans.ttf";
/// The letters exported when none are given
pub const DEFAULT_LETTERS: &str = "abcdefghijklmnopqrstuvwxyz";

const DEFAULT_FONT_SIZE: f32 = 100.0;
const DEFAULT_IMAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO Error")]
    Io(#[from] io::Error),
    #[error("Deserialize Error")]
    Ron(#[from] ron::error::Error),
}

/// Parameters of a letter export
#[derive(Debug, Default, Clone, Parser, Deserialize)]
#[serde(default)]
pub struct LetterScript {
    /// The font file to render with
    #[clap(long = "font")]
    #[serde(deserialize_with = "deserialize_opt_path")]
    pub font_file: Option<PathBuf>,
    /// The font size in pixels
    #[clap(long)]
    #[serde(deserialize_with = "deserialize_opt_f32")]
    pub font_size: Option<f32>,
    /// Width and height of the images
    #[clap(long)]
    #[serde(deserialize_with = "deserialize_opt_u32")]
    pub image_size: Option<u32>,
    /// Left margin, as a fraction of the letter width
    #[clap(long, allow_hyphen_values = true)]
    #[serde(deserialize_with = "deserialize_opt_f32")]
    pub margin_left: Option<f32>,
    /// Top margin, as a fraction of the letter height
    #[clap(long, allow_hyphen_values = true)]
    #[serde(deserialize_with = "deserialize_opt_f32")]
    pub margin_top: Option<f32>,
    /// Draw the letter boxes into the images
    #[clap(skip)]
    #[serde(deserialize_with = "deserialize_opt_bool")]
    pub draw_borders: Option<bool>,
    /// The letters to export, one image each
    #[clap(long)]
    #[serde(deserialize_with = "deserialize_opt_string")]
    pub letters: Option<String>,
}

impl LetterScript {
    /// Overwrite every value that is set in `other`
    pub fn merge(mut self, other: &LetterScript) -> Self {
        if let Some(font_file) = &other.font_file {
            self.font_file = Some(font_file.clone());
        }
        if let Some(font_size) = other.font_size {
            self.font_size = Some(font_size);
        }
        if let Some(image_size) = other.image_size {
            self.image_size = Some(image_size);
        }
        if let Some(margin_left) = other.margin_left {
            self.margin_left = Some(margin_left);
        }
        if let Some(margin_top) = other.margin_top {
            self.margin_top = Some(margin_top);
        }
        if let Some(draw_borders) = other.draw_borders {
            self.draw_borders = Some(draw_borders);
        }
        if let Some(letters) = &other.letters {
            self.letters = Some(letters.clone());
        }
        self
    }

    /// The letters to export
    pub fn letters(&self) -> &str {
        self.letters.as_deref().unwrap_or(DEFAULT_LETTERS)
    }

    /// Build the generator, filling in defaults
    pub fn generator(&self) -> ImageGenerator {
        let font_file = self
            .font_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_FILE));
        ImageGenerator::new(
            font_file,
            self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            self.image_size.unwrap_or(DEFAULT_IMAGE_SIZE),
        )
        .with_margins(
            self.margin_left.unwrap_or(0.0),
            self.margin_top.unwrap_or(0.0),
        )
        .with_borders(self.draw_borders.unwrap_or(true))
    }
}

#[derive(Parser, Debug)]
/// Export one labeled image per letter
pub struct LettersOpts {
    /// The output folder
    #[clap(long, short, default_value = "result")]
    pub out: PathBuf,
    /// Export parameters as a RON file
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Do not draw the letter boxes
    #[clap(long)]
    pub no_borders: bool,
    /// Export parameters passed as command line args
    #[clap(flatten)]
    pub cl_script: LetterScript,
}

impl LettersOpts {
    /// The parameters from the config file, overridden by the command line
    pub fn script(&self) -> Result<LetterScript, ScriptError> {
        let mut script = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let script: LetterScript = ron::from_str(&text)?;
                script.merge(&self.cl_script)
            }
            None => self.cl_script.clone(),
        };
        if self.no_borders {
            script.draw_borders = Some(false);
        }
        Ok(script)
    }
}

#[derive(Parser, Debug)]
/// Render a single character and transform it
pub struct RenderOpts {
    /// The character to render
    pub ch: char,
    /// The font file
    #[clap(long, default_value = "fonts/DejaVuSans.ttf")]
    pub font: PathBuf,
    /// The font size in pixels
    #[clap(long, default_value = "100")]
    pub size: f32,
    /// The canvas size, as `WIDTHxHEIGHT`
    #[clap(long, default_value = "100x100")]
    pub canvas: Size,
    /// The font color, as `R,G,B` or `#RRGGBB`
    #[clap(long)]
    pub color: Option<Color>,
    /// An image to texture the glyph with
    #[clap(long)]
    pub texture: Option<PathBuf>,
    /// An image to put behind the glyph
    #[clap(long)]
    pub background: Option<PathBuf>,
    /// Box-blur with a `WIDTHxHEIGHT` kernel
    #[clap(long)]
    pub blur: Option<Size>,
    /// Warp the glyph onto the quadrilateral `x0,y0,x1,y1,x2,y2,x3,y3`
    #[clap(long, allow_hyphen_values = true)]
    pub warp: Option<Rect>,
    /// Where to store the image
    #[clap(long, short, default_value = "char.png")]
    pub out: PathBuf,
}

#[derive(Debug, Error)]
/// Failed to parse a size or color
pub enum ParseArgError {
    /// Wrong number of parts
    #[error("Expected {expected} values separated by '{sep}'")]
    Parts {
        /// The number of parts needed
        expected: usize,
        /// The separator
        sep: char,
    },
    /// A part is not a number
    #[error("Invalid number: {0}")]
    Number(#[from] ParseIntError),
}

/// A `WIDTHxHEIGHT` pair
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Size(pub u32, pub u32);

impl FromStr for Size {
    type Err = ParseArgError;

    fn from_str(val: &str) -> Result<Self, Self::Err> {
        match val.split_once('x') {
            Some((w, h)) => Ok(Self(w.trim().parse()?, h.trim().parse()?)),
            None => Err(ParseArgError::Parts {
                expected: 2,
                sep: 'x',
            }),
        }
    }
}

/// An RGB color
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color(pub Rgb<u8>);

impl FromStr for Color {
    type Err = ParseArgError;

    fn from_str(val: &str) -> Result<Self, Self::Err> {
        if let Some(hex) = val.strip_prefix('#') {
            if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseArgError::Parts {
                    expected: 3,
                    sep: ',',
                });
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
            return Ok(Self(Rgb([channel(0)?, channel(2)?, channel(4)?])));
        }
        let parts = val
            .split(',')
            .map(|v| v.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()?;
        match parts[..] {
            [r, g, b] => Ok(Self(Rgb([r, g, b]))),
            _ => Err(ParseArgError::Parts {
                expected: 3,
                sep: ',',
            }),
        }
    }
}
