//! # Glyph boundaries
//!
//! A [`Rect`] is a quadrilateral given by four corner points. It is used both
//! for the axis-aligned box around a freshly rendered glyph and for the
//! distorted outline after a perspective warp, so nothing here enforces
//! convexity or a particular winding.

use std::{fmt, num::ParseFloatError, str::FromStr};

use thiserror::Error;

/// A quadrilateral given by its four corners
///
/// Axis-aligned rectangles use the order top-left, top-right, bottom-left,
/// bottom-right.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    /// x of the first corner
    pub x0: f32,
    /// y of the first corner
    pub y0: f32,
    /// x of the second corner
    pub x1: f32,
    /// y of the second corner
    pub y1: f32,
    /// x of the third corner
    pub x2: f32,
    /// y of the third corner
    pub y2: f32,
    /// x of the fourth corner
    pub x3: f32,
    /// y of the fourth corner
    pub y3: f32,
}

impl Rect {
    /// Create a new quadrilateral from eight coordinates
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    ) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
        }
    }

    /// Create the axis-aligned rectangle spanning `left..=right` and `top..=bottom`
    pub const fn axis_aligned(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right, top, left, bottom, right, bottom)
    }

    /// Create a quadrilateral from its corner points
    pub const fn from_corners(corners: [(f32, f32); 4]) -> Self {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] = corners;
        Self::new(x0, y0, x1, y1, x2, y2, x3, y3)
    }

    /// The four corner points, in order
    pub const fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.x0, self.y0),
            (self.x1, self.y1),
            (self.x2, self.y2),
            (self.x3, self.y3),
        ]
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x0: {}, y0: {}, x1: {}, y1: {}, x2: {}, y2: {}, x3: {}, y3: {}}}",
            self.x0, self.y0, self.x1, self.y1, self.x2, self.y2, self.x3, self.y3
        )
    }
}

#[derive(Debug, Error)]
/// Failed to parse a quadrilateral
pub enum ParseRectError {
    /// Not exactly eight values
    #[error("Expected 8 comma-separated coordinates, got {0}")]
    Count(usize),
    /// One of the values is not a number
    #[error("Invalid coordinate: {0}")]
    Number(#[from] ParseFloatError),
}

impl FromStr for Rect {
    type Err = ParseRectError;

    /// Parses `x0,y0,x1,y1,x2,y2,x3,y3`
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let values = input
            .split(',')
            .map(|v| v.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()?;
        match values[..] {
            [x0, y0, x1, y1, x2, y2, x3, y3] => Ok(Self::new(x0, y0, x1, y1, x2, y2, x3, y3)),
            _ => Err(ParseRectError::Count(values.len())),
        }
    }
}

/// An axis-aligned box given by two opposite edges on each axis
///
/// The edges are not normalized: `x2 < x1` is a valid (inverted) box.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Bounds {
    /// Left edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

impl Bounds {
    /// Create new bounds
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The (signed) width
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// The (signed) height
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Turn the box into a quadrilateral
    pub const fn to_rect(self) -> Rect {
        Rect::axis_aligned(self.x1, self.y1, self.x2, self.y2)
    }
}

impl fmt::Display for Bounds {
    /// Writes the box as `x1 y1 x2 y2`, keeping a decimal point on every value
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} {:?}", self.x1, self.y1, self.x2, self.y2)
    }
}
