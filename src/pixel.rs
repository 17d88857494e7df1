use core::fmt;

use rgb::RGBA8;

/// Rectangular coordinate region an image occupies. `max_*` are exclusive.
///
/// Decoded files always start at `(0, 0)`; sub-image regions keep the
/// coordinates of their parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds of a `width` x `height` image anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, saturate_i32(width), saturate_i32(height))
    }

    /// Horizontal extent, zero for inverted bounds.
    pub fn width(&self) -> i32 {
        (self.max_x - self.min_x).max(0)
    }

    /// Vertical extent, zero for inverted bounds.
    pub fn height(&self) -> i32 {
        (self.max_y - self.min_y).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Whether `other` lies entirely within these bounds.
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
            && other.min_x <= other.max_x
            && other.min_y <= other.max_y
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

pub(crate) fn saturate_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// One pixel handed to the transform.
///
/// The transform may change any field. Color channels are interpreted in the
/// [`crate::AlphaMode`] the traversal was configured with. Changing `x`/`y`
/// redirects where the color is stored; changing `image_w`/`image_h` proposes
/// a crop of the output (last visited pixel wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pixel {
    pub image_w: i32,
    pub image_h: i32,
    pub x: i32,
    pub y: i32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// Set an opaque color.
    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.set_rgba(r, g, b, 255);
    }

    pub fn set_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.r = r;
        self.g = g;
        self.b = b;
        self.a = a;
    }

    pub fn color(&self) -> RGBA8 {
        RGBA8::new(self.r, self.g, self.b, self.a)
    }

    pub(crate) fn at(bounds: &Bounds, x: i32, y: i32, color: RGBA8) -> Self {
        Self {
            image_w: bounds.width(),
            image_h: bounds.height(),
            x,
            y,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        }
    }
}
