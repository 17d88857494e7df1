//! Color normalization between decoded source pixels, the canonical RGBA8
//! values seen by transforms, and the straight-alpha values fed to encoders.

use image::{DynamicImage, GenericImageView};
use rgb::{RGB8, RGBA8, RGBA16};

/// Alpha convention of the RGBA8 values handed to transforms and stored in
/// the output buffer.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    /// Color channels are independent of alpha.
    #[default]
    Straight,
    /// Color channels are pre-scaled by `a / 255`.
    Premultiplied,
}

impl AlphaMode {
    /// Convert a straight 16-bit source color into this convention.
    pub fn normalize(self, c: RGBA16) -> RGBA8 {
        match self {
            Self::Straight => RGBA8::new(narrow(c.r), narrow(c.g), narrow(c.b), narrow(c.a)),
            Self::Premultiplied => {
                let a = u32::from(c.a);
                RGBA8::new(
                    narrow(scale16(c.r, a)),
                    narrow(scale16(c.g, a)),
                    narrow(scale16(c.b, a)),
                    narrow(c.a),
                )
            }
        }
    }

    /// Convert a stored value in this convention to straight alpha.
    ///
    /// Premultiplied channels larger than alpha are clamped; fully
    /// transparent pixels become transparent black.
    pub fn to_straight(self, c: RGBA8) -> RGBA8 {
        match self {
            Self::Straight => c,
            Self::Premultiplied => match c.a {
                0 => RGBA8::new(0, 0, 0, 0),
                255 => c,
                a => RGBA8::new(unscale8(c.r, a), unscale8(c.g, a), unscale8(c.b, a), a),
            },
        }
    }

    /// Composite a stored value over black, for codecs without alpha.
    pub fn to_opaque_over_black(self, c: RGBA8) -> RGB8 {
        match self {
            Self::Premultiplied => RGB8::new(c.r, c.g, c.b),
            Self::Straight => RGB8::new(
                scale8(c.r, c.a),
                scale8(c.g, c.a),
                scale8(c.b, c.a),
            ),
        }
    }
}

/// Read the source pixel at `(x, y)` as straight 16-bit RGBA, whatever the
/// decoded color model is.
pub(crate) fn widen(image: &DynamicImage, x: u32, y: u32) -> RGBA16 {
    match image {
        DynamicImage::ImageLuma8(buf) => {
            let [l] = buf.get_pixel(x, y).0;
            let l = expand(l);
            RGBA16::new(l, l, l, u16::MAX)
        }
        DynamicImage::ImageLumaA8(buf) => {
            let [l, a] = buf.get_pixel(x, y).0;
            let l = expand(l);
            RGBA16::new(l, l, l, expand(a))
        }
        DynamicImage::ImageRgb8(buf) => {
            let [r, g, b] = buf.get_pixel(x, y).0;
            RGBA16::new(expand(r), expand(g), expand(b), u16::MAX)
        }
        DynamicImage::ImageRgba8(buf) => {
            let [r, g, b, a] = buf.get_pixel(x, y).0;
            RGBA16::new(expand(r), expand(g), expand(b), expand(a))
        }
        DynamicImage::ImageLuma16(buf) => {
            let [l] = buf.get_pixel(x, y).0;
            RGBA16::new(l, l, l, u16::MAX)
        }
        DynamicImage::ImageLumaA16(buf) => {
            let [l, a] = buf.get_pixel(x, y).0;
            RGBA16::new(l, l, l, a)
        }
        DynamicImage::ImageRgb16(buf) => {
            let [r, g, b] = buf.get_pixel(x, y).0;
            RGBA16::new(r, g, b, u16::MAX)
        }
        DynamicImage::ImageRgba16(buf) => {
            let [r, g, b, a] = buf.get_pixel(x, y).0;
            RGBA16::new(r, g, b, a)
        }
        DynamicImage::ImageRgb32F(buf) => {
            let [r, g, b] = buf.get_pixel(x, y).0;
            RGBA16::new(unit(r), unit(g), unit(b), u16::MAX)
        }
        DynamicImage::ImageRgba32F(buf) => {
            let [r, g, b, a] = buf.get_pixel(x, y).0;
            RGBA16::new(unit(r), unit(g), unit(b), unit(a))
        }
        other => {
            let [r, g, b, a] = other.get_pixel(x, y).0;
            RGBA16::new(expand(r), expand(g), expand(b), expand(a))
        }
    }
}

fn expand(v: u8) -> u16 {
    u16::from(v) * 257
}

/// Round a 16-bit channel to 8 bits.
fn narrow(v: u16) -> u8 {
    ((u32::from(v) * 255 + 32895) >> 16) as u8
}

fn unit(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

fn scale16(v: u16, a: u32) -> u16 {
    ((u32::from(v) * a + 32767) / 65535) as u16
}

fn scale8(v: u8, a: u8) -> u8 {
    ((u32::from(v) * u32::from(a) + 127) / 255) as u8
}

fn unscale8(v: u8, a: u8) -> u8 {
    let a = u32::from(a);
    ((u32::from(v) * 255 + a / 2) / a).min(255) as u8
}
