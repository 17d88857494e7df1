//! The output grid written by the traversal and read by the encoders.

use imgref::ImgVec;
use log::warn;
use rgb::{RGB8, RGBA8};

use crate::color::AlphaMode;
use crate::error::PixmapError;
use crate::pixel::Bounds;

/// Dense RGBA8 grid covering a fixed coordinate region.
///
/// Storage is allocated once for the full region. [`Self::crop_extent`] can
/// only shrink the reported extent, which stays anchored at the region's
/// top-left corner.
#[derive(Clone, Debug)]
pub struct OutputBuffer {
    bounds: Bounds,
    width: usize,
    height: usize,
    alpha: AlphaMode,
    pixels: ImgVec<RGBA8>,
}

impl OutputBuffer {
    /// Allocate a transparent-black buffer covering `bounds`.
    pub fn new(bounds: Bounds, alpha: AlphaMode) -> Result<Self, PixmapError> {
        let w = bounds.width() as usize;
        let h = bounds.height() as usize;
        if w == 0 || h == 0 {
            return Err(PixmapError::InvalidDimensions {
                width: w as u32,
                height: h as u32,
            });
        }
        let len = w.checked_mul(h).ok_or(PixmapError::DimensionsTooLarge {
            width: w as u32,
            height: h as u32,
        })?;
        Ok(Self {
            bounds,
            width: w,
            height: h,
            alpha,
            pixels: ImgVec::new(vec![RGBA8::default(); len], w, h),
        })
    }

    /// Region the storage was allocated for.
    pub fn allocated_bounds(&self) -> Bounds {
        self.bounds
    }

    /// Region currently reported, after any crop.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.bounds.min_x,
            self.bounds.min_y,
            self.bounds.min_x + self.width as i32,
            self.bounds.min_y + self.height as i32,
        )
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    /// Stored value at absolute coordinates, if inside the reported extent.
    pub fn get(&self, x: i32, y: i32) -> Option<RGBA8> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        Some(self.pixels.buf()[self.index(x, y)])
    }

    /// Store `color` at absolute coordinates. The value is kept exactly as
    /// given, in this buffer's alpha convention.
    pub fn set(&mut self, x: i32, y: i32, color: RGBA8) -> Result<(), PixmapError> {
        if !self.bounds.contains(x, y) {
            return Err(PixmapError::CoordinateOutOfBounds {
                x,
                y,
                bounds: self.bounds,
            });
        }
        let idx = self.index(x, y);
        self.pixels.buf_mut()[idx] = color;
        Ok(())
    }

    /// Shrink the reported extent to `width` x `height`, clamped to
    /// `[0, allocated]`. Storage is never reallocated.
    pub fn crop_extent(&mut self, width: i32, height: i32) {
        let max_w = self.bounds.width();
        let max_h = self.bounds.height();
        if width > max_w || height > max_h {
            warn!(
                "requested {width}x{height} exceeds allocated {max_w}x{max_h}; clamping"
            );
        }
        self.width = width.clamp(0, max_w) as usize;
        self.height = height.clamp(0, max_h) as usize;
    }

    /// Rows of the reported extent, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[RGBA8]> + '_ {
        self.pixels
            .buf()
            .chunks(self.pixels.stride())
            .take(self.height)
            .map(move |row| &row[..self.width])
    }

    /// Whether every reported pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.rows().all(|row| row.iter().all(|p| p.a == 255))
    }

    /// Reported extent as straight-alpha RGBA bytes, row-major.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 4);
        for row in self.rows() {
            for &p in row {
                let c = self.alpha.to_straight(p);
                out.extend_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        }
        out
    }

    /// Reported extent as RGB bytes with alpha composited over black.
    pub fn to_opaque_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 3);
        for row in self.rows() {
            for &p in row {
                let RGB8 { r, g, b } = self.alpha.to_opaque_over_black(p);
                out.extend_from_slice(&[r, g, b]);
            }
        }
        out
    }

    fn index(&self, x: i32, y: i32) -> usize {
        let col = (x - self.bounds.min_x) as usize;
        let row = (y - self.bounds.min_y) as usize;
        row * self.pixels.stride() + col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_with_offset_bounds() {
        let mut buf = OutputBuffer::new(Bounds::new(10, 20, 13, 22), AlphaMode::Straight).unwrap();
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        buf.set(12, 21, RGBA8::new(1, 2, 3, 4)).unwrap();
        assert_eq!(buf.get(12, 21), Some(RGBA8::new(1, 2, 3, 4)));
        assert_eq!(buf.get(10, 20), Some(RGBA8::default()));
        assert_eq!(buf.get(0, 0), None);
    }

    #[test]
    fn empty_bounds_rejected() {
        assert!(OutputBuffer::new(Bounds::new(3, 3, 3, 8), AlphaMode::Straight).is_err());
    }

    #[test]
    fn out_of_bounds_write_fails() {
        let mut buf = OutputBuffer::new(Bounds::from_size(2, 2), AlphaMode::Straight).unwrap();
        match buf.set(2, 0, RGBA8::default()) {
            Err(PixmapError::CoordinateOutOfBounds { x: 2, y: 0, .. }) => {}
            other => panic!("expected CoordinateOutOfBounds, got {other:?}"),
        }
        assert!(buf.set(-1, 1, RGBA8::default()).is_err());
    }

    #[test]
    fn crop_shrinks_but_never_grows() {
        let mut buf = OutputBuffer::new(Bounds::from_size(4, 3), AlphaMode::Straight).unwrap();
        buf.set(3, 2, RGBA8::new(9, 9, 9, 9)).unwrap();
        buf.crop_extent(2, 2);
        assert_eq!(buf.bounds(), Bounds::new(0, 0, 2, 2));
        assert_eq!(buf.get(3, 2), None);
        assert_eq!(buf.rows().count(), 2);
        assert!(buf.rows().all(|row| row.len() == 2));

        buf.crop_extent(10, 10);
        assert_eq!(buf.bounds(), Bounds::new(0, 0, 4, 3));
        // storage survived the earlier crop
        assert_eq!(buf.get(3, 2), Some(RGBA8::new(9, 9, 9, 9)));

        buf.crop_extent(-5, 1);
        assert_eq!((buf.width(), buf.height()), (0, 1));
        assert_eq!(buf.allocated_bounds(), Bounds::from_size(4, 3));
    }

    #[test]
    fn export_converts_premultiplied() {
        let mut buf = OutputBuffer::new(Bounds::from_size(2, 1), AlphaMode::Premultiplied).unwrap();
        buf.set(0, 0, RGBA8::new(128, 50, 0, 128)).unwrap();
        buf.set(1, 0, RGBA8::new(10, 20, 30, 255)).unwrap();
        assert!(!buf.is_opaque());
        assert_eq!(buf.to_straight_rgba8(), vec![255, 100, 0, 128, 10, 20, 30, 255]);
        assert_eq!(buf.to_opaque_rgb8(), vec![128, 50, 0, 10, 20, 30]);
    }

    #[test]
    fn export_respects_crop() {
        let mut buf = OutputBuffer::new(Bounds::from_size(3, 2), AlphaMode::Straight).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                buf.set(x, y, RGBA8::new(x as u8, y as u8, 0, 255)).unwrap();
            }
        }
        buf.crop_extent(2, 1);
        assert!(buf.is_opaque());
        assert_eq!(buf.to_straight_rgba8(), vec![0, 0, 0, 255, 1, 0, 0, 255]);
    }
}
