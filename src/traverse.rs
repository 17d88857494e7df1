//! Visits every source pixel, hands it to the transform and collects the
//! results into an [`OutputBuffer`].

use enough::Stop;
use log::debug;

use crate::buffer::OutputBuffer;
use crate::color::AlphaMode;
use crate::decode::SourceImage;
use crate::error::PixmapError;
use crate::pixel::Pixel;

/// Builder for one traversal of a source image.
pub struct TraverseRequest<'a> {
    source: &'a SourceImage,
    alpha: AlphaMode,
}

impl<'a> TraverseRequest<'a> {
    pub fn new(source: &'a SourceImage) -> Self {
        Self {
            source,
            alpha: AlphaMode::default(),
        }
    }

    /// Alpha convention for the pixels handed to the transform and for the
    /// values stored in the output.
    pub fn with_alpha(mut self, alpha: AlphaMode) -> Self {
        self.alpha = alpha;
        self
    }

    /// Run `transform` once per source coordinate.
    ///
    /// Columns are visited left to right and each column top to bottom. The
    /// pixel's color is stored at whatever `x`/`y` the transform leaves in
    /// it. The `image_w`/`image_h` left in the *last* visited pixel crop the
    /// output's reported extent; they can shrink it but never grow it.
    pub fn traverse<F>(self, mut transform: F, stop: &dyn Stop) -> Result<OutputBuffer, PixmapError>
    where
        F: FnMut(&mut Pixel),
    {
        let bounds = self.source.bounds();
        let mut out = OutputBuffer::new(bounds, self.alpha)?;
        let (mut new_w, mut new_h) = (bounds.width(), bounds.height());

        for x in bounds.min_x..bounds.max_x {
            if (x - bounds.min_x) % 16 == 0 {
                stop.check()?;
            }
            for y in bounds.min_y..bounds.max_y {
                let color = self.alpha.normalize(self.source.wide_at(x, y));
                let mut p = Pixel::at(&bounds, x, y, color);
                transform(&mut p);
                out.set(p.x, p.y, p.color())?;
                new_w = p.image_w;
                new_h = p.image_h;
            }
        }

        if (new_w, new_h) != (bounds.width(), bounds.height()) {
            debug!(
                "cropping output from {}x{} to {new_w}x{new_h}",
                bounds.width(),
                bounds.height()
            );
        }
        out.crop_extent(new_w, new_h);
        Ok(out)
    }
}
