use std::io::Cursor;
use std::path::Path;

use enough::Stop;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use log::debug;
use rgb::RGBA16;

use crate::color;
use crate::error::PixmapError;
use crate::limits::Limits;
use crate::pixel::{Bounds, saturate_i32};

/// A decoded image and the coordinate region it occupies.
#[derive(Clone, Debug)]
pub struct SourceImage {
    image: DynamicImage,
    format: ImageFormat,
    origin_x: i32,
    origin_y: i32,
}

impl SourceImage {
    /// Wrap an already decoded image, anchored at `(0, 0)`.
    pub fn new(image: DynamicImage, format: ImageFormat) -> Self {
        Self {
            image,
            format,
            origin_x: 0,
            origin_y: 0,
        }
    }

    pub fn bounds(&self) -> Bounds {
        let w = saturate_i32(self.image.width());
        let h = saturate_i32(self.image.height());
        Bounds::new(
            self.origin_x,
            self.origin_y,
            self.origin_x.saturating_add(w),
            self.origin_y.saturating_add(h),
        )
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Container format the pixels were decoded from.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Native color model of the decoded pixels.
    pub fn color_type(&self) -> ColorType {
        self.image.color()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Copy out a region. The region keeps the coordinates it had in this
    /// image, so its bounds generally do not start at `(0, 0)`.
    pub fn sub_image(&self, region: Bounds) -> Result<SourceImage, PixmapError> {
        let bounds = self.bounds();
        if !bounds.contains_bounds(&region) {
            return Err(PixmapError::CoordinateOutOfBounds {
                x: region.max_x,
                y: region.max_y,
                bounds,
            });
        }
        let image = self.image.crop_imm(
            (region.min_x - bounds.min_x) as u32,
            (region.min_y - bounds.min_y) as u32,
            region.width() as u32,
            region.height() as u32,
        );
        Ok(SourceImage {
            image,
            format: self.format,
            origin_x: region.min_x,
            origin_y: region.min_y,
        })
    }

    /// Straight 16-bit color at absolute coordinates; caller guarantees
    /// `(x, y)` lies within [`Self::bounds`].
    pub(crate) fn wide_at(&self, x: i32, y: i32) -> RGBA16 {
        color::widen(
            &self.image,
            (x - self.origin_x) as u32,
            (y - self.origin_y) as u32,
        )
    }
}

/// Builder for decoding image bytes, with format sniffing.
///
/// The format is detected from the content alone; file names never influence
/// which codec is used.
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, limits: None }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Detect the container format without decoding pixels.
    pub fn probe(&self) -> Result<ImageFormat, PixmapError> {
        image::guess_format(self.data).map_err(|_| PixmapError::UnrecognizedFormat)
    }

    pub fn decode(self, stop: &dyn Stop) -> Result<SourceImage, PixmapError> {
        let format = self.probe()?;
        if !codec_enabled(format) {
            debug!("no decoder built for {format:?}");
            return Err(PixmapError::UnrecognizedFormat);
        }
        stop.check()?;

        let mut reader = ImageReader::with_format(Cursor::new(self.data), format);
        if let Some(limits) = self.limits {
            reader.limits(limits.to_codec_limits());
        } else {
            reader.no_limits();
        }
        let image = reader.decode().map_err(|e| match e {
            image::ImageError::Limits(l) => PixmapError::LimitExceeded(l.to_string()),
            other => PixmapError::Decode(other),
        })?;

        if let Some(limits) = self.limits {
            limits.check(image.width(), image.height())?;
        }
        stop.check()?;

        debug!(
            "decoded {}x{} {:?} ({:?})",
            image.width(),
            image.height(),
            format,
            image.color()
        );
        Ok(SourceImage::new(image, format))
    }
}

/// Whether this build carries a decoder for `format`.
fn codec_enabled(format: ImageFormat) -> bool {
    match format {
        ImageFormat::Png => cfg!(feature = "png"),
        ImageFormat::Jpeg => cfg!(feature = "jpeg"),
        ImageFormat::Gif => cfg!(feature = "gif"),
        ImageFormat::Bmp => cfg!(feature = "bmp"),
        _ => false,
    }
}

/// Read and decode the file at `path`.
pub fn load(
    path: &Path,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<SourceImage, PixmapError> {
    let data = std::fs::read(path).map_err(|source| PixmapError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let request = DecodeRequest::new(&data);
    match limits {
        Some(limits) => request.with_limits(limits).decode(stop),
        None => request.decode(stop),
    }
}
