use std::path::Path;

use enough::Stop;
use image::ExtendedColorType;
use log::debug;

use crate::buffer::OutputBuffer;
use crate::error::PixmapError;

/// Output container, chosen from the destination file extension.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl OutputFormat {
    /// Map a lower-cased extension (with leading dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".png" => Some(Self::Png),
            ".jpg" | ".jpeg" => Some(Self::Jpeg),
            ".gif" => Some(Self::Gif),
            ".bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Pick the format for `path` by its extension, case-insensitively.
    ///
    /// Unknown extensions fail with [`PixmapError::UnsupportedFormat`]
    /// carrying the lower-cased extension including its dot (empty when the
    /// path has none).
    pub fn from_path(path: &Path) -> Result<Self, PixmapError> {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Self::from_extension(&ext).ok_or(PixmapError::UnsupportedFormat(ext))
    }

    /// Canonical extension, with leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Jpeg => ".jpg",
            Self::Gif => ".gif",
            Self::Bmp => ".bmp",
        }
    }
}

/// Builder for serializing an [`OutputBuffer`].
#[derive(Clone, Debug)]
pub struct EncodeRequest {
    format: OutputFormat,
    jpeg_quality: u8,
}

impl EncodeRequest {
    /// Highest JPEG quality, used unless overridden.
    pub const DEFAULT_JPEG_QUALITY: u8 = 100;

    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            jpeg_quality: Self::DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn for_path(path: &Path) -> Result<Self, PixmapError> {
        Ok(Self::new(OutputFormat::from_path(path)?))
    }

    /// JPEG quality in `1..=100`; ignored by other formats.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encode the buffer's reported extent.
    pub fn encode(&self, buffer: &OutputBuffer, stop: &dyn Stop) -> Result<Vec<u8>, PixmapError> {
        let (width, height) = (buffer.width(), buffer.height());
        if width == 0 || height == 0 {
            return Err(PixmapError::InvalidDimensions { width, height });
        }
        stop.check()?;

        let out = match self.format {
            #[cfg(feature = "png")]
            OutputFormat::Png => encode_png(buffer)?,
            #[cfg(feature = "jpeg")]
            OutputFormat::Jpeg => encode_jpeg(buffer, self.jpeg_quality)?,
            #[cfg(feature = "gif")]
            OutputFormat::Gif => encode_gif(buffer)?,
            #[cfg(feature = "bmp")]
            OutputFormat::Bmp => encode_bmp(buffer)?,
            #[allow(unreachable_patterns)]
            other => {
                return Err(PixmapError::UnsupportedFormat(
                    other.extension().to_string(),
                ));
            }
        };
        debug!(
            "encoded {width}x{height} as {:?}: {} bytes",
            self.format,
            out.len()
        );
        Ok(out)
    }
}

/// Opaque buffers are written without an alpha channel.
fn opaque_or_rgba(buffer: &OutputBuffer) -> (Vec<u8>, ExtendedColorType) {
    if buffer.is_opaque() {
        (buffer.to_opaque_rgb8(), ExtendedColorType::Rgb8)
    } else {
        (buffer.to_straight_rgba8(), ExtendedColorType::Rgba8)
    }
}

#[cfg(feature = "png")]
fn encode_png(buffer: &OutputBuffer) -> Result<Vec<u8>, PixmapError> {
    use image::ImageEncoder;
    use image::codecs::png::PngEncoder;

    let (pixels, color) = opaque_or_rgba(buffer);
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&pixels, buffer.width(), buffer.height(), color)
        .map_err(PixmapError::Encode)?;
    Ok(out)
}

#[cfg(feature = "jpeg")]
fn encode_jpeg(buffer: &OutputBuffer, quality: u8) -> Result<Vec<u8>, PixmapError> {
    use image::ImageEncoder;
    use image::codecs::jpeg::JpegEncoder;

    let pixels = buffer.to_opaque_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(&pixels, buffer.width(), buffer.height(), ExtendedColorType::Rgb8)
        .map_err(PixmapError::Encode)?;
    Ok(out)
}

#[cfg(feature = "gif")]
fn encode_gif(buffer: &OutputBuffer) -> Result<Vec<u8>, PixmapError> {
    use image::codecs::gif::GifEncoder;

    let pixels = buffer.to_straight_rgba8();
    let mut out = Vec::new();
    {
        // trailer is written when the encoder drops
        let mut encoder = GifEncoder::new(&mut out);
        encoder
            .encode(&pixels, buffer.width(), buffer.height(), ExtendedColorType::Rgba8)
            .map_err(PixmapError::Encode)?;
    }
    Ok(out)
}

#[cfg(feature = "bmp")]
fn encode_bmp(buffer: &OutputBuffer) -> Result<Vec<u8>, PixmapError> {
    use image::ImageEncoder;
    use image::codecs::bmp::BmpEncoder;

    let (pixels, color) = opaque_or_rgba(buffer);
    let mut out = Vec::new();
    BmpEncoder::new(&mut out)
        .write_image(&pixels, buffer.width(), buffer.height(), color)
        .map_err(PixmapError::Encode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::AlphaMode;
    use crate::pixel::Bounds;
    use enough::Unstoppable;
    use rgb::RGBA8;

    fn checker(w: u32, h: u32, alpha: u8) -> OutputBuffer {
        let mut buf = OutputBuffer::new(Bounds::from_size(w, h), AlphaMode::Straight).unwrap();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let c = if (x + y) % 2 == 0 {
                    RGBA8::new(250, 10, 10, alpha)
                } else {
                    RGBA8::new(10, 10, 250, alpha)
                };
                buf.set(x, y, c).unwrap();
            }
        }
        buf
    }

    #[test]
    fn format_from_path() {
        let f = |p: &str| OutputFormat::from_path(Path::new(p));
        assert_eq!(f("a/b.png").unwrap(), OutputFormat::Png);
        assert_eq!(f("photo.JPG").unwrap(), OutputFormat::Jpeg);
        assert_eq!(f("photo.jpeg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(f("anim.GiF").unwrap(), OutputFormat::Gif);
        assert_eq!(f("old.bmp").unwrap(), OutputFormat::Bmp);
    }

    #[test]
    fn unknown_extension_is_named() {
        match OutputFormat::from_path(Path::new("out.TIFF")) {
            Err(PixmapError::UnsupportedFormat(ext)) => assert_eq!(ext, ".tiff"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        match OutputFormat::from_path(Path::new("no_extension")) {
            Err(PixmapError::UnsupportedFormat(ext)) => assert_eq!(ext, ""),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        let err = OutputFormat::from_path(Path::new("out.tiff")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot create output file, unknown image type: .tiff"
        );
    }

    #[test]
    fn png_signature() {
        let out = EncodeRequest::new(OutputFormat::Png)
            .encode(&checker(3, 2, 255), &Unstoppable)
            .unwrap();
        assert_eq!(&out[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn jpeg_signature() {
        let out = EncodeRequest::for_path(Path::new("x.jpeg"))
            .unwrap()
            .encode(&checker(8, 8, 128), &Unstoppable)
            .unwrap();
        assert_eq!(&out[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn gif_signature() {
        let out = EncodeRequest::new(OutputFormat::Gif)
            .encode(&checker(4, 4, 255), &Unstoppable)
            .unwrap();
        assert_eq!(&out[..3], b"GIF");
        assert_eq!(out.last(), Some(&0x3B));
    }

    #[test]
    fn bmp_signature() {
        let out = EncodeRequest::new(OutputFormat::Bmp)
            .encode(&checker(3, 3, 255), &Unstoppable)
            .unwrap();
        assert_eq!(&out[..2], b"BM");
    }

    #[test]
    fn empty_extent_rejected() {
        let mut buf = checker(2, 2, 255);
        buf.crop_extent(0, 2);
        match EncodeRequest::new(OutputFormat::Png).encode(&buf, &Unstoppable) {
            Err(PixmapError::InvalidDimensions { width: 0, height: 2 }) => {}
            other => panic!("expected InvalidDimensions, got {other:?}"),
        }
    }

    #[test]
    fn jpeg_quality_is_clamped() {
        let req = EncodeRequest::new(OutputFormat::Jpeg).with_jpeg_quality(0);
        assert_eq!(req.jpeg_quality, 1);
        assert_eq!(
            EncodeRequest::new(OutputFormat::Jpeg).jpeg_quality,
            EncodeRequest::DEFAULT_JPEG_QUALITY
        );
    }
}
