//! # zenpixmap
//!
//! Per-pixel image transformation harness: decode an image, hand every pixel
//! to a transform closure, re-encode, write.
//!
//! ## Pipeline
//!
//! 1. **Load**: content-sniffed decode of PNG, JPEG, GIF or BMP
//!    ([`DecodeRequest`], [`load`]).
//! 2. **Normalize**: every source color model (gray, palette, RGB, 16-bit,
//!    float) becomes RGBA8 in the chosen [`AlphaMode`].
//! 3. **Traverse**: columns left to right, each column top to bottom; the
//!    transform receives a mutable [`Pixel`] ([`TraverseRequest`]).
//! 4. **Encode**: codec chosen by the output extension ([`EncodeRequest`]).
//! 5. **Write**: the bytes replace the output file, which may be the input.
//!
//! ## Cropping
//!
//! A transform may change `image_w`/`image_h`. Only the values left in the
//! last visited pixel (bottom-right corner) count, and they can only shrink
//! the output, anchored at its top-left corner. Set them the same way on
//! every pixel.
//!
//! ## Non-Goals
//!
//! - Codec implementations (the `image` crate does the format work)
//! - A library of transforms
//! - Parallel traversal (the crop rule depends on visit order)
//!
//! ## Usage
//!
//! ```no_run
//! use std::process::ExitCode;
//!
//! fn main() -> ExitCode {
//!     // `invert <input> [<output>]`
//!     zenpixmap::run(|p| p.set_rgba(255 - p.r, 255 - p.g, 255 - p.b, p.a))
//! }
//! ```
//!
//! Or drive the stages directly:
//!
//! ```no_run
//! use zenpixmap::{AlphaMode, DecodeRequest, EncodeRequest, OutputFormat, TraverseRequest};
//! use enough::Unstoppable;
//!
//! let data: &[u8] = &[]; // your PNG/JPEG/GIF/BMP bytes
//! let source = DecodeRequest::new(data).decode(&Unstoppable)?;
//! let output = TraverseRequest::new(&source)
//!     .with_alpha(AlphaMode::Premultiplied)
//!     .traverse(|p| p.a /= 2, &Unstoppable)?;
//! let png = EncodeRequest::new(OutputFormat::Png).encode(&output, &Unstoppable)?;
//! # Ok::<(), zenpixmap::PixmapError>(())
//! ```

#![forbid(unsafe_code)]

mod buffer;
mod color;
mod decode;
mod encode;
mod error;
mod limits;
mod pixel;
mod run;
mod traverse;

// Re-exports
pub use buffer::OutputBuffer;
pub use color::AlphaMode;
pub use decode::{DecodeRequest, SourceImage, load};
pub use encode::{EncodeRequest, OutputFormat};
pub use enough::{Stop, Unstoppable};
pub use error::PixmapError;
pub use limits::Limits;
pub use pixel::{Bounds, Pixel};
pub use run::{Invocation, Outcome, Pipeline, RunSummary, run, run_premultiplied, usage};
pub use traverse::TraverseRequest;
