//! Invert the color channels of an image, keeping alpha.
//!
//! `zenpixmap-invert <input> [<output>]`

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    zenpixmap::run(|p| p.set_rgba(255 - p.r, 255 - p.g, 255 - p.b, p.a))
}
