//! Command-line contract and the end-to-end pipeline:
//! load, traverse, encode, write.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use enough::{Stop, Unstoppable};
use log::{debug, info};

use crate::color::AlphaMode;
use crate::decode::load;
use crate::encode::{EncodeRequest, OutputFormat};
use crate::error::PixmapError;
use crate::limits::Limits;
use crate::pixel::Pixel;
use crate::traverse::TraverseRequest;

#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
}

/// What the command line asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invocation {
    /// Transform `input` and write the result to `output`, which is the
    /// input path itself when only one argument was given.
    Process { input: PathBuf, output: PathBuf },
    /// Wrong argument count: print [`usage`] and do nothing else.
    Usage { program: String },
}

impl Invocation {
    /// Interpret a full argument list, program name first.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let program = program_name(args.first());
        // Operands are always paths, even `-x` or `--`; only their count matters.
        if !args.is_empty() {
            args.insert(1, OsString::from("--"));
        }
        match Args::try_parse_from(&args) {
            Ok(Args { input, output }) => {
                let output = output.unwrap_or_else(|| input.clone());
                Invocation::Process { input, output }
            }
            Err(e) => {
                debug!("not processing: {:?}", e.kind());
                Invocation::Usage { program }
            }
        }
    }
}

fn program_name(arg0: Option<&OsString>) -> String {
    arg0.map(Path::new)
        .and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// Usage text for `program`.
pub fn usage(program: &str) -> String {
    format!(
        "usage: {program} <input> [<output>]
  pass the input file as the first argument
  pass the output file as the second argument
  if you do not pass a second argument, output will overwrite the input file"
    )
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// How a run ended, when it did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Written(RunSummary),
    /// Argument count was wrong; carries the usage text.
    UsageRequested(String),
}

/// Configuration for load, traverse, encode and write.
#[derive(Clone, Debug)]
pub struct Pipeline {
    alpha: AlphaMode,
    limits: Option<Limits>,
    jpeg_quality: u8,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            alpha: AlphaMode::Straight,
            limits: None,
            jpeg_quality: EncodeRequest::DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_alpha(mut self, alpha: AlphaMode) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Interpret `args` (program name first) and process accordingly.
    pub fn run_args<I, T, F>(&self, args: I, transform: F) -> Result<Outcome, PixmapError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        F: FnMut(&mut Pixel),
    {
        match Invocation::from_args(args) {
            Invocation::Usage { program } => Ok(Outcome::UsageRequested(usage(&program))),
            Invocation::Process { input, output } => self
                .process(&input, &output, transform, &Unstoppable)
                .map(Outcome::Written),
        }
    }

    /// Load `input`, apply `transform` to every pixel, and write the result
    /// to `output` in the format its extension names.
    ///
    /// Nothing is written unless every earlier step succeeded.
    pub fn process<F>(
        &self,
        input: &Path,
        output: &Path,
        transform: F,
        stop: &dyn Stop,
    ) -> Result<RunSummary, PixmapError>
    where
        F: FnMut(&mut Pixel),
    {
        let source = load(input, self.limits.as_ref(), stop)?;
        let buffer = TraverseRequest::new(&source)
            .with_alpha(self.alpha)
            .traverse(transform, stop)?;
        let request = EncodeRequest::for_path(output)?.with_jpeg_quality(self.jpeg_quality);
        let bytes = request.encode(&buffer, stop)?;
        write_output(output, &bytes)?;

        info!(
            "wrote {} ({}x{}, {} bytes)",
            output.display(),
            buffer.width(),
            buffer.height(),
            bytes.len()
        );
        Ok(RunSummary {
            output: output.to_path_buf(),
            format: request.format(),
            width: buffer.width(),
            height: buffer.height(),
            bytes: bytes.len(),
        })
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), PixmapError> {
    std::fs::write(path, bytes).map_err(|source| PixmapError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Run the harness on the process arguments with straight alpha.
///
/// Usage and error messages go to standard output. A usage request exits
/// successfully; any failure exits with [`ExitCode::FAILURE`].
pub fn run<F>(transform: F) -> ExitCode
where
    F: FnMut(&mut Pixel),
{
    report(Pipeline::new().run_args(std::env::args_os(), transform))
}

/// Same as [`run`] with premultiplied alpha.
pub fn run_premultiplied<F>(transform: F) -> ExitCode
where
    F: FnMut(&mut Pixel),
{
    report(
        Pipeline::new()
            .with_alpha(AlphaMode::Premultiplied)
            .run_args(std::env::args_os(), transform),
    )
}

fn report(result: Result<Outcome, PixmapError>) -> ExitCode {
    match result {
        Ok(Outcome::UsageRequested(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Written(_)) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
