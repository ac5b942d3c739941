use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

pub const USAGE: &str =
    "Usage: phong-lab [scene.xml] [--summary-only] [--frames N] [--width W] [--height H] [--no-vsync]";

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// Runtime flags taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    /// Scene file; the built-in demo scene is used when absent.
    pub scene: Option<PathBuf>,
    pub summary_only: bool,
    /// Exit after rendering this many frames.
    pub frames: Option<u64>,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            scene: None,
            summary_only: false,
            frames: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
        }
    }
}

impl CliOptions {
    pub fn parse() -> Result<Self> {
        Self::from_args(std::env::args().skip(1))
    }

    /// Parses arguments without the program name.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--no-vsync" => options.vsync = false,
                "--frames" => options.frames = Some(parse_value(&mut args, "--frames")?),
                "--width" => options.width = parse_dimension(&mut args, "--width")?,
                "--height" => options.height = parse_dimension(&mut args, "--height")?,
                flag if flag.starts_with("--") => {
                    bail!("Unknown argument: {flag}\n{USAGE}");
                }
                path => {
                    if options.scene.is_some() {
                        bail!("Unexpected extra argument: {path}\n{USAGE}");
                    }
                    options.scene = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}

fn parse_value<T>(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = args
        .next()
        .ok_or_else(|| anyhow!("{flag} expects a value\n{USAGE}"))?;
    value
        .parse::<T>()
        .with_context(|| format!("invalid value `{value}` for {flag}"))
}

fn parse_dimension(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<u32> {
    let value: u32 = parse_value(args, flag)?;
    if value == 0 {
        bail!("{flag} must be greater than zero");
    }
    Ok(value)
}
