//! Command line parsing into a validated [`Config`].

use std::path::{Path, PathBuf};

use clap::Parser;
use clap::error::ErrorKind;

use crate::config::{Config, DataKind, OutputMode, Screen, sanitize_label};
use crate::error::{ConvertError, Result};
use crate::rgb::{Rgb, parse_hex};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// XPM file to convert.
    pub input: PathBuf,

    /// Outputs a SCREEN5 compatible image (256 width max. with 15 colors).
    #[arg(long, conflicts_with = "v9990")]
    pub screen5: bool,

    /// Outputs a P1 mode compatible image (V9990 graphics card).
    #[arg(long)]
    pub v9990: bool,

    /// Outputs palette too.
    #[arg(long)]
    pub palette: bool,

    /// Outputs image too.
    #[arg(long)]
    pub image: bool,

    /// Outputs both palette and image.
    #[arg(long)]
    pub both: bool,

    /// Outputs C-style header declarations, no data.
    #[arg(long, conflicts_with_all = ["raw", "basic"])]
    pub header: bool,

    /// Outputs raw file (RAM memory dump without dimension data).
    #[arg(long, value_name = "FILE", num_args = 0..=1, conflicts_with = "basic")]
    pub raw: Option<Option<PathBuf>>,

    /// Outputs BASIC to stdout and respective VRAM COPY to file.
    #[arg(long)]
    pub basic: bool,

    /// Binary output file for raw and BASIC modes.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Unused palette colors are still converted to output file.
    #[arg(long)]
    pub keep_unused: bool,

    /// Get palette colors and order from first disposable line of the image.
    #[arg(long)]
    pub contains_palette: bool,

    /// Supply hex string RRGGBB as a transparent color replacement.
    #[arg(long, value_name = "RRGGBB", value_parser = parse_trans_color)]
    pub trans_color: Option<Rgb>,

    /// Encode the given palette index as black.
    #[arg(long, value_name = "INDEX", value_parser = clap::value_parser!(u8).range(0..=15))]
    pub change_to_black: Option<u8>,

    /// Skip color 0 (transparent) in output files.
    #[arg(long)]
    pub skip0: bool,

    /// Symbol prefix for generated code (defaults to the XPM array name).
    #[arg(long)]
    pub label: Option<String>,

    /// Write a BMP of the converted image as the hardware shows it.
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,

    /// Write a BMP swatch sheet of the hardware palette.
    #[arg(long, value_name = "FILE")]
    pub preview_palette: Option<PathBuf>,

    /// Also log debug diagnostics.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_trans_color(value: &str) -> std::result::Result<Rgb, String> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    match parse_hex(hex) {
        Some(rgb) if hex.len() == 6 => Ok(rgb),
        _ => Err(format!("expects hex color RRGGBB, not \"{value}\"")),
    }
}

/// Exit code for a clap failure. `None` when clap printed help or version.
pub fn clap_exit_code(kind: ErrorKind) -> Option<u8> {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ErrorKind::MissingRequiredArgument
        | ErrorKind::InvalidValue
        | ErrorKind::WrongNumberOfValues
        | ErrorKind::TooFewValues => Some(1),
        ErrorKind::ArgumentConflict => Some(3),
        _ => Some(2),
    }
}

impl Args {
    pub fn mode(&self) -> OutputMode {
        if self.basic {
            OutputMode::Basic
        } else if self.raw.is_some() {
            OutputMode::Raw
        } else if self.header {
            OutputMode::Header
        } else {
            OutputMode::Listing
        }
    }

    /// Check flag combinations and settle the run configuration.
    pub fn into_config(self) -> Result<Config> {
        let data = DataKind::from_flags(self.palette || self.both, self.image || self.both)
            .ok_or_else(|| {
                ConvertError::ParameterExpected("no data type defined for output".to_string())
            })?;
        let mode = self.mode();
        let screen = if self.v9990 {
            Screen::V9990
        } else {
            Screen::Screen5
        };

        if data == DataKind::Both && mode == OutputMode::Raw {
            return Err(ConvertError::ModeMismatch(
                "raw mode expects a single output".to_string(),
            ));
        }
        if !data.has_palette() && self.keep_unused {
            return Err(ConvertError::ModeMismatch(
                "\"--keep-unused\" expects palette output".to_string(),
            ));
        }
        if !data.has_palette() && self.change_to_black.is_some() {
            return Err(ConvertError::ModeMismatch(
                "\"--change-to-black\" expects palette output".to_string(),
            ));
        }
        if mode == OutputMode::Basic && screen == Screen::V9990 {
            return Err(ConvertError::ModeMismatch(
                "BASIC mode expects SCREEN5 output".to_string(),
            ));
        }

        let file = match (self.raw.flatten(), self.file) {
            (Some(_), Some(_)) => {
                return Err(ConvertError::ParameterType(
                    "output file given twice, use either \"--raw <FILE>\" or \"--file\"".to_string(),
                ));
            }
            (raw, file) => raw.or(file),
        };
        if matches!(mode, OutputMode::Listing | OutputMode::Header) && file.is_some() {
            return Err(ConvertError::ParameterType(
                "file parameter expects \"--raw\" OR \"--basic\" mode only".to_string(),
            ));
        }
        if mode == OutputMode::Raw && file.is_none() {
            return Err(ConvertError::FileExpected(
                "RAW mode expects an output file".to_string(),
            ));
        }
        if mode == OutputMode::Basic && data.has_image() && file.is_none() {
            return Err(ConvertError::FileExpected(
                "BASIC mode expects an output file".to_string(),
            ));
        }

        let label = match self.label.as_deref() {
            Some(name) => sanitize_label(name),
            None => sanitize_label(&file_stem(&self.input)),
        };

        Ok(Config {
            label,
            screen,
            data,
            mode,
            file,
            keep_unused: self.keep_unused,
            contains_palette: self.contains_palette,
            trans_color: self.trans_color,
            change_to_black: self.change_to_black,
            skip0: self.skip0,
            preview: self.preview,
            preview_palette: self.preview_palette,
        })
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
