//! xpmconvert library
//!
//! Turns XPM pixmaps into MSX2 SCREEN5 (V9938 GRAPHICS4) or V9990 P1
//! palette and 4 bit pattern data.

pub mod cli;
pub mod config;
pub mod convert;
pub mod emit;
pub mod error;
pub mod pack;
pub mod palette;
pub mod preview;
pub mod rgb;
pub mod xpm;

pub use config::{Config, DataKind, OutputMode, Screen};
pub use convert::convert;
pub use error::{ConvertError, Result};
pub use pack::PackedImage;
pub use palette::{Palette, PaletteEntry};
pub use xpm::SourceImage;
