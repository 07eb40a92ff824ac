use std::path::PathBuf;

use crate::rgb::Rgb;

/// Target video hardware.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    /// MSX2 SCREEN5, V9938 GRAPHICS4: 3 bit channels.
    #[default]
    Screen5,
    /// GFX9000 pattern mode, V9990 P1: 5 bit channels.
    V9990,
}

impl Screen {
    /// Largest channel value the palette registers accept.
    pub fn max_component(self) -> u8 {
        match self {
            Screen::Screen5 => 7,
            Screen::V9990 => 31,
        }
    }

    /// Palette slots, the transparent slot included.
    pub fn max_colors(self) -> usize {
        match self {
            Screen::Screen5 | Screen::V9990 => 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataKind {
    Palette,
    Image,
    Both,
}

impl DataKind {
    pub fn from_flags(palette: bool, image: bool) -> Option<Self> {
        match (palette, image) {
            (true, true) => Some(DataKind::Both),
            (true, false) => Some(DataKind::Palette),
            (false, true) => Some(DataKind::Image),
            (false, false) => None,
        }
    }

    pub fn has_palette(self) -> bool {
        matches!(self, DataKind::Palette | DataKind::Both)
    }

    pub fn has_image(self) -> bool {
        matches!(self, DataKind::Image | DataKind::Both)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// C array literals on stdout.
    #[default]
    Listing,
    /// C declarations only, no data.
    Header,
    /// Bytes straight into the output file.
    Raw,
    /// BASIC loader on stdout, image dump into the output file.
    Basic,
}

/// One run of the converter, fixed before any data is computed.
#[derive(Clone, Debug)]
pub struct Config {
    /// Prefix of generated symbols and diagnostics.
    pub label: String,
    pub screen: Screen,
    pub data: DataKind,
    pub mode: OutputMode,
    pub file: Option<PathBuf>,
    pub keep_unused: bool,
    pub contains_palette: bool,
    pub trans_color: Option<Rgb>,
    pub change_to_black: Option<u8>,
    pub skip0: bool,
    pub preview: Option<PathBuf>,
    pub preview_palette: Option<PathBuf>,
}

impl Config {
    pub fn new(label: impl Into<String>, data: DataKind) -> Self {
        Config {
            label: label.into(),
            screen: Screen::default(),
            data,
            mode: OutputMode::default(),
            file: None,
            keep_unused: false,
            contains_palette: false,
            trans_color: None,
            change_to_black: None,
            skip0: false,
            preview: None,
            preview_palette: None,
        }
    }

    /// Uppercased `#define` prefix.
    pub fn define_prefix(&self) -> String {
        self.label.to_ascii_uppercase()
    }

    /// Lowercased array name prefix.
    pub fn symbol_prefix(&self) -> String {
        self.label.to_ascii_lowercase()
    }
}

/// Turn an arbitrary name into a C identifier.
pub fn sanitize_label(name: &str) -> String {
    let mut label: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if label.is_empty() || label.starts_with(|c: char| c.is_ascii_digit()) {
        label.insert(0, '_');
    }
    label
}
