//! XPM loading: the header, the color definitions and the pixel rows.

use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::rgb::{ColorSpec, parse_color_spec};

/// Widest scanline the target video chips can hold.
pub const MAX_WIDTH: usize = 256;

/// Color contexts an XPM color line may carry. Only `c` is converted.
const COLOR_CONTEXTS: [&str; 5] = ["c", "m", "g", "g4", "s"];

#[derive(Clone, Debug)]
pub struct SourceImage {
    pub width: usize,
    pub height: usize,
    pub chars_per_pixel: usize,
    /// Color definition lines, `<key><ws>c <color>`.
    pub colors: Vec<String>,
    /// Pixel rows, `width * chars_per_pixel` characters each.
    pub rows: Vec<String>,
    /// Name of the C array the pixmap was declared as, if any.
    pub name: Option<String>,
}

/// One parsed color definition line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorDef<'a> {
    /// Index of the line inside the XPM string array (header is 0).
    pub line: usize,
    pub key: &'a [u8],
    /// The `c` value as written.
    pub value: String,
    pub spec: ColorSpec,
}

impl SourceImage {
    /// Build from the XPM string array: header, colors, then pixel rows.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let header = lines
            .first()
            .ok_or_else(|| ConvertError::InvalidValue("empty XPM data".to_string()))?
            .as_ref();
        let fields: Vec<usize> = header
            .split_whitespace()
            .take(4)
            .map(|v| v.parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| ConvertError::InvalidValue(format!("malformed XPM header \"{header}\"")))?;
        let [width, height, colors, chars_per_pixel] = fields[..] else {
            return Err(ConvertError::InvalidValue(format!(
                "XPM header \"{header}\" expects width, height, colors and characters per pixel"
            )));
        };
        if chars_per_pixel == 0 {
            return Err(ConvertError::InvalidValue(
                "XPM header declares zero characters per pixel".to_string(),
            ));
        }

        let expected = colors
            .checked_add(height)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| {
                ConvertError::InvalidValue(format!("XPM header \"{header}\" declares too many strings"))
            })?;
        if lines.len() < expected {
            return Err(ConvertError::InvalidValue(format!(
                "XPM data expects {expected} strings, got {}",
                lines.len()
            )));
        }

        let colors: Vec<String> = lines[1..=colors].iter().map(|s| s.as_ref().to_string()).collect();
        let rows: Vec<String> = lines[1 + colors.len()..expected]
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let row_len = width.checked_mul(chars_per_pixel).ok_or_else(|| {
            ConvertError::InvalidValue(format!("XPM header \"{header}\" declares oversized rows"))
        })?;
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() < row_len) {
            return Err(ConvertError::InvalidValue(format!(
                "pixel row {y} holds {} characters, expected {row_len}",
                row.len()
            )));
        }

        Ok(SourceImage {
            width,
            height,
            chars_per_pixel,
            colors,
            rows,
            name: None,
        })
    }

    /// Parse XPM3 (C source) or XPM2 (plain lines) text.
    pub fn parse(text: &str) -> Result<Self> {
        let (strings, name) = if text.trim_start().starts_with("! XPM2") {
            (xpm2_lines(text), None)
        } else {
            (c_strings(text), array_name(text))
        };
        let mut image = Self::from_lines(&strings)?;
        image.name = name;
        Ok(image)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Width must be even (two pixels per byte) and fit one scanline.
    pub fn validate_geometry(&self) -> Result<()> {
        if self.width & 1 != 0 {
            return Err(ConvertError::InvalidValue("expects even width".to_string()));
        }
        if self.width > MAX_WIDTH {
            return Err(ConvertError::InvalidValue(format!(
                "expects maximum width of {MAX_WIDTH} pixels"
            )));
        }
        Ok(())
    }

    /// Rows holding image data, skipping the palette marker row if present.
    pub fn image_rows(&self, contains_palette: bool) -> &[String] {
        let skip = usize::from(contains_palette).min(self.rows.len());
        &self.rows[skip..]
    }

    pub fn image_height(&self, contains_palette: bool) -> usize {
        self.image_rows(contains_palette).len()
    }

    /// The fixed-width pixel keys of one row.
    pub fn pixels<'a>(&self, row: &'a str) -> impl Iterator<Item = &'a [u8]> + use<'a> {
        let width = self.width;
        row.as_bytes().chunks_exact(self.chars_per_pixel).take(width)
    }

    /// Whether any pixel cell of any row (marker row included) is `key`.
    pub fn uses_key(&self, key: &[u8]) -> bool {
        self.rows.iter().any(|row| self.pixels(row).any(|px| px == key))
    }

    /// Parse every color line. Lines that cannot be understood are reported
    /// and left out.
    pub fn color_defs(&self) -> Vec<ColorDef<'_>> {
        self.colors
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let def = parse_color_line(line, self.chars_per_pixel, i + 1);
                if def.is_none() {
                    tracing::warn!("parse error at \"{line}\" (line {}): color ignored", i + 1);
                }
                def
            })
            .collect()
    }
}

fn parse_color_line(line: &str, chars_per_pixel: usize, index: usize) -> Option<ColorDef<'_>> {
    let key = line.as_bytes().get(..chars_per_pixel)?;
    let rest = line.get(chars_per_pixel..)?;
    let words: Vec<&str> = rest.split_whitespace().collect();
    let start = words.iter().position(|w| *w == "c")? + 1;
    let end = words[start..]
        .iter()
        .position(|w| COLOR_CONTEXTS.contains(w))
        .map_or(words.len(), |p| start + p);
    if start == end {
        return None;
    }
    let value = words[start..end].join(" ");
    let spec = parse_color_spec(&value)?;
    Some(ColorDef {
        line: index,
        key,
        value,
        spec,
    })
}

/// Every C string literal in the text, comments skipped.
fn c_strings(text: &str) -> Vec<String> {
    let mut strings = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' => {
                let mut s = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some('t') => s.push('\t'),
                            Some('n') => s.push('\n'),
                            Some(other) => s.push(other),
                            None => break,
                        },
                        _ => s.push(c),
                    }
                }
                strings.push(s);
            }
            _ => {}
        }
    }
    strings
}

fn xpm2_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.is_empty() && !l.starts_with('!'))
        .map(str::to_string)
        .collect()
}

/// `static char *name_xpm[] = {` gives `name_xpm`.
fn array_name(text: &str) -> Option<String> {
    let decl = text.split('[').next()?;
    if !decl.contains("char") {
        return None;
    }
    let name: String = decl
        .trim_end()
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    (!name.is_empty()).then_some(name)
}
