//! Output encodings: C listing, C header, raw dumps and the BASIC loader.

use std::io::{self, Write};

use crate::config::Screen;
use crate::error::{ConvertError, Result};
use crate::pack::PackedImage;
use crate::palette::PaletteEntry;

/// Transparency (YS) bit on the first palette byte of V9990 color 0.
pub const YS_BIT: u8 = 0x80;

/// Pattern bytes per line in C listings.
const BYTES_PER_LINE: usize = 12;

/// One V9990 palette register write, as stored in raw palette files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, dataview::Pod)]
#[repr(C)]
pub struct RawColor {
    r: u8,
    g: u8,
    b: u8,
}

impl RawColor {
    pub fn new(entry: &PaletteEntry, screen: Screen) -> Self {
        let ys = if screen == Screen::V9990 && entry.index == 0 {
            YS_BIT
        } else {
            0
        };
        RawColor {
            r: ys | entry.color.r,
            g: entry.color.g,
            b: entry.color.b,
        }
    }
}

/// Width/height prefix of BASIC image dumps, both little-endian u16.
#[derive(Clone, Copy, Debug, dataview::Pod)]
#[repr(C)]
struct DumpHeader {
    width: [u8; 2],
    height: [u8; 2],
}

impl DumpHeader {
    fn new(width: usize, height: usize) -> Result<Self> {
        let field = |name: &str, value: usize| {
            u16::try_from(value).map(u16::to_le_bytes).map_err(|_| {
                ConvertError::InvalidValue(format!("{name} {value} does not fit the BASIC dump header"))
            })
        };
        Ok(DumpHeader {
            width: field("width", width)?,
            height: field("height", height)?,
        })
    }
}

/// The two V9938 palette register bytes: `0RRR0BBB`, `00000GGG`.
pub fn v9938_register(entry: &PaletteEntry) -> [u8; 2] {
    [(entry.color.r << 4) | entry.color.b, entry.color.g]
}

/// Bytes one palette entry takes in C listings.
pub fn palette_entry_size(screen: Screen) -> usize {
    match screen {
        Screen::Screen5 => 2,
        Screen::V9990 => 3,
    }
}

/// Size of a packed pattern in bytes.
pub fn pattern_size(width: usize, height: usize) -> usize {
    width / 2 * height
}

/// C array literals for palette and/or pattern data.
pub fn write_listing<W: Write>(
    out: &mut W,
    symbol: &str,
    screen: Screen,
    palette: Option<&[PaletteEntry]>,
    image: Option<&PackedImage>,
) -> io::Result<()> {
    write!(out, "#include <stdint.h>\n\n")?;

    if let Some(entries) = palette {
        writeln!(
            out,
            "const uint8_t {symbol}_palette[{}] = {{",
            entries.len() * palette_entry_size(screen)
        )?;
        for entry in entries {
            let bytes: Vec<u8> = match screen {
                Screen::Screen5 => v9938_register(entry).to_vec(),
                Screen::V9990 => dataview::bytes(&RawColor::new(entry, screen)).to_vec(),
            };
            let bytes: Vec<String> = bytes.iter().map(|b| format!("0x{b:02X}")).collect();
            let o = entry.original;
            writeln!(
                out,
                "\t{}, /* {:02}: 0x{:02X}, 0x{:02X}, 0x{:02X} {}*/",
                bytes.join(","),
                entry.index,
                o.r,
                o.g,
                o.b,
                if entry.used { "" } else { "(not used) " }
            )?;
        }
        write!(out, "}};\n\n")?;
    }

    if let Some(image) = image {
        write!(
            out,
            "const uint8_t {symbol}_pattern[{}] = {{\n\t",
            image.bytes.len()
        )?;
        for (i, byte) in image.bytes.iter().enumerate() {
            if i > 0 && i % BYTES_PER_LINE == 0 {
                write!(out, "\n\t")?;
            }
            write!(out, "0x{byte:02X},")?;
        }
        if !image.bytes.is_empty() {
            writeln!(out)?;
        }
        write!(out, "}};\n\n")?;
    }
    Ok(())
}

/// Declarations matching [`write_listing`], for separate compilation.
pub fn write_header<W: Write>(
    out: &mut W,
    symbol: &str,
    define: &str,
    screen: Screen,
    palette_len: Option<usize>,
    geometry: Option<(usize, usize)>,
) -> io::Result<()> {
    write!(out, "#include <stdint.h>\n\n")?;
    if let Some(len) = palette_len {
        write!(
            out,
            "extern const uint8_t {symbol}_palette[{}];\n\n",
            len * palette_entry_size(screen)
        )?;
    }
    if let Some((width, height)) = geometry {
        writeln!(out, "#define {define}_WIDTH {width}")?;
        write!(out, "#define {define}_HEIGHT {height}\n\n")?;
        write!(
            out,
            "extern const uint8_t {symbol}_pattern[{}];\n\n",
            pattern_size(width, height)
        )?;
    }
    Ok(())
}

/// Three bytes per entry, ready for the palette port.
pub fn write_raw_palette<W: Write>(
    out: &mut W,
    screen: Screen,
    entries: &[PaletteEntry],
) -> io::Result<()> {
    for entry in entries {
        out.write_all(dataview::bytes(&RawColor::new(entry, screen)))?;
    }
    Ok(())
}

/// Packed pattern bytes as a plain VRAM dump.
pub fn write_raw_pattern<W: Write>(out: &mut W, image: &PackedImage) -> io::Result<()> {
    out.write_all(&image.bytes)
}

/// Pattern dump loadable with `COPY "file" TO (x,y)`.
pub fn write_basic_dump<W: Write>(out: &mut W, image: &PackedImage) -> Result<()> {
    let header = DumpHeader::new(image.width, image.height)?;
    out.write_all(dataview::bytes(&header))?;
    out.write_all(&image.bytes)?;
    Ok(())
}

/// MSX BASIC program setting up SCREEN 5, the palette and loading the
/// pattern dump named `image_file`.
pub fn write_basic<W: Write>(
    out: &mut W,
    palette: Option<&[PaletteEntry]>,
    image_file: Option<&str>,
) -> io::Result<()> {
    let mut line = 0;
    let mut next_line = || {
        line += 10;
        line
    };

    write!(out, "{} SCREEN 5\r\n", next_line())?;
    for entry in palette.unwrap_or_default() {
        let c = entry.color;
        write!(
            out,
            "{} COLOR=({},{},{},{})\r\n",
            next_line(),
            entry.index,
            c.r,
            c.g,
            c.b
        )?;
    }
    if let Some(file) = image_file {
        write!(
            out,
            "{} COPY \"{}\" TO (0,0),0\r\n",
            next_line(),
            file.to_ascii_uppercase()
        )?;
        let wait = next_line();
        write!(out, "{wait} IF INKEY$=\"\" GOTO {wait}\r\n")?;
    }
    Ok(())
}
