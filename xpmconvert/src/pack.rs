//! 4 bit pixel packing: two hardware color indexes per byte, left pixel in
//! the high nibble.

use crate::error::{ConvertError, Result};
use crate::palette::Palette;
use crate::xpm::SourceImage;

pub fn pack_pair(left: u8, right: u8) -> u8 {
    (left << 4) | (right & 0x0f)
}

pub fn unpack_pair(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0f)
}

/// Pixel key to hardware index resolution.
///
/// Remembers the last entry hit, so runs of identical pixels skip the scan.
pub struct ColorLookup<'a> {
    palette: &'a Palette,
    cached: Option<usize>,
}

impl<'a> ColorLookup<'a> {
    pub fn new(palette: &'a Palette) -> Self {
        ColorLookup {
            palette,
            cached: None,
        }
    }

    pub fn find(&mut self, key: &[u8]) -> Result<u8> {
        let entries = self.palette.entries();
        if let Some(i) = self.cached {
            if entries[i].matches(key) {
                return Ok(entries[i].index);
            }
        }
        match entries.iter().position(|e| e.matches(key)) {
            Some(i) => {
                self.cached = Some(i);
                Ok(entries[i].index)
            }
            None => Err(ConvertError::InvalidValue(format!(
                "color index '{}' unknown",
                String::from_utf8_lossy(key)
            ))),
        }
    }
}

/// Packed pattern data, `width / 2` bytes per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedImage {
    pub width: usize,
    pub height: usize,
    pub bytes: Vec<u8>,
}

impl PackedImage {
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.width / 2;
        &self.bytes[y * stride..(y + 1) * stride]
    }

    /// Hardware index of the pixel at (x, y).
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        let (left, right) = unpack_pair(self.row(y)[x / 2]);
        if x % 2 == 0 { left } else { right }
    }
}

/// Pack one row of pixel keys. `keys` must hold an even number of keys.
pub fn pack_row<'k>(
    mut keys: impl Iterator<Item = &'k [u8]>,
    lookup: &mut ColorLookup<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    while let Some(left) = keys.next() {
        let left = lookup.find(left)?;
        let right = match keys.next() {
            Some(key) => lookup.find(key)?,
            None => 0,
        };
        out.push(pack_pair(left, right));
    }
    Ok(())
}

/// Pack every image row top to bottom, the palette marker row excluded.
pub fn pack_image(
    source: &SourceImage,
    palette: &Palette,
    contains_palette: bool,
) -> Result<PackedImage> {
    let rows = source.image_rows(contains_palette);
    let mut lookup = ColorLookup::new(palette);
    let mut bytes = Vec::with_capacity(source.width / 2 * rows.len());
    for row in rows {
        pack_row(source.pixels(row), &mut lookup, &mut bytes)?;
    }
    Ok(PackedImage {
        width: source.width,
        height: rows.len(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DataKind};

    #[test]
    fn nibble_pairs_survive_packing() {
        for left in 0..16u8 {
            for right in 0..16u8 {
                assert_eq!(unpack_pair(pack_pair(left, right)), (left, right));
            }
        }
    }

    fn build(lines: &[&str]) -> (SourceImage, Palette) {
        let source = SourceImage::from_lines(lines).unwrap();
        let palette = Palette::build(&source, &Config::new("TEST", DataKind::Both)).unwrap();
        (source, palette)
    }

    #[test]
    fn packs_two_pixels_per_byte() {
        let (source, palette) = build(&["4 2 2 1", ".\tc None", "X\tc #FF0000", "X.X.", "XXXX"]);
        let image = pack_image(&source, &palette, false).unwrap();
        assert_eq!(image.bytes, vec![0x10, 0x10, 0x11, 0x11]);
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.pixel(0, 0), 1);
        assert_eq!(image.pixel(1, 0), 0);
        assert_eq!(image.row(1), &[0x11u8, 0x11]);
    }

    #[test]
    fn marker_row_skipped() {
        let (source, palette) = build(&["2 2 2 1", "a\tc #000000", "b\tc #FFFFFF", "ab", "bb"]);
        let image = pack_image(&source, &palette, true).unwrap();
        assert_eq!(image.height, 1);
        assert_eq!(image.bytes, vec![0x22]);
    }

    #[test]
    fn multi_char_keys() {
        let (source, palette) =
            build(&["2 1 2 2", "ab\tc #000000", "ba\tc #FFFFFF", "baab"]);
        let image = pack_image(&source, &palette, false).unwrap();
        assert_eq!(image.bytes, vec![0x21]);
    }

    #[test]
    fn unknown_pixel_is_fatal() {
        let (source, palette) = build(&["2 1 2 1", "a\tc #000000", "b\tc bogus-color", "ab"]);
        let err = pack_image(&source, &palette, false).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn ignored_entries_never_match() {
        let source = SourceImage::from_lines(&["2 1 2 1", "a\tc #000000", "b\tc #FFFFFF", "aa"])
            .unwrap();
        let mut config = Config::new("TEST", DataKind::Both);
        config.keep_unused = true;
        let palette = Palette::build(&source, &config).unwrap();
        let mut lookup = ColorLookup::new(&palette);
        assert_eq!(lookup.find(b"a").unwrap(), 1);
        assert!(lookup.find(b"b").is_err());
        // cache hit
        assert_eq!(lookup.find(b"a").unwrap(), 1);
    }

    #[test]
    fn transparent_pixels_hit_slot_zero_repeatedly() {
        let (source, palette) = build(&["4 1 2 1", ".\tc None", "X\tc #FF0000", "..X."]);
        let image = pack_image(&source, &palette, false).unwrap();
        assert_eq!(image.bytes, vec![0x00, 0x10]);
    }
}
