//! Color values and the X11 color-name table XPM files may refer to.

use std::collections::HashMap;
use std::sync::OnceLock;

/// The X11 `rgb.txt` database, one `R G B name` per line.
static RGB_TXT: &str = include_str!("rgb.txt");

static COLOR_NAMES: OnceLock<HashMap<String, Rgb>> = OnceLock::new();

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Quantize every 8 bit channel down to `0..=max`, rounding to nearest.
    ///
    /// `max` is 7 for 3 bit channels and 31 for 5 bit channels.
    pub fn scale(self, max: u8) -> Rgb {
        let scale = |v: u8| ((u16::from(v) * u16::from(max) + 127) / 255) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Reverse of [`Rgb::scale`]: stretch `0..=max` channels back to 8 bits
    /// so the hardware color can be looked at on a modern display.
    pub fn expand(self, max: u8) -> Rgb {
        let max = u16::from(max.max(1));
        let expand = |v: u8| ((u16::from(v) * 255 + max / 2) / max).min(255) as u8;
        Rgb::new(expand(self.r), expand(self.g), expand(self.b))
    }
}

/// What a color definition of an XPM resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpec {
    /// `None`: the alpha channel.
    Transparent,
    Rgb(Rgb),
}

/// Parse `#RGB`, `#RRGGBB`, `#RRRRGGGGBBBB`, `None` or an X11 color name.
pub fn parse_color_spec(spec: &str) -> Option<ColorSpec> {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("none") {
        return Some(ColorSpec::Transparent);
    }
    match spec.strip_prefix('#') {
        Some(hex) => parse_hex(hex).map(ColorSpec::Rgb),
        None => lookup_name(spec).map(ColorSpec::Rgb),
    }
}

/// Parse a hex triple without the leading `#`.
pub fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.is_empty() || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = match hex.len() {
        3 | 6 | 12 => hex.len() / 3,
        _ => return None,
    };
    let channel = |i: usize| -> Option<u8> {
        let field = &hex[i * digits..(i + 1) * digits];
        // only the high byte of 16 bit channels survives
        let field = &field[..digits.min(2)];
        let v = u8::from_str_radix(field, 16).ok()?;
        Some(if digits == 1 { v * 17 } else { v })
    };
    Some(Rgb::new(channel(0)?, channel(1)?, channel(2)?))
}

/// Case and space insensitive lookup in the X11 color database.
pub fn lookup_name(name: &str) -> Option<Rgb> {
    color_names().get(&normalize_name(name)).copied()
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn color_names() -> &'static HashMap<String, Rgb> {
    COLOR_NAMES.get_or_init(|| {
        let mut names = HashMap::new();
        for line in RGB_TXT.lines() {
            if line.starts_with('!') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let mut channel = || fields.next().and_then(|v| v.parse::<u8>().ok());
            let (Some(r), Some(g), Some(b)) = (channel(), channel(), channel()) else {
                continue;
            };
            let name: String = fields.collect();
            if !name.is_empty() {
                names.entry(normalize_name(&name)).or_insert(Rgb::new(r, g, b));
            }
        }
        names
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(parse_hex("FF0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_hex("0a0B0c"), Some(Rgb::new(10, 11, 12)));
        assert_eq!(parse_hex("f80"), Some(Rgb::new(255, 136, 0)));
        assert_eq!(parse_hex("FFFF80800000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(parse_hex("FF00"), None);
        assert_eq!(parse_hex("GG0000"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn names_ignore_case_and_spaces() {
        assert_eq!(lookup_name("white"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(lookup_name("ghost white"), Some(Rgb::new(248, 248, 255)));
        assert_eq!(lookup_name("GhostWhite"), Some(Rgb::new(248, 248, 255)));
        assert_eq!(lookup_name("no such color"), None);
    }

    #[test]
    fn color_specs() {
        assert_eq!(parse_color_spec("None"), Some(ColorSpec::Transparent));
        assert_eq!(parse_color_spec("#00FF00"), Some(ColorSpec::Rgb(Rgb::new(0, 255, 0))));
        assert_eq!(parse_color_spec("red"), Some(ColorSpec::Rgb(Rgb::new(255, 0, 0))));
        assert_eq!(parse_color_spec("#zz"), None);
    }

    #[test]
    fn scaling_hits_channel_limits() {
        let white = Rgb::new(255, 255, 255);
        assert_eq!(white.scale(7), Rgb::new(7, 7, 7));
        assert_eq!(white.scale(31), Rgb::new(31, 31, 31));
        assert_eq!(Rgb::BLACK.scale(7), Rgb::BLACK);
        assert_eq!(Rgb::new(128, 64, 36).scale(7), Rgb::new(4, 2, 1));
    }

    #[test]
    fn scaling_is_deterministic() {
        for v in [0u8, 1, 17, 100, 128, 200, 254, 255] {
            let c = Rgb::new(v, v / 2, 255 - v);
            assert_eq!(c.scale(7), c.scale(7));
            assert_eq!(c.scale(31), c.scale(31));
        }
    }

    #[test]
    fn expand_reverses_scale_on_hardware_values() {
        for v in 0..=7u8 {
            let hw = Rgb::new(v, v, v);
            assert_eq!(hw.expand(7).scale(7), hw);
        }
        for v in 0..=31u8 {
            let hw = Rgb::new(v, 0, 31 - v);
            assert_eq!(hw.expand(31).scale(31), hw);
        }
    }
}
