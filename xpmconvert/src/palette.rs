//! Hardware palette construction.
//!
//! Color lines are registered in file order. Slot 0 holds the transparent
//! color when there is one, every other used color takes the next free
//! slot. The result is read-only once built.

use crate::config::{Config, Screen};
use crate::error::{ConvertError, Result};
use crate::rgb::{ColorSpec, Rgb};
use crate::xpm::{ColorDef, SourceImage};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Hardware color index, 0..=15.
    pub index: u8,
    /// Color at the hardware channel depth.
    pub color: Rgb,
    /// The 8 bit color it came from.
    pub original: Rgb,
    /// Pixel key identifying the color in the pixel rows.
    pub key: Option<Vec<u8>>,
    /// False for colors kept in the palette without appearing in the image.
    pub used: bool,
}

impl PaletteEntry {
    fn new(index: u8, original: Rgb, key: &[u8], used: bool, screen: Screen) -> Self {
        PaletteEntry {
            index,
            color: original.scale(screen.max_component()),
            original,
            key: Some(key.to_vec()),
            used,
        }
    }

    /// Slot 0 before (or without) a transparent color claiming it.
    fn reserved() -> Self {
        PaletteEntry {
            index: 0,
            color: Rgb::BLACK,
            original: Rgb::BLACK,
            key: None,
            used: false,
        }
    }

    fn set_original(&mut self, original: Rgb, screen: Screen) {
        self.original = original;
        self.color = original.scale(screen.max_component());
    }

    /// Whether pixels spelled `key` map onto this entry.
    pub fn matches(&self, key: &[u8]) -> bool {
        self.used && self.key.as_deref() == Some(key)
    }
}

#[derive(Clone, Debug)]
pub struct Palette {
    pub screen: Screen,
    entries: Vec<PaletteEntry>,
    discarded: usize,
}

impl Palette {
    pub fn build(source: &SourceImage, config: &Config) -> Result<Palette> {
        source.validate_geometry()?;

        let screen = config.screen;
        let budget = screen.max_colors();
        let label = config.label.as_str();
        let defs = source.color_defs();

        let is_transparent = |def: &ColorDef<'_>| match def.spec {
            ColorSpec::Transparent => true,
            ColorSpec::Rgb(rgb) => config.trans_color == Some(rgb),
        };

        let mut entries = Vec::with_capacity(budget);
        if screen == Screen::Screen5
            || config.trans_color.is_some()
            || defs.iter().any(|d| d.spec == ColorSpec::Transparent)
        {
            entries.push(PaletteEntry::reserved());
        }

        let mut transparent_found = false;
        let mut discarded = 0;
        // used colors past the budget, counted but never given an index
        let mut overflow = 0;

        for def in &defs {
            let original = match def.spec {
                ColorSpec::Transparent => Rgb::BLACK,
                ColorSpec::Rgb(rgb) => rgb,
            };
            // entries never outgrow the 16 slot budget
            let next = entries.len() as u8;

            if is_transparent(def) {
                if def.spec == ColorSpec::Transparent && config.trans_color.is_some() {
                    tracing::warn!("{label}: both alpha channel and transparent color defined");
                }
                if !transparent_found {
                    transparent_found = true;
                    entries[0] = PaletteEntry::new(0, original, def.key, true, screen);
                    log_registration(label, def, 0, true);
                    tracing::info!("{label}: transparent color at line {} found", def.line);
                } else {
                    tracing::warn!(
                        "{label}: transparent color repeated at line {} will be ignored",
                        def.line
                    );
                    if config.keep_unused && entries.len() < budget {
                        entries.push(PaletteEntry::new(next, original, def.key, false, screen));
                        log_registration(label, def, next, false);
                    }
                }
            } else if source.uses_key(def.key) {
                if entries.len() < budget {
                    entries.push(PaletteEntry::new(next, original, def.key, true, screen));
                    log_registration(label, def, next, true);
                } else {
                    overflow += 1;
                }
            } else if config.keep_unused && entries.len() < budget {
                entries.push(PaletteEntry::new(next, original, def.key, false, screen));
                log_registration(label, def, next, false);
            } else {
                tracing::warn!(
                    "{label}: unused color at line {} (\"{}\") found",
                    def.line,
                    def.value
                );
                discarded += 1;
            }
        }

        if let Some(rgb) = config.trans_color {
            entries[0].set_original(rgb, screen);
            if !transparent_found {
                tracing::warn!(
                    "{label}: transparent color #{:02X}{:02X}{:02X} not found in palette",
                    rgb.r,
                    rgb.g,
                    rgb.b
                );
            }
        }

        if !config.keep_unused {
            tracing::info!("{label}: {discarded} color(s) discarded");
        }
        let total = entries.len() + overflow;
        tracing::info!("{label}: number of colors: {total}");

        if total > budget {
            let reason = match screen {
                Screen::Screen5 => format!(
                    "expects max of {} used colors, got {total} (first color (0) is transparent)",
                    budget - 1
                ),
                Screen::V9990 => format!("expects max of {budget} used colors, got {total}"),
            };
            return Err(ConvertError::InvalidValue(format!("{label}: {reason}")));
        }

        let mut palette = Palette {
            screen,
            entries,
            discarded,
        };
        if let Some(index) = config.change_to_black {
            palette.change_to_black(index, label)?;
        }
        Ok(palette)
    }

    fn change_to_black(&mut self, index: u8, label: &str) -> Result<()> {
        let len = self.entries.len();
        let entry = self.entries.get_mut(usize::from(index)).ok_or_else(|| {
            ConvertError::InvalidValue(format!(
                "{label}: cannot change color #{index} to black, palette holds {len} color(s)"
            ))
        })?;
        entry.color = Rgb::BLACK;
        entry.original = Rgb::BLACK;
        tracing::info!("{label}: color #{index} is now #0,#0,#0");
        Ok(())
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// The entries that go into output files, slot 0 left out on `skip0`.
    pub fn emitted(&self, skip0: bool) -> &[PaletteEntry] {
        let start = usize::from(skip0).min(self.entries.len());
        &self.entries[start..]
    }

    /// Number of hardware slots taken.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Colors dropped for not appearing in the image.
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

fn log_registration(label: &str, def: &ColorDef<'_>, index: u8, used: bool) {
    tracing::info!(
        "{label}: string '{}' registered as color #{index} ({}) from line {}{}",
        String::from_utf8_lossy(def.key),
        def.value,
        def.line,
        if used { "" } else { " (not used)" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataKind;

    fn source(lines: &[&str]) -> SourceImage {
        SourceImage::from_lines(lines).unwrap()
    }

    fn config() -> Config {
        Config::new("TEST", DataKind::Both)
    }

    #[test]
    fn alpha_takes_slot_zero() {
        let src = source(&["4 2 2 1", ".\tc None", "X\tc #FF0000", "X.X.", "XXXX"]);
        let palette = Palette::build(&src, &config()).unwrap();
        let entries = palette.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 0);
        assert_eq!(entries[0].color, Rgb::BLACK);
        assert!(entries[0].matches(b"."));
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[1].color, Rgb::new(7, 0, 0));
        assert_eq!(entries[1].original, Rgb::new(255, 0, 0));
    }

    #[test]
    fn screen5_always_reserves_slot_zero() {
        let src = source(&["2 1 1 1", "a\tc #FFFFFF", "aa"]);
        let palette = Palette::build(&src, &config()).unwrap();
        assert_eq!(palette.len(), 2);
        assert!(!palette.entries()[0].used);
        assert_eq!(palette.entries()[1].color, Rgb::new(7, 7, 7));
    }

    #[test]
    fn v9990_without_transparency_starts_at_zero() {
        let src = source(&["2 1 1 1", "a\tc #FFFFFF", "aa"]);
        let mut cfg = config();
        cfg.screen = Screen::V9990;
        let palette = Palette::build(&src, &cfg).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.entries()[0].index, 0);
        assert_eq!(palette.entries()[0].color, Rgb::new(31, 31, 31));
    }

    #[test]
    fn unused_colors_are_dropped_or_kept() {
        let src = source(&["2 1 2 1", "a\tc #FFFFFF", "b\tc #00FF00", "aa"]);
        let palette = Palette::build(&src, &config()).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.discarded(), 1);

        let mut cfg = config();
        cfg.keep_unused = true;
        let palette = Palette::build(&src, &cfg).unwrap();
        assert_eq!(palette.len(), 3);
        let kept = &palette.entries()[2];
        assert!(!kept.used);
        assert!(!kept.matches(b"b"));
        assert_eq!(kept.color, Rgb::new(0, 7, 0));
    }

    #[test]
    fn trans_color_override_matches_by_value() {
        let src = source(&["2 1 2 1", "a\tc red", "b\tc #00FF00", "ab"]);
        let mut cfg = config();
        cfg.trans_color = Some(Rgb::new(255, 0, 0));
        let palette = Palette::build(&src, &cfg).unwrap();
        assert!(palette.entries()[0].matches(b"a"));
        assert_eq!(palette.entries()[0].color, Rgb::new(7, 0, 0));
        assert_eq!(palette.entries()[1].index, 1);
        assert!(palette.entries()[1].matches(b"b"));
    }

    #[test]
    fn alpha_wins_over_later_override() {
        let src = source(&[
            "2 1 2 1",
            ".\tc None",
            "X\tc #00FF00",
            ".X",
        ]);
        let mut cfg = config();
        cfg.trans_color = Some(Rgb::new(0, 255, 0));
        let palette = Palette::build(&src, &cfg).unwrap();
        // the green line repeats the transparent color and is not registered
        assert_eq!(palette.len(), 1);
        assert!(palette.entries()[0].matches(b"."));
        assert!(!palette.entries().iter().any(|e| e.matches(b"X")));
        // slot 0 carries the override's value
        assert_eq!(palette.entries()[0].original, Rgb::new(0, 255, 0));
    }

    #[test]
    fn duplicate_transparent_kept_as_ignored() {
        let src = source(&["2 1 2 1", ".\tc None", ",\tc None", ".."]);
        let mut cfg = config();
        cfg.keep_unused = true;
        let palette = Palette::build(&src, &cfg).unwrap();
        assert_eq!(palette.len(), 2);
        assert!(!palette.entries()[1].used);
        assert_eq!(palette.entries()[1].index, 1);
    }

    #[test]
    fn unmatched_override_still_recolors_slot_zero() {
        let src = source(&["2 1 1 1", "a\tc #FFFFFF", "aa"]);
        let mut cfg = config();
        cfg.trans_color = Some(Rgb::new(0, 0, 255));
        let palette = Palette::build(&src, &cfg).unwrap();
        assert_eq!(palette.entries()[0].color, Rgb::new(0, 0, 7));
        assert!(!palette.entries()[0].used);
    }

    fn many_colors(count: usize) -> SourceImage {
        let keys: Vec<char> = "abcdefghijklmnopqrstuvwxyz".chars().take(count).collect();
        let width = count + count % 2;
        let mut lines = vec![format!("{width} 1 {count} 1")];
        lines.extend(keys.iter().enumerate().map(|(i, k)| format!("{k}\tc #{:02X}0000", i * 8)));
        let mut row: String = keys.iter().collect();
        if count % 2 == 1 {
            row.push(keys[0]);
        }
        lines.push(row);
        SourceImage::from_lines(&lines).unwrap()
    }

    #[test]
    fn color_budget() {
        // 15 colors plus the transparent slot fit SCREEN5
        assert_eq!(Palette::build(&many_colors(15), &config()).unwrap().len(), 16);
        let err = Palette::build(&many_colors(16), &config()).unwrap_err();
        assert_eq!(err.exit_code(), 4);

        let mut cfg = config();
        cfg.screen = Screen::V9990;
        assert_eq!(Palette::build(&many_colors(16), &cfg).unwrap().len(), 16);
        assert_eq!(Palette::build(&many_colors(17), &cfg).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn oversized_palette_never_wraps_indexes() {
        // 300 two-character keys over two rows of 150 pixels
        let alphabet: Vec<char> = "abcdefghijklmnopqrst".chars().collect();
        let key = |i: usize| format!("{}{}", alphabet[i / 20], alphabet[i % 20]);
        let mut lines = vec!["150 2 300 2".to_string()];
        lines.extend((0..300).map(|i| format!("{}\tc #{:06X}", key(i), i * 8)));
        lines.push((0..150).map(key).collect::<String>());
        lines.push((150..300).map(key).collect::<String>());
        let src = SourceImage::from_lines(&lines).unwrap();

        let err = Palette::build(&src, &config()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("got 301"), "{err}");
    }

    #[test]
    fn keep_unused_respects_budget() {
        let mut lines = vec!["2 1 20 2".to_string()];
        lines.extend((0..20).map(|i| format!("{i:02}\tc #0000{:02X}", i * 10)));
        lines.push("0000".to_string());
        let src = SourceImage::from_lines(&lines).unwrap();
        let mut cfg = config();
        cfg.keep_unused = true;
        let palette = Palette::build(&src, &cfg).unwrap();
        assert_eq!(palette.len(), 16);
    }

    #[test]
    fn change_to_black() {
        let src = source(&["2 1 2 1", "a\tc #FFFFFF", "b\tc #00FF00", "ab"]);
        let mut cfg = config();
        cfg.change_to_black = Some(2);
        let palette = Palette::build(&src, &cfg).unwrap();
        assert_eq!(palette.entries()[2].color, Rgb::BLACK);
        assert_eq!(palette.entries()[2].original, Rgb::BLACK);
        assert_eq!(palette.entries()[1].color, Rgb::new(7, 7, 7));

        cfg.change_to_black = Some(9);
        assert_eq!(Palette::build(&src, &cfg).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn odd_width_fails_before_scanning() {
        let src = source(&["3 1 1 1", "a\tc #FFFFFF", "aaa"]);
        assert_eq!(Palette::build(&src, &config()).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn skip0_trims_emitted_entries() {
        let src = source(&["2 1 1 1", "a\tc #FFFFFF", "aa"]);
        let palette = Palette::build(&src, &config()).unwrap();
        assert_eq!(palette.emitted(false).len(), 2);
        assert_eq!(palette.emitted(true).len(), 1);
        assert_eq!(palette.emitted(true)[0].index, 1);
    }
}
