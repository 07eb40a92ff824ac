use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::{Config, OutputMode};
use crate::emit;
use crate::error::{ConvertError, Result};
use crate::pack::pack_image;
use crate::palette::Palette;
use crate::preview;
use crate::xpm::SourceImage;

/// Run the whole conversion: text output goes to `stdout`, binary output to
/// the configured file.
pub fn convert<W: Write>(source: &SourceImage, config: &Config, stdout: &mut W) -> Result<()> {
    let palette = Palette::build(source, config)?;
    let entries = config
        .data
        .has_palette()
        .then(|| palette.emitted(config.skip0));

    let needs_pattern = (config.data.has_image() && config.mode != OutputMode::Header)
        || config.preview.is_some();
    let packed = if needs_pattern {
        Some(pack_image(source, &palette, config.contains_palette)?)
    } else {
        None
    };
    let image = packed.as_ref().filter(|_| config.data.has_image());

    let symbol = config.symbol_prefix();
    match config.mode {
        OutputMode::Listing => {
            emit::write_listing(stdout, &symbol, palette.screen, entries, image)?;
        }
        OutputMode::Header => {
            let geometry = config
                .data
                .has_image()
                .then(|| (source.width, source.image_height(config.contains_palette)));
            emit::write_header(
                stdout,
                &symbol,
                &config.define_prefix(),
                palette.screen,
                entries.map(<[_]>::len),
                geometry,
            )?;
        }
        OutputMode::Raw => {
            let mut file = create_output(config)?;
            match (entries, image) {
                (Some(entries), _) => emit::write_raw_palette(&mut file, palette.screen, entries)?,
                (None, Some(image)) => emit::write_raw_pattern(&mut file, image)?,
                (None, None) => {}
            }
            file.flush()?;
        }
        OutputMode::Basic => {
            let dump_name = config.file.as_deref().map(basic_file_name);
            emit::write_basic(stdout, entries, image.and(dump_name.as_deref()))?;
            if let Some(image) = image {
                let mut file = create_output(config)?;
                emit::write_basic_dump(&mut file, image)?;
                file.flush()?;
            }
        }
    }

    if let Some(path) = &config.preview {
        if let Some(packed) = &packed {
            preview::save_image(packed, &palette, path)?;
        }
    }
    if let Some(path) = &config.preview_palette {
        preview::save_palette(&palette, config.skip0, path)?;
    }
    Ok(())
}

fn create_output(config: &Config) -> Result<BufWriter<File>> {
    let path = config
        .file
        .as_deref()
        .ok_or_else(|| ConvertError::FileExpected("output file expected".to_string()))?;
    tracing::debug!("writing {}", path.display());
    Ok(BufWriter::new(File::create(path)?))
}

/// The name BASIC's `COPY` loads the dump by: the bare file name.
fn basic_file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
