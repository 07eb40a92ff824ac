//! BMP previews of what the hardware will show.
//!
//! Hardware channels are stretched back to 8 bits, so quantization of the
//! original colors is visible.

use std::path::Path;

use bmp::{Image, Pixel, px};

use crate::config::Screen;
use crate::pack::PackedImage;
use crate::palette::{Palette, PaletteEntry};
use crate::rgb::Rgb;

const BOX_COLS: usize = 16;
const BOX_SIZE_PX: usize = 16;
const BOX_BORDER_PX: usize = 1;

fn to_pixel(color: Rgb, screen: Screen) -> Pixel {
    let c = color.expand(screen.max_component());
    px!(c.r, c.g, c.b)
}

/// Render the packed image through the hardware palette.
pub fn render_image(image: &PackedImage, palette: &Palette) -> Image {
    let mut colors = [px!(0, 0, 0); 16];
    for entry in palette.entries() {
        colors[usize::from(entry.index & 0x0f)] = to_pixel(entry.color, palette.screen);
    }

    let mut img = Image::new(image.width as u32, image.height as u32);
    for (x, y) in img.coordinates() {
        let index = image.pixel(x as usize, y as usize);
        img.set_pixel(x, y, colors[usize::from(index)]);
    }
    img
}

/// Swatch sheet: one bordered box per palette entry, 16 per row.
pub fn render_palette(entries: &[PaletteEntry], screen: Screen) -> Image {
    let box_rows = entries.len().div_ceil(BOX_COLS).max(1);
    let width = BOX_COLS * (BOX_SIZE_PX + BOX_BORDER_PX) + BOX_BORDER_PX;
    let height = box_rows * (BOX_SIZE_PX + BOX_BORDER_PX) + BOX_BORDER_PX;

    let mut img = Image::new(width as u32, height as u32);
    for (x, y) in img.coordinates() {
        img.set_pixel(x, y, px!(0, 0, 0));
    }

    for (i, entry) in entries.iter().enumerate() {
        let (row, col) = (i / BOX_COLS, i % BOX_COLS);
        let xmin = BOX_BORDER_PX * (col + 1) + BOX_SIZE_PX * col;
        let ymin = BOX_BORDER_PX * (row + 1) + BOX_SIZE_PX * row;
        draw_box(&mut img, xmin, ymin, BOX_SIZE_PX, to_pixel(entry.color, screen));
    }
    img
}

fn draw_box(img: &mut Image, x: usize, y: usize, side: usize, color: Pixel) {
    for y in y..y + side {
        for x in x..x + side {
            img.set_pixel(x as u32, y as u32, color);
        }
    }
}

pub fn save_image(image: &PackedImage, palette: &Palette, path: &Path) -> std::io::Result<()> {
    tracing::info!("writing image preview {}", path.display());
    render_image(image, palette).save(path)
}

pub fn save_palette(palette: &Palette, skip0: bool, path: &Path) -> std::io::Result<()> {
    tracing::info!("writing palette preview {}", path.display());
    render_palette(palette.emitted(skip0), palette.screen).save(path)
}
