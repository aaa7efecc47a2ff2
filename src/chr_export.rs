//! Pattern-table capture: the CHR space as the video collaborator currently
//! sees it, rendered as a grayscale image.
//!
//! Both 4 KiB pattern tables are laid out side by side (256x128 pixels,
//! 16x16 tiles each). Each 2-bit pixel maps to one of four gray levels.

use std::path::Path;

use image::{GrayImage, ImageResult, Luma};

use crate::cartridge::Cartridge;

pub const WIDTH: u32 = 256;
pub const HEIGHT: u32 = 128;

const SHADES: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];

/// Render $0000-$1FFF through the cartridge's current CHR banking.
pub fn pattern_tables(cart: &mut Cartridge) -> GrayImage {
    let mut img = GrayImage::new(WIDTH, HEIGHT);
    for table in 0..2u16 {
        for tile in 0..256u16 {
            let base = table * 0x1000 + tile * 16;
            let ox = table as u32 * 128 + (tile % 16) as u32 * 8;
            let oy = (tile / 16) as u32 * 8;
            for row in 0..8u16 {
                let lo = cart.read(base + row);
                let hi = cart.read(base + row + 8);
                for col in 0..8u32 {
                    let bit = 7 - col;
                    let index = ((lo >> bit) & 1) | (((hi >> bit) & 1) << 1);
                    img.put_pixel(ox + col, oy + row as u32, Luma([SHADES[index as usize]]));
                }
            }
        }
    }
    img
}

/// Write the pattern tables to `path`; the format follows the extension.
pub fn save_pattern_tables(cart: &mut Cartridge, path: &Path) -> ImageResult<()> {
    let img = pattern_tables(cart);
    log::debug!("chr_export: writing {}", path.display());
    img.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_ines;

    #[test]
    fn chr_ram_tile_renders_all_shades() {
        let rom = build_ines(1, 0, 0, 0, 0, None);
        let mut cart = Cartridge::from_ines_bytes(&rom).expect("parse");
        // Tile 0 row 0: pixels 0..3 = shades 0, 1, 2, 3.
        cart.write(0x0000, 0b0101_0000);
        cart.write(0x0008, 0b0011_0000);

        let img = pattern_tables(&mut cart);
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        let row: Vec<u8> = (0..4).map(|x| img.get_pixel(x, 0)[0]).collect();
        assert_eq!(row, vec![0x00, 0x55, 0xAA, 0xFF]);
    }

    #[test]
    fn second_table_lands_on_the_right() {
        let rom = build_ines(1, 0, 0, 0, 0, None);
        let mut cart = Cartridge::from_ines_bytes(&rom).expect("parse");
        cart.write(0x1000, 0x80);
        let img = pattern_tables(&mut cart);
        assert_eq!(img.get_pixel(128, 0)[0], 0x55);
        assert_eq!(img.get_pixel(0, 0)[0], 0x00);
    }
}
