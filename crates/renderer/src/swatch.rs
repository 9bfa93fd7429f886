//! Palette swatches: one square per slot, left to right.

use image::{Rgba, RgbaImage};

use map_common::{Palette, Slot};

/// Side of one swatch square in pixels.
pub const SWATCH_SQUARE: u32 = 100;

/// A `16 * square` x `square` strip of the palette's colours in slot order.
pub fn generate_swatch(palette: &Palette, square: u32) -> RgbaImage {
    let count = Slot::ALL.len() as u32;
    RgbaImage::from_fn(count * square, square, |x, _| {
        let slot = Slot::ALL[(x / square) as usize];
        Rgba(palette.get(slot).to_rgba())
    })
}
