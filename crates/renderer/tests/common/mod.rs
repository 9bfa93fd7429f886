//! Helpers shared by the renderer integration tests.

#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use map_common::Color;
use renderer::{LabelFont, TextMeasure};

/// Deterministic font stand-in: each character is `advance` ems wide, text
/// is 1.2 ems tall, and drawing fills the measured box.
pub struct BlockFont {
    pub advance: f32,
}

impl TextMeasure for BlockFont {
    fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        let width = text.chars().count() as f32 * self.advance * size;
        (width.ceil() as u32, (size * 1.2).ceil() as u32)
    }
}

impl LabelFont for BlockFont {
    fn draw(&self, image: &mut RgbaImage, text: &str, size: f32, x: i32, y: i32, color: Color) {
        let (w, h) = self.measure(text, size);
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                let (px, py) = (x + dx, y + dy);
                if px >= 0 && py >= 0 && (px as u32) < image.width() && (py as u32) < image.height() {
                    image.put_pixel(px as u32, py as u32, Rgba(color.to_rgba()));
                }
            }
        }
    }
}

pub fn rgba(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba())
}
