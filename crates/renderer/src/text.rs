//! Font loading, text measurement and font-size fitting for map labels.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tracing::debug;

use map_common::{Color, MapError, MapResult};

/// Upper bound on search steps, so a measure that never grows cannot hang.
const MAX_SEARCH_STEPS: usize = 10_000;

/// Measures rendered text.
pub trait TextMeasure {
    /// `(width, height)` in pixels of `text` drawn at `size` pixels.
    ///
    /// Width must not decrease as `size` grows.
    fn measure(&self, text: &str, size: f32) -> (u32, u32);
}

/// A font that can also draw.
pub trait LabelFont: TextMeasure {
    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw(&self, image: &mut RgbaImage, text: &str, size: f32, x: i32, y: i32, color: Color);
}

/// A TrueType/OpenType face loaded from disk.
pub struct TrueTypeFont {
    font: Font<'static>,
}

impl TrueTypeFont {
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| MapError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes).map_err(|e| match e {
            MapError::Font(msg) => MapError::Font(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> MapResult<Self> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| MapError::Font("not a valid TrueType font".to_string()))?;
        Ok(Self { font })
    }
}

impl TextMeasure for TrueTypeFont {
    fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        let scale = Scale::uniform(size);
        let v_metrics = self.font.v_metrics(scale);

        // Advance-based width, including the last glyph's advance.
        let width = self
            .font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        let height = v_metrics.ascent - v_metrics.descent;

        (width.ceil().max(0.0) as u32, height.ceil().max(0.0) as u32)
    }
}

impl LabelFont for TrueTypeFont {
    fn draw(&self, image: &mut RgbaImage, text: &str, size: f32, x: i32, y: i32, color: Color) {
        draw_text_mut(image, Rgba(color.to_rgba()), x, y, Scale::uniform(size), &self.font, text);
    }
}

/// Start size and step of the font-size search, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSearch {
    pub base_size: f32,
    pub step: f32,
}

impl Default for FontSearch {
    fn default() -> Self {
        Self {
            base_size: 72.0,
            step: 10.0,
        }
    }
}

/// Result of fitting a label to a width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontFit {
    pub size: f32,
    pub width: u32,
    pub height: u32,
}

/// Largest size on the `base + k * step` grid whose rendered width is at
/// most `target_width`.
///
/// Steps up from the base size while the text still fits, then steps back
/// once. If the base size is already too wide, steps down instead. The
/// returned size fits and the next size up does not.
pub fn fit_font_size<M: TextMeasure + ?Sized>(
    measure: &M,
    text: &str,
    target_width: f32,
    search: FontSearch,
) -> MapResult<FontFit> {
    if text.trim().is_empty() {
        return Err(MapError::InvalidArgument {
            param: "text".to_string(),
            message: "label text is empty".to_string(),
        });
    }
    if !(search.step > 0.0 && search.base_size > 0.0) {
        return Err(MapError::InvalidArgument {
            param: "font_search".to_string(),
            message: format!("base size and step must be positive, got {:?}", search),
        });
    }
    if !(target_width > 0.0) {
        return Err(MapError::InvalidArgument {
            param: "target_width".to_string(),
            message: format!("must be positive, got {}", target_width),
        });
    }

    let fits = |size: f32| measure.measure(text, size).0 as f32 <= target_width;

    let mut size = search.base_size;
    let mut steps = 0;
    if fits(size) {
        // Step up to the first size that overflows, then back off once.
        while fits(size) {
            size += search.step;
            steps += 1;
            if steps > MAX_SEARCH_STEPS {
                return Err(MapError::Font(format!(
                    "text width never exceeded {} px",
                    target_width
                )));
            }
        }
        size -= search.step;
    } else {
        while !fits(size) {
            size -= search.step;
            if size <= 0.0 {
                return Err(MapError::InvalidArgument {
                    param: "target_width".to_string(),
                    message: format!("'{}' does not fit in {} px at any size", text, target_width),
                });
            }
        }
    }

    let (width, height) = measure.measure(text, size);
    debug!(size, width, height, target_width, "Calculated optimal font size");
    Ok(FontFit {
        size,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `advance` ems wide and 1.2 ems tall.
    struct Monospace {
        advance: f32,
    }

    impl TextMeasure for Monospace {
        fn measure(&self, text: &str, size: f32) -> (u32, u32) {
            let width = text.chars().count() as f32 * self.advance * size;
            (width.ceil() as u32, (size * 1.2).ceil() as u32)
        }
    }

    #[test]
    fn test_steps_down_when_base_too_wide() {
        let font = Monospace { advance: 1.0 };
        // "AB" at 72 is 144 px; 100 px fits 42 (84 px) but not 52 (104 px)
        let fit = fit_font_size(&font, "AB", 100.0, FontSearch::default()).unwrap();
        assert_eq!(fit.size, 42.0);
    }

    #[test]
    fn test_impossible_fit_is_error() {
        let font = Monospace { advance: 1.0 };
        let err = fit_font_size(&font, "ABCDEFGH", 5.0, FontSearch::default()).unwrap_err();
        assert!(matches!(err, MapError::InvalidArgument { .. }));
    }

    #[test]
    fn test_empty_text_rejected() {
        let font = Monospace { advance: 1.0 };
        assert!(fit_font_size(&font, "  ", 100.0, FontSearch::default()).is_err());
    }
}
