//! Image composition: borders, padding and the place-name label.

use std::fmt;
use std::str::FromStr;

use image::{imageops, Rgba, RgbaImage};
use tracing::{debug, info};

use map_common::{Color, MapError, MapResult, Palette, Slot};

use crate::text::{fit_font_size, FontSearch, LabelFont};

/// Border sizes in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderSpec {
    /// Same margin on every side.
    Uniform(u32),
    /// `horizontal` bands above and below, `vertical` bands left and right.
    Symmetric { horizontal: u32, vertical: u32 },
    /// Individual margins, clockwise from the top.
    Sides { north: u32, east: u32, south: u32, west: u32 },
}

impl BorderSpec {
    /// Build from one, two or four values. Any other count is invalid.
    pub fn from_values(values: &[u32]) -> MapResult<Self> {
        match *values {
            [size] => Ok(BorderSpec::Uniform(size)),
            [horizontal, vertical] => Ok(BorderSpec::Symmetric {
                horizontal,
                vertical,
            }),
            [north, east, south, west] => Ok(BorderSpec::Sides {
                north,
                east,
                south,
                west,
            }),
            _ => Err(MapError::InvalidBorder(format!(
                "expected 1, 2 or 4 values, got {} ({:?})",
                values.len(),
                values
            ))),
        }
    }

    /// Margins as `(north, east, south, west)`.
    pub fn margins(&self) -> (u32, u32, u32, u32) {
        match *self {
            BorderSpec::Uniform(size) => (size, size, size, size),
            BorderSpec::Symmetric {
                horizontal,
                vertical,
            } => (horizontal, vertical, horizontal, vertical),
            BorderSpec::Sides {
                north,
                east,
                south,
                west,
            } => (north, east, south, west),
        }
    }
}

impl FromStr for BorderSpec {
    type Err = MapError;

    /// Parses `"10"`, `"10,20"` or `"1,2,3,4"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|_| MapError::InvalidBorder(format!("'{}' is not a pixel count", part.trim())))
            })
            .collect::<MapResult<Vec<_>>>()?;
        Self::from_values(&values)
    }
}

impl fmt::Display for BorderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorderSpec::Uniform(size) => write!(f, "{}", size),
            BorderSpec::Symmetric {
                horizontal,
                vertical,
            } => write!(f, "{},{}", horizontal, vertical),
            BorderSpec::Sides {
                north,
                east,
                south,
                west,
            } => write!(f, "{},{},{},{}", north, east, south, west),
        }
    }
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba())
}

/// Surround `image` with a `fill` coloured border.
///
/// The margins only size the canvas; the image is always centered on it,
/// rounding towards the top left.
pub fn add_border(image: &RgbaImage, fill: Color, spec: &BorderSpec) -> RgbaImage {
    let (north, east, south, west) = spec.margins();
    let width = image.width() + west + east;
    let height = image.height() + north + south;
    let x = (width - image.width()) / 2;
    let y = (height - image.height()) / 2;
    debug!(width, height, x, y, fill = %fill, border = %spec, "Adding border");

    let mut canvas = RgbaImage::from_pixel(width, height, rgba(fill));
    imageops::replace(&mut canvas, image, i64::from(x), i64::from(y));
    canvas
}

/// Placement and sizing of a label below an image.
#[derive(Debug, Clone)]
pub struct LabelOptions {
    /// Fraction of the image width the text may occupy, in `(0, 1]`.
    pub target_width_fraction: f32,
    pub search: FontSearch,
    pub text_slot: Slot,
    pub background_slot: Slot,
    /// Space above and below the text, in pixels.
    pub margin: u32,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            target_width_fraction: 0.8,
            search: FontSearch::default(),
            text_slot: Slot::Base05,
            background_slot: Slot::Base00,
            margin: 10,
        }
    }
}

/// Extend `image` downwards and write `text` left-aligned in the new strip.
pub fn add_label(
    image: &RgbaImage,
    text: &str,
    palette: &Palette,
    font: &dyn LabelFont,
    options: &LabelOptions,
) -> MapResult<RgbaImage> {
    let fraction = options.target_width_fraction;
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(MapError::InvalidArgument {
            param: "target_width_fraction".to_string(),
            message: format!("must be in (0, 1], got {}", fraction),
        });
    }

    let target = fraction * image.width() as f32;
    let fit = fit_font_size(font, text, target, options.search)?;
    info!(size = fit.size, width = fit.width, height = fit.height, "Calculated optimal font size");

    let strip = fit.height + 2 * options.margin;
    let mut canvas = RgbaImage::from_pixel(
        image.width(),
        image.height() + strip,
        rgba(palette.get(options.background_slot)),
    );
    imageops::replace(&mut canvas, image, 0, 0);

    let y = image.height() + options.margin;
    debug!(x = 0, y, "Rendering label text");
    font.draw(
        &mut canvas,
        text,
        fit.size,
        0,
        y as i32,
        palette.get(options.text_slot),
    );
    Ok(canvas)
}

/// The decorated poster frame around a labelled map.
#[derive(Debug, Clone)]
pub struct FrameStyle {
    pub inner_border: BorderSpec,
    pub inner_slot: Slot,
    pub outer_border: BorderSpec,
    pub outer_slot: Slot,
    /// Overrides the width-derived default target fraction.
    pub target_width_fraction: Option<f32>,
    pub label: LabelOptions,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            inner_border: BorderSpec::Uniform(10),
            inner_slot: Slot::Base05,
            outer_border: BorderSpec::Uniform(250),
            outer_slot: Slot::Base00,
            target_width_fraction: None,
            label: LabelOptions::default(),
        }
    }
}

/// Default label width: leave 100 px of the original width free.
pub fn default_target_fraction(width: u32) -> f32 {
    if width > 200 {
        (width - 100) as f32 / width as f32
    } else {
        LabelOptions::default().target_width_fraction
    }
}

/// Thin border, label strip, then a wide outer border.
pub fn frame_with_label(
    image: &RgbaImage,
    text: &str,
    palette: &Palette,
    font: &dyn LabelFont,
    style: &FrameStyle,
) -> MapResult<RgbaImage> {
    let fraction = style
        .target_width_fraction
        .unwrap_or_else(|| default_target_fraction(image.width()));

    let bordered = add_border(image, palette.get(style.inner_slot), &style.inner_border);
    let options = LabelOptions {
        target_width_fraction: fraction,
        ..style.label.clone()
    };
    let labelled = add_label(&bordered, text, palette, font, &options)?;
    Ok(add_border(&labelled, palette.get(style.outer_slot), &style.outer_border))
}
