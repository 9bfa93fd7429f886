//! Rendering of palette-styled street maps.
//!
//! Implements the stages between fetched geometry and finished files:
//! - Edge classification by road type or segment length
//! - Rasterization of streets and water
//! - Borders, labels and poster frames
//! - Atomic export with previews, and palette swatches

pub mod classify;
pub mod compose;
pub mod export;
pub mod raster;
pub mod swatch;
pub mod text;

pub use classify::{apply_palette, ClassificationPolicy, EdgeClassifier};
pub use compose::{add_border, add_label, frame_with_label, BorderSpec, FrameStyle, LabelOptions};
pub use export::{export, load_image, save_atomic, ExportPaths, DEFAULT_PREVIEW_MAX};
pub use raster::{render_map, RenderOptions};
pub use swatch::generate_swatch;
pub use text::{fit_font_size, FontFit, FontSearch, LabelFont, TextMeasure, TrueTypeFont};
