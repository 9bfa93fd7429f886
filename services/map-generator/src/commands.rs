//! The `label` and `swatch` commands: work on existing images and palette
//! files, no network involved.

use std::path::{Path, PathBuf};

use tracing::info;

use map_common::{MapResult, Palette, PaletteStore};
use renderer::swatch::SWATCH_SQUARE;
use renderer::{export, frame_with_label, generate_swatch, load_image, save_atomic, ExportPaths, FrameStyle, LabelFont};

/// Label text derived from a map file name.
///
/// `New_York_City_onedark.png` labelled with palette `onedark` reads
/// `NEW YORK CITY`.
pub fn text_from_stem(path: &Path, palette: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!("_{}", palette);
    let base = stem.strip_suffix(&suffix).unwrap_or(&stem);
    base.replace('_', " ").to_uppercase()
}

/// `dir/<stem>_edited.png` for an input image.
pub fn edited_path(export_dir: &Path, image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    export_dir.join(format!("{}_edited.png", stem))
}

/// Frame and label existing images.
pub fn label_images(
    images: &[PathBuf],
    text: Option<&str>,
    palette: &Palette,
    font: &dyn LabelFont,
    style: &FrameStyle,
    export_dir: &Path,
    preview_max: u32,
) -> MapResult<Vec<ExportPaths>> {
    let mut written = Vec::with_capacity(images.len());
    for path in images {
        let image = load_image(path)?;
        info!(path = %path.display(), width = image.width(), height = image.height(), "Loaded image");

        let label = match text {
            Some(text) => text.to_string(),
            None => text_from_stem(path, palette.name()),
        };
        let framed = frame_with_label(&image, &label, palette, font, style)?;
        written.push(export(&framed, &edited_path(export_dir, path), preview_max)?);
    }
    Ok(written)
}

/// One `<palette>.png` swatch per palette in the store.
pub fn write_swatches(store: &PaletteStore, export_dir: &Path) -> MapResult<Vec<PathBuf>> {
    std::fs::create_dir_all(export_dir)?;

    let mut written = Vec::with_capacity(store.len());
    for palette in store.iter() {
        info!(palette = %palette.name(), "Generating swatch");
        let path = export_dir.join(format!("{}.png", palette.name()));
        save_atomic(&generate_swatch(palette, SWATCH_SQUARE), &path)?;
        written.push(path);
    }
    Ok(written)
}
