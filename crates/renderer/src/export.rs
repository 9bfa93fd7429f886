//! Writing finished images and their previews.
//!
//! Files are encoded into a temporary file in the destination directory and
//! renamed into place, so a failed write never leaves a partial image at the
//! destination path.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use tracing::info;

use map_common::{MapError, MapResult};

/// Longest side of a preview image, in pixels.
pub const DEFAULT_PREVIEW_MAX: u32 = 1920;

/// Marker inserted between a file stem and its extension for previews.
pub const PREVIEW_SUFFIX: &str = "small";

/// Where [`export`] wrote its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub full: PathBuf,
    pub preview: PathBuf,
}

pub(crate) fn image_error(err: image::ImageError) -> MapError {
    MapError::Image(err.to_string())
}

/// `dir/name.png` -> `dir/name.small.png`.
pub fn preview_path(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match destination.extension() {
        Some(ext) => format!("{}.{}.{}", stem, PREVIEW_SUFFIX, ext.to_string_lossy()),
        None => format!("{}.{}", stem, PREVIEW_SUFFIX),
    };
    destination.with_file_name(name)
}

/// Largest size with the same aspect ratio whose longest side is at most
/// `max_side`. Images already within bounds keep their size. A `max_side`
/// of zero is treated as one.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let max_side = max_side.max(1);
    if width <= max_side && height <= max_side {
        return (width, height);
    }
    let scale = (max_side as f64 / width as f64).min(max_side as f64 / height as f64);
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max_side);
    (scaled(width), scaled(height))
}

/// Downsized copy of `image` bounded by `max_side`.
pub fn make_preview(image: &RgbaImage, max_side: u32) -> RgbaImage {
    let (width, height) = fit_within(image.width(), image.height(), max_side);
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, imageops::FilterType::Lanczos3)
}

/// Encode `image` to `destination`, format chosen by extension.
pub fn save_atomic(image: &RgbaImage, destination: &Path) -> MapResult<()> {
    let format = ImageFormat::from_path(destination).map_err(|_| MapError::InvalidArgument {
        param: "destination".to_string(),
        message: format!("no image format for {}", destination.display()),
    })?;

    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let dynamic = DynamicImage::ImageRgba8(image.clone());
    let encodable = match format {
        ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP => dynamic,
        _ => DynamicImage::ImageRgb8(dynamic.to_rgb8()),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        encodable.write_to(&mut writer, format).map_err(image_error)?;
        writer.flush()?;
    }
    temp.persist(destination).map_err(|e| MapError::Io(e.error))?;
    Ok(())
}

/// Write the full image and a preview next to it.
pub fn export(image: &RgbaImage, destination: &Path, preview_max: u32) -> MapResult<ExportPaths> {
    if preview_max == 0 {
        return Err(MapError::InvalidArgument {
            param: "preview_max".to_string(),
            message: "preview size must be at least 1 pixel".to_string(),
        });
    }
    info!(path = %destination.display(), width = image.width(), height = image.height(), "Exporting image");
    save_atomic(image, destination)?;

    let preview = preview_path(destination);
    let small = make_preview(image, preview_max);
    info!(path = %preview.display(), width = small.width(), height = small.height(), "Exporting preview");
    save_atomic(&small, &preview)?;

    Ok(ExportPaths {
        full: destination.to_path_buf(),
        preview,
    })
}

/// Load an image from disk as RGBA.
pub fn load_image(path: &Path) -> MapResult<RgbaImage> {
    info!(path = %path.display(), "Loading image");
    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => MapError::Io(io),
        other => image_error(other),
    })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_path() {
        assert_eq!(
            preview_path(Path::new("export/Grenoble_onedark.png")),
            PathBuf::from("export/Grenoble_onedark.small.png")
        );
        assert_eq!(preview_path(Path::new("map")), PathBuf::from("map.small"));
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(6000, 6000, 1920), (1920, 1920));
        assert_eq!(fit_within(9933, 14043, 1920), (1358, 1920));
        assert_eq!(fit_within(4000, 1000, 1920), (1920, 480));
        assert_eq!(fit_within(800, 600, 1920), (800, 600));
        assert_eq!(fit_within(100, 50, 0), (1, 1));
    }
}
