//! Tests for image export and swatches.

use image::{Rgba, RgbaImage};
use map_common::{MapError, Slot};
use renderer::export::preview_path;
use renderer::swatch::SWATCH_SQUARE;
use renderer::{export, generate_swatch, load_image, save_atomic};
use test_utils::{fixture_palette_store, temp_test_dir};

fn checker(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([230, 192, 123, 255])
        } else {
            Rgba([40, 44, 52, 255])
        }
    })
}

fn leftover_partials(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".partial-"))
        .count()
}

#[test]
fn test_export_writes_full_and_preview() {
    let dir = temp_test_dir();
    let destination = dir.path().join("Grenoble").join("Grenoble_onedark.png");
    let image = checker(2400, 600);

    let paths = export(&image, &destination, 1920).unwrap();

    assert_eq!(paths.full, destination);
    assert_eq!(paths.preview, dir.path().join("Grenoble").join("Grenoble_onedark.small.png"));

    let full = load_image(&paths.full).unwrap();
    assert_eq!(full, image);
    let preview = load_image(&paths.preview).unwrap();
    assert_eq!(preview.dimensions(), (1920, 480));

    assert_eq!(leftover_partials(&dir.path().join("Grenoble")), 0);
}

#[test]
fn test_small_image_preview_keeps_size() {
    let dir = temp_test_dir();
    let destination = dir.path().join("tiny.png");
    let image = checker(64, 32);

    let paths = export(&image, &destination, 1920).unwrap();

    assert_eq!(load_image(&paths.preview).unwrap(), image);
}

#[test]
fn test_export_replaces_existing_file() {
    let dir = temp_test_dir();
    let destination = dir.path().join("map.png");
    std::fs::write(&destination, b"stale").unwrap();

    save_atomic(&checker(16, 16), &destination).unwrap();

    assert_eq!(load_image(&destination).unwrap().dimensions(), (16, 16));
}

#[test]
fn test_jpeg_export_drops_alpha() {
    let dir = temp_test_dir();
    let destination = dir.path().join("map.jpg");

    save_atomic(&checker(32, 32), &destination).unwrap();

    let loaded = load_image(&destination).unwrap();
    assert_eq!(loaded.dimensions(), (32, 32));
    assert_eq!(loaded.get_pixel(0, 0)[3], 255);
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = temp_test_dir();
    let destination = dir.path().join("map.notanimage");

    let err = save_atomic(&checker(8, 8), &destination).unwrap_err();

    assert!(matches!(err, MapError::InvalidArgument { .. }));
    assert!(!destination.exists());
}

#[test]
fn test_failed_write_leaves_nothing_behind() {
    let dir = temp_test_dir();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").unwrap();
    let destination = blocker.join("map.png");

    let err = save_atomic(&checker(8, 8), &destination).unwrap_err();

    assert!(matches!(err, MapError::Io(_)));
    assert!(!destination.exists());
    assert_eq!(leftover_partials(dir.path()), 0);
}

#[test]
fn test_zero_preview_size_rejected() {
    let dir = temp_test_dir();
    let destination = dir.path().join("map.png");

    let result = export(&checker(100, 100), &destination, 0);

    assert!(matches!(result, Err(MapError::InvalidArgument { ref param, .. }) if param == "preview_max"));
    assert!(!destination.exists());
    assert_eq!(leftover_partials(dir.path()), 0);
}

#[test]
fn test_load_missing_image() {
    let dir = temp_test_dir();
    assert!(matches!(load_image(&dir.path().join("missing.png")), Err(MapError::Io(_))));
}

#[test]
fn test_preview_path_without_extension() {
    assert_eq!(
        preview_path(std::path::Path::new("out/poster")),
        std::path::PathBuf::from("out/poster.small")
    );
}

#[test]
fn test_swatch_layout() {
    let store = fixture_palette_store();
    let palette = store.get("onedark").unwrap();

    let swatch = generate_swatch(palette, SWATCH_SQUARE);

    assert_eq!(swatch.dimensions(), (16 * SWATCH_SQUARE, SWATCH_SQUARE));
    for (i, slot) in Slot::ALL.iter().enumerate() {
        let x = i as u32 * SWATCH_SQUARE + SWATCH_SQUARE / 2;
        assert_eq!(swatch.get_pixel(x, 50).0, palette.get(*slot).to_rgba(), "{}", slot);
    }
    assert_eq!(swatch.get_pixel(0, 0).0, palette.get(Slot::Base00).to_rgba());
    assert_eq!(swatch.get_pixel(16 * SWATCH_SQUARE - 1, 99).0, palette.get(Slot::Base0F).to_rgba());
}
