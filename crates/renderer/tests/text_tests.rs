//! Tests for font-size fitting.

mod common;

use image::RgbaImage;
use map_common::MapError;
use renderer::{add_label, fit_font_size, FontSearch, LabelOptions, TextMeasure, TrueTypeFont};
use test_utils::{fixture_palette_store, require_font};

use common::BlockFont;

#[test]
fn test_grenoble_fits_eighty_percent() {
    let font = BlockFont { advance: 0.6 };

    let fit = fit_font_size(&font, "GRENOBLE", 800.0, FontSearch::default()).unwrap();

    assert_eq!(fit.size, 162.0);
    assert!(fit.width <= 800);
    assert!(font.measure("GRENOBLE", fit.size + 10.0).0 > 800);
}

#[test]
fn test_exact_fit_is_accepted() {
    let font = BlockFont { advance: 0.6 };
    // width at 162 is exactly 778
    assert_eq!(font.measure("GRENOBLE", 162.0).0, 778);

    let fit = fit_font_size(&font, "GRENOBLE", 778.0, FontSearch::default()).unwrap();
    assert_eq!(fit.size, 162.0);

    let fit = fit_font_size(&font, "GRENOBLE", 777.0, FontSearch::default()).unwrap();
    assert_eq!(fit.size, 152.0);
}

#[test]
fn test_result_stays_on_step_grid() {
    let font = BlockFont { advance: 0.55 };
    let search = FontSearch { base_size: 40.0, step: 4.0 };

    for target in [50.0, 333.0, 1200.0, 4000.0] {
        let fit = fit_font_size(&font, "Saint-Martin-d'Hères", target, search).unwrap();
        assert_eq!((fit.size - 40.0) % 4.0, 0.0, "target {}", target);
        assert!(fit.width as f32 <= target);
        assert!(font.measure("Saint-Martin-d'Hères", fit.size + 4.0).0 as f32 > target);
    }
}

#[test]
fn test_invalid_search_parameters() {
    let font = BlockFont { advance: 0.6 };

    let zero_step = FontSearch { base_size: 72.0, step: 0.0 };
    assert!(matches!(
        fit_font_size(&font, "X", 100.0, zero_step),
        Err(MapError::InvalidArgument { .. })
    ));
    assert!(fit_font_size(&font, "X", 0.0, FontSearch::default()).is_err());
    assert!(fit_font_size(&font, "", 100.0, FontSearch::default()).is_err());
}

#[test]
fn test_truetype_font_fit() {
    let path = require_font!();
    let font = TrueTypeFont::from_file(&path).unwrap();

    let fit = fit_font_size(&font, "GRENOBLE", 800.0, FontSearch::default()).unwrap();

    assert!(fit.width <= 800);
    assert!(font.measure("GRENOBLE", fit.size + 10.0).0 > 800);
    assert!(fit.height > 0);
}

#[test]
fn test_truetype_font_draws_label() {
    let path = require_font!();
    let font = TrueTypeFont::from_file(&path).unwrap();
    let store = fixture_palette_store();
    let palette = store.get("onedark").unwrap();
    let image = RgbaImage::from_pixel(600, 100, image::Rgba([0, 0, 0, 255]));

    let out = add_label(&image, "LYON", palette, &font, &LabelOptions::default()).unwrap();

    assert!(out.height() > 100);
    let background = image::Rgba(palette.get(map_common::Slot::Base00).to_rgba());
    let inked = (100..out.height())
        .flat_map(|y| (0..out.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| *out.get_pixel(x, y) != background)
        .count();
    assert!(inked > 0, "label strip has no text pixels");
}

#[test]
fn test_invalid_font_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ttf");
    std::fs::write(&path, b"not a font").unwrap();

    assert!(matches!(TrueTypeFont::from_file(&path), Err(MapError::Font(_))));
    assert!(matches!(
        TrueTypeFont::from_file(dir.path().join("missing.ttf")),
        Err(MapError::Font(_))
    ));
}
