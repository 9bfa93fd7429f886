//! Tests for palette loading and lookup.

use map_common::{Color, MapError, PaletteStore, Slot};
use test_utils::{fixture_palette_store, temp_test_dir, write_palette_file, PALETTE_JSON_MISSING_SLOT};

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_from_file() {
    let dir = temp_test_dir();
    let path = write_palette_file(dir.path());

    let store = PaletteStore::from_file(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.names().collect::<Vec<_>>(), vec!["grayscale-dark", "onedark"]);
}

#[test]
fn test_slots_resolve_by_key() {
    let store = fixture_palette_store();
    let onedark = store.get("onedark").unwrap();

    assert_eq!(onedark.get(Slot::Base00), Color::rgb(0x28, 0x2c, 0x34));
    assert_eq!(onedark.get(Slot::Base05), Color::rgb(0xab, 0xb2, 0xbf));
    assert_eq!(onedark.get(Slot::Base0A), Color::rgb(0xe5, 0xc0, 0x7b));
    assert_eq!(onedark.iter().count(), 16);
}

#[test]
fn test_missing_file_is_palette_file_error() {
    let dir = temp_test_dir();
    let err = PaletteStore::from_file(dir.path().join("nope.json")).unwrap_err();
    match err {
        MapError::PaletteFile { path, .. } => assert!(path.ends_with("nope.json")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_malformed_json_is_palette_file_error() {
    let err = PaletteStore::from_json("{ \"onedark\": ").unwrap_err();
    assert!(matches!(err, MapError::PaletteFile { .. }));
}

#[test]
fn test_missing_slot_rejected() {
    let err = PaletteStore::from_json(PALETTE_JSON_MISSING_SLOT).unwrap_err();
    match err {
        MapError::MissingSlot { palette, slot } => {
            assert_eq!(palette, "broken");
            assert_eq!(slot, "base0F");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_bad_colour_rejected() {
    let json = PALETTE_JSON_MISSING_SLOT.replace("\"base0E\": \"#eeeeee\"", "\"base0E\": \"#eeeeee\", \"base0F\": \"nope\"");
    let err = PaletteStore::from_json(&json).unwrap_err();
    assert!(matches!(err, MapError::InvalidColor(_)));
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_unknown_palette_is_not_found() {
    let store = fixture_palette_store();
    let err = store.get("solarized").unwrap_err();
    assert!(matches!(err, MapError::PaletteNotFound(ref name) if name == "solarized"));
}

#[test]
fn test_resolve_fails_on_first_unknown() {
    let store = fixture_palette_store();
    assert_eq!(store.resolve(&["onedark", "grayscale-dark"]).unwrap().len(), 2);
    let err = store.resolve(&["onedark", "github"]).unwrap_err();
    assert!(matches!(err, MapError::PaletteNotFound(ref name) if name == "github"));
}

#[test]
fn test_extra_keys_ignored() {
    let json = r##"{"p": {
        "scheme": "Example", "author": "someone",
        "base00": "000000", "base01": "111111", "base02": "222222", "base03": "333333",
        "base04": "444444", "base05": "555555", "base06": "666666", "base07": "777777",
        "base08": "888888", "base09": "999999", "base0A": "aaaaaa", "base0B": "bbbbbb",
        "base0C": "cccccc", "base0D": "dddddd", "base0E": "eeeeee", "base0F": "ffffff"
    }}"##;
    let store = PaletteStore::from_json(json).unwrap();
    assert_eq!(store.get("p").unwrap().get(Slot::Base0F), Color::rgb(255, 255, 255));
}
