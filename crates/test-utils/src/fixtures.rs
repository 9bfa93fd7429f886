//! Common test fixtures: palette files, Overpass payloads and Nominatim
//! responses with known contents.

use std::path::{Path, PathBuf};

use map_common::PaletteStore;

/// Palette file with two complete palettes.
///
/// `onedark` uses the real One Dark base16 values; every slot is distinct so
/// tests can tell slots apart by colour.
pub const PALETTE_JSON: &str = r##"{
    "onedark": {
        "base00": "#282c34", "base01": "#353b45", "base02": "#3e4451", "base03": "#545862",
        "base04": "#565c64", "base05": "#abb2bf", "base06": "#b6bdca", "base07": "#c8ccd4",
        "base08": "#e06c75", "base09": "#d19a66", "base0A": "#e5c07b", "base0B": "#98c379",
        "base0C": "#56b6c2", "base0D": "#61afef", "base0E": "#c678dd", "base0F": "#be5046"
    },
    "grayscale-dark": {
        "base00": "#101010", "base01": "#252525", "base02": "#464646", "base03": "#525252",
        "base04": "#ababab", "base05": "#b9b9b9", "base06": "#e3e3e3", "base07": "#f7f7f7",
        "base08": "#7c7c7c", "base09": "#999999", "base0A": "#a0a0a0", "base0B": "#8e8e8e",
        "base0C": "#868686", "base0D": "#686868", "base0E": "#747474", "base0F": "#5e5e5e"
    }
}"##;

/// Palette file whose only palette lacks `base0F`.
pub const PALETTE_JSON_MISSING_SLOT: &str = r##"{
    "broken": {
        "base00": "#000000", "base01": "#111111", "base02": "#222222", "base03": "#333333",
        "base04": "#444444", "base05": "#555555", "base06": "#666666", "base07": "#777777",
        "base08": "#888888", "base09": "#999999", "base0A": "#aaaaaa", "base0B": "#bbbbbb",
        "base0C": "#cccccc", "base0D": "#dddddd", "base0E": "#eeeeee"
    }
}"##;

/// Overpass `out geom` response for a tiny street network.
///
/// Node layout (lat, lon):
///
/// ```text
///            4 (45.1890, 5.7250)
///            |
/// 1 -------- 2 -------- 3 ---- 6
///            |
///            5 (45.1870, 5.7250)
/// ```
///
/// Way 100 (primary) runs 1-2-3, way 101 (`residential;service`) runs 4-2-5,
/// way 102 (path) runs 3-6. Way 103 is under construction and way 104 is a
/// pedestrian area; neither is part of the network. Splitting at shared
/// nodes 2 and 3 yields five edges.
pub const OVERPASS_STREETS_JSON: &str = r##"{
    "version": 0.6,
    "generator": "Overpass API",
    "elements": [
        {
            "type": "way", "id": 100, "nodes": [1, 2, 3],
            "geometry": [
                {"lat": 45.1880, "lon": 5.7240},
                {"lat": 45.1880, "lon": 5.7250},
                {"lat": 45.1880, "lon": 5.7260}
            ],
            "tags": {"highway": "primary", "name": "Cours Jean Jaures"}
        },
        {
            "type": "way", "id": 101, "nodes": [4, 2, 5],
            "geometry": [
                {"lat": 45.1890, "lon": 5.7250},
                {"lat": 45.1880, "lon": 5.7250},
                {"lat": 45.1870, "lon": 5.7250}
            ],
            "tags": {"highway": "residential;service"}
        },
        {
            "type": "way", "id": 102, "nodes": [3, 6],
            "geometry": [
                {"lat": 45.1880, "lon": 5.7260},
                {"lat": 45.1885, "lon": 5.7265}
            ],
            "tags": {"highway": "path"}
        },
        {
            "type": "way", "id": 103, "nodes": [6, 7],
            "geometry": [
                {"lat": 45.1885, "lon": 5.7265},
                {"lat": 45.1895, "lon": 5.7275}
            ],
            "tags": {"highway": "construction"}
        },
        {
            "type": "way", "id": 104, "nodes": [8, 9, 10, 8],
            "geometry": [
                {"lat": 45.1860, "lon": 5.7230},
                {"lat": 45.1860, "lon": 5.7235},
                {"lat": 45.1865, "lon": 5.7235},
                {"lat": 45.1860, "lon": 5.7230}
            ],
            "tags": {"highway": "pedestrian", "area": "yes"}
        }
    ]
}"##;

/// Overpass response with one closed river way and one river relation made
/// of two outer halves.
pub const OVERPASS_WATER_JSON: &str = r##"{
    "elements": [
        {
            "type": "way", "id": 200, "nodes": [20, 21, 22, 23, 20],
            "geometry": [
                {"lat": 45.1900, "lon": 5.7200},
                {"lat": 45.1900, "lon": 5.7220},
                {"lat": 45.1910, "lon": 5.7220},
                {"lat": 45.1910, "lon": 5.7200},
                {"lat": 45.1900, "lon": 5.7200}
            ],
            "tags": {"natural": "water", "water": "river"}
        },
        {
            "type": "relation", "id": 300,
            "members": [
                {
                    "type": "way", "ref": 301, "role": "outer",
                    "geometry": [
                        {"lat": 45.1920, "lon": 5.7200},
                        {"lat": 45.1920, "lon": 5.7240},
                        {"lat": 45.1930, "lon": 5.7240}
                    ]
                },
                {
                    "type": "way", "ref": 302, "role": "outer",
                    "geometry": [
                        {"lat": 45.1920, "lon": 5.7200},
                        {"lat": 45.1930, "lon": 5.7200},
                        {"lat": 45.1930, "lon": 5.7240}
                    ]
                },
                {
                    "type": "way", "ref": 303, "role": "inner",
                    "geometry": [
                        {"lat": 45.1923, "lon": 5.7210},
                        {"lat": 45.1923, "lon": 5.7215},
                        {"lat": 45.1926, "lon": 5.7215},
                        {"lat": 45.1923, "lon": 5.7210}
                    ]
                }
            ],
            "tags": {"type": "multipolygon", "natural": "water", "water": "river"}
        }
    ]
}"##;

/// Nominatim `jsonv2` search response for Grenoble.
pub const NOMINATIM_GRENOBLE_JSON: &str = r##"[
    {
        "place_id": 298563497,
        "lat": "45.1875602",
        "lon": "5.7357819",
        "display_name": "Grenoble, Isère, Auvergne-Rhône-Alpes, France métropolitaine, France",
        "category": "boundary",
        "type": "administrative"
    }
]"##;

/// Parsed [`PALETTE_JSON`].
pub fn fixture_palette_store() -> PaletteStore {
    PaletteStore::from_json(PALETTE_JSON).expect("fixture palette JSON is valid")
}

/// Writes [`PALETTE_JSON`] into `dir` and returns the file path.
pub fn write_palette_file(dir: &Path) -> PathBuf {
    let path = dir.join("base16_schemes.json");
    std::fs::write(&path, PALETTE_JSON).expect("Failed to write palette fixture");
    path
}
