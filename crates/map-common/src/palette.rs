//! base16 colour palettes and the JSON palette store.
//!
//! A palette file is a JSON object mapping palette names to objects with the
//! sixteen keys `base00`..`base0F`:
//!
//! ```json
//! {
//!   "onedark": { "base00": "#282c34", "base01": "#353b45", ... }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use crate::color::Color;
use crate::error::{MapError, MapResult};

/// One of the sixteen base16 colour positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Base00,
    Base01,
    Base02,
    Base03,
    Base04,
    Base05,
    Base06,
    Base07,
    Base08,
    Base09,
    Base0A,
    Base0B,
    Base0C,
    Base0D,
    Base0E,
    Base0F,
}

impl Slot {
    pub const ALL: [Slot; 16] = [
        Slot::Base00,
        Slot::Base01,
        Slot::Base02,
        Slot::Base03,
        Slot::Base04,
        Slot::Base05,
        Slot::Base06,
        Slot::Base07,
        Slot::Base08,
        Slot::Base09,
        Slot::Base0A,
        Slot::Base0B,
        Slot::Base0C,
        Slot::Base0D,
        Slot::Base0E,
        Slot::Base0F,
    ];

    /// The key used for this slot in palette files.
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Base00 => "base00",
            Slot::Base01 => "base01",
            Slot::Base02 => "base02",
            Slot::Base03 => "base03",
            Slot::Base04 => "base04",
            Slot::Base05 => "base05",
            Slot::Base06 => "base06",
            Slot::Base07 => "base07",
            Slot::Base08 => "base08",
            Slot::Base09 => "base09",
            Slot::Base0A => "base0A",
            Slot::Base0B => "base0B",
            Slot::Base0C => "base0C",
            Slot::Base0D => "base0D",
            Slot::Base0E => "base0E",
            Slot::Base0F => "base0F",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Slot {
    type Err = MapError;

    /// Keys are matched case-insensitively, so `base0a` and `base0A` agree.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .iter()
            .copied()
            .find(|slot| slot.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| MapError::InvalidArgument {
                param: "slot".to_string(),
                message: format!("'{}' is not one of base00..base0F", s),
            })
    }
}

/// A named set of sixteen colours. Every slot is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    name: String,
    colors: BTreeMap<Slot, Color>,
}

impl Palette {
    /// Build a palette from raw key/value pairs, failing if a slot is missing
    /// or a value does not parse as a colour. Unknown keys are ignored.
    pub fn from_entries(name: &str, entries: &HashMap<String, String>) -> MapResult<Self> {
        let mut colors = BTreeMap::new();
        for (key, value) in entries {
            match key.parse::<Slot>() {
                Ok(slot) => {
                    let color = Color::parse(value).map_err(|_| {
                        MapError::InvalidColor(format!("{}.{} = {:?}", name, key, value))
                    })?;
                    colors.insert(slot, color);
                }
                Err(_) => debug!(palette = %name, key = %key, "Ignoring non-slot palette key"),
            }
        }

        if let Some(missing) = Slot::ALL.iter().find(|slot| !colors.contains_key(slot)) {
            return Err(MapError::MissingSlot {
                palette: name.to_string(),
                slot: missing.key().to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            colors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Colour for a slot.
    pub fn get(&self, slot: Slot) -> Color {
        // from_entries guarantees all sixteen slots
        self.colors[&slot]
    }

    /// Colours in slot order `base00`..`base0F`.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Color)> + '_ {
        self.colors.iter().map(|(slot, color)| (*slot, *color))
    }
}

/// All palettes from one palette file, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PaletteStore {
    palettes: BTreeMap<String, Palette>,
}

impl PaletteStore {
    /// Load palettes from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading colour palettes");
        let content = std::fs::read_to_string(path).map_err(|e| MapError::PaletteFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| match e {
            MapError::PaletteFile { message, .. } => MapError::PaletteFile {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse palettes from a JSON string.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let raw: BTreeMap<String, HashMap<String, String>> =
            serde_json::from_str(json).map_err(|e| MapError::PaletteFile {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;

        let palettes = raw
            .iter()
            .map(|(name, entries)| Ok((name.clone(), Palette::from_entries(name, entries)?)))
            .collect::<MapResult<BTreeMap<_, _>>>()?;

        debug!(count = palettes.len(), "Loaded palettes");
        Ok(Self { palettes })
    }

    /// Look up a palette by name. Unknown names are an error, never a default.
    pub fn get(&self, name: &str) -> MapResult<&Palette> {
        self.palettes
            .get(name)
            .ok_or_else(|| MapError::PaletteNotFound(name.to_string()))
    }

    /// Resolve every requested name, failing on the first unknown one.
    pub fn resolve<'a, S: AsRef<str>>(&'a self, names: &[S]) -> MapResult<Vec<&'a Palette>> {
        names.iter().map(|name| self.get(name.as_ref())).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.values()
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys_parse_back() {
        for slot in Slot::ALL {
            assert_eq!(slot.key().parse::<Slot>().unwrap(), slot);
        }
        assert_eq!("base0a".parse::<Slot>().unwrap(), Slot::Base0A);
        assert!("base10".parse::<Slot>().is_err());
    }

    #[test]
    fn test_slot_order_matches_keys() {
        let keys: Vec<&str> = Slot::ALL.iter().map(Slot::key).collect();
        let mut sorted = keys.clone();
        sorted.sort_by_key(|k| k.to_ascii_lowercase());
        assert_eq!(keys, sorted);
    }
}
