//! Street network and water data model.
//!
//! The fetcher produces a [`StreetGraph`]; the classifier annotates each
//! [`Edge`] with an [`EdgeStyle`]; the renderer draws it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geo::{BoundingBox, GeoPoint};
use crate::palette::Slot;

/// A raw `highway` value as it arrives from the data source: either one
/// classification or several (e.g. `residential;service` in OSM, or a list
/// after graph simplification merged differently tagged ways).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HighwayTag {
    Single(String),
    Multi(Vec<String>),
}

impl HighwayTag {
    /// Parse an OSM tag value, where `;` separates multiple values.
    pub fn parse(raw: &str) -> Self {
        let values: Vec<String> = raw
            .split(';')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        match values.len() {
            0 => HighwayTag::Single(String::new()),
            1 => HighwayTag::Single(values.into_iter().next().unwrap_or_default()),
            _ => HighwayTag::Multi(values),
        }
    }

    /// Normalise into the set form the classifier works on.
    pub fn into_class(self) -> HighwayClass {
        match self {
            HighwayTag::Single(value) => HighwayClass::from_values([value]),
            HighwayTag::Multi(values) => HighwayClass::from_values(values),
        }
    }
}

/// Normalised set of highway classifications for one edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighwayClass(BTreeSet<String>);

impl HighwayClass {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            values
                .into_iter()
                .map(Into::into)
                .filter(|v: &String| !v.is_empty())
                .collect(),
        )
    }

    /// True if any of this edge's classifications is in `category`.
    pub fn intersects(&self, category: &[&str]) -> bool {
        self.0.iter().any(|value| category.contains(&value.as_str()))
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<HighwayTag> for HighwayClass {
    fn from(tag: HighwayTag) -> Self {
        tag.into_class()
    }
}

/// Resolved drawing style for an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    pub slot: Slot,
    pub color: Color,
    /// Stroke width in points.
    pub width: f32,
}

/// A street segment between two graph nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: i64,
    pub to: i64,
    pub way_id: i64,
    pub geometry: Vec<GeoPoint>,
    /// Length in meters, absent when the geometry is degenerate.
    pub length: Option<f64>,
    pub highway: HighwayClass,
    /// Set by the classifier.
    pub style: Option<EdgeStyle>,
}

impl Edge {
    /// Construct an unclassified edge with the given attributes and no geometry.
    pub fn with_attributes(highway: HighwayClass, length: Option<f64>) -> Self {
        Self {
            from: 0,
            to: 0,
            way_id: 0,
            geometry: Vec::new(),
            length,
            highway,
            style: None,
        }
    }
}

/// The street network for one place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreetGraph {
    pub edges: Vec<Edge>,
}

impl StreetGraph {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of distinct nodes referenced by edges.
    pub fn node_count(&self) -> usize {
        self.edges
            .iter()
            .flat_map(|e| [e.from, e.to])
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Bounding box of all edge geometry in Web Mercator meters.
    pub fn mercator_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.edges
                .iter()
                .flat_map(|e| e.geometry.iter())
                .map(GeoPoint::to_web_mercator),
        )
    }

    /// Whether every edge has been assigned a style.
    pub fn is_classified(&self) -> bool {
        self.edges.iter().all(|e| e.style.is_some())
    }
}

/// A water body polygon: one exterior ring plus optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterPolygon {
    pub exterior: Vec<GeoPoint>,
    pub holes: Vec<Vec<GeoPoint>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_and_multi() {
        assert_eq!(HighwayTag::parse("residential"), HighwayTag::Single("residential".into()));
        assert_eq!(
            HighwayTag::parse("primary; secondary"),
            HighwayTag::Multi(vec!["primary".into(), "secondary".into()])
        );
    }

    #[test]
    fn test_untagged_deserialize() {
        let single: HighwayTag = serde_json::from_str("\"motorway\"").unwrap();
        assert_eq!(single, HighwayTag::Single("motorway".into()));
        let multi: HighwayTag = serde_json::from_str("[\"path\", \"footway\"]").unwrap();
        assert_eq!(multi, HighwayTag::Multi(vec!["path".into(), "footway".into()]));
    }

    #[test]
    fn test_class_intersects() {
        let class = HighwayTag::Multi(vec!["service".into(), "residential".into()]).into_class();
        assert!(class.intersects(&["primary", "residential"]));
        assert!(!class.intersects(&["motorway"]));
        assert!(class.contains("service"));
    }

    #[test]
    fn test_empty_tag_normalises_to_empty_class() {
        assert!(HighwayTag::parse("").into_class().is_empty());
        assert!(HighwayTag::parse(" ; ").into_class().is_empty());
    }
}
