//! Edge classification: assigning each street segment a palette slot and a
//! stroke width.
//!
//! Two policies are available:
//! - [`ClassificationPolicy::RoadClass`] styles by highway classification
//! - [`ClassificationPolicy::SegmentLength`] buckets by segment length
//!
//! Both are total: an edge missing the attribute a policy looks at falls
//! through to that policy's default bucket.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use map_common::{Edge, EdgeStyle, HighwayClass, MapError, Palette, Slot, StreetGraph};

/// Highway values drawn as major arterial roads.
const MAJOR_ROADS: &[&str] = &["primary", "secondary", "tertiary", "unclassified", "residential"];

/// Length bucket upper bounds (inclusive, meters) and their slots.
const LENGTH_BUCKETS: &[(f64, Slot)] = &[
    (100.0, Slot::Base08),
    (200.0, Slot::Base09),
    (400.0, Slot::Base0A),
    (800.0, Slot::Base0B),
];

/// Slot for segments longer than the last bucket or without a length.
const LONG_SEGMENT_SLOT: Slot = Slot::Base05;

/// Maps an edge to a palette slot and a stroke width in points.
pub trait EdgeClassifier {
    fn classify(&self, edge: &Edge) -> (Slot, f32);
}

/// Built-in classification policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassificationPolicy {
    /// Style by highway type: motorways and trunks wide, paths muted.
    RoadClass,
    /// Colour by segment length with a constant stroke width.
    SegmentLength { line_width: f32 },
}

impl ClassificationPolicy {
    /// Length policy with the poster stroke width.
    pub const fn segment_length() -> Self {
        ClassificationPolicy::SegmentLength { line_width: 3.0 }
    }

    /// Background slot each policy was designed around.
    pub fn background_slot(&self) -> Slot {
        match self {
            ClassificationPolicy::RoadClass => Slot::Base00,
            ClassificationPolicy::SegmentLength { .. } => Slot::Base07,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassificationPolicy::RoadClass => "road-class",
            ClassificationPolicy::SegmentLength { .. } => "segment-length",
        }
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        ClassificationPolicy::RoadClass
    }
}

impl fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClassificationPolicy {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "road-class" | "highway" => Ok(ClassificationPolicy::RoadClass),
            "segment-length" | "length" => Ok(ClassificationPolicy::segment_length()),
            other => Err(MapError::InvalidArgument {
                param: "policy".to_string(),
                message: format!("unknown classification policy '{}'", other),
            }),
        }
    }
}

impl EdgeClassifier for ClassificationPolicy {
    fn classify(&self, edge: &Edge) -> (Slot, f32) {
        match self {
            ClassificationPolicy::RoadClass => classify_road(&edge.highway),
            ClassificationPolicy::SegmentLength { line_width } => {
                (classify_length(edge.length), *line_width)
            }
        }
    }
}

/// Road-class rules, first match wins.
pub fn classify_road(highway: &HighwayClass) -> (Slot, f32) {
    if highway.intersects(&["motorway"]) {
        (Slot::Base05, 2.0)
    } else if highway.intersects(&["trunk"]) {
        (Slot::Base05, 2.0)
    } else if highway.intersects(MAJOR_ROADS) {
        (Slot::Base05, 1.0)
    } else if highway.intersects(&["path"]) {
        (Slot::Base03, 1.0)
    } else {
        (Slot::Base02, 1.0)
    }
}

/// Length buckets; boundaries belong to the lower bucket.
pub fn classify_length(length: Option<f64>) -> Slot {
    let Some(length) = length.filter(|l| !l.is_nan()) else {
        return LONG_SEGMENT_SLOT;
    };
    LENGTH_BUCKETS
        .iter()
        .find(|(upper, _)| length <= *upper)
        .map(|(_, slot)| *slot)
        .unwrap_or(LONG_SEGMENT_SLOT)
}

/// Number of edges assigned to each slot.
pub type SlotCounts = BTreeMap<Slot, usize>;

/// Annotate every edge in `graph` with a colour from `palette`.
pub fn apply_palette(
    graph: &mut StreetGraph,
    classifier: &dyn EdgeClassifier,
    palette: &Palette,
) -> SlotCounts {
    info!(palette = %palette.name(), edges = graph.len(), "Applying palette to street data");

    let mut counts = SlotCounts::new();
    for edge in &mut graph.edges {
        let (slot, width) = classifier.classify(edge);
        edge.style = Some(EdgeStyle {
            slot,
            color: palette.get(slot),
            width,
        });
        *counts.entry(slot).or_default() += 1;
    }

    debug!(?counts, "Classification complete");
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::HighwayTag;

    fn class(tag: HighwayTag) -> HighwayClass {
        tag.into_class()
    }

    #[test]
    fn test_first_match_wins() {
        let tag = HighwayTag::Multi(vec!["path".into(), "motorway".into()]);
        assert_eq!(classify_road(&class(tag)), (Slot::Base05, 2.0));
    }

    #[test]
    fn test_policy_names_parse() {
        assert_eq!("road-class".parse::<ClassificationPolicy>().unwrap(), ClassificationPolicy::RoadClass);
        assert_eq!(
            "segment_length".parse::<ClassificationPolicy>().unwrap(),
            ClassificationPolicy::SegmentLength { line_width: 3.0 }
        );
        assert!("random".parse::<ClassificationPolicy>().is_err());
    }

    #[test]
    fn test_nan_length_is_default_bucket() {
        assert_eq!(classify_length(Some(f64::NAN)), Slot::Base05);
    }
}
