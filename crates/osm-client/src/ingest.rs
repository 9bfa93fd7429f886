//! Conversion of Overpass `out geom` responses into the map data model.
//!
//! Ways are split at every node they share with another way, so each
//! [`Edge`] runs between two graph nodes and its length reflects the street
//! segment rather than the whole OSM way.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use map_common::geo::polyline_length;
use map_common::{Edge, GeoPoint, HighwayTag, MapResult, StreetGraph, WaterPolygon};

/// Highway values that are not part of a drivable/walkable network.
pub const EXCLUDED_HIGHWAYS: &[&str] = &[
    "abandoned",
    "construction",
    "no",
    "planned",
    "platform",
    "proposed",
    "raceway",
    "razed",
];

/// Tolerance when matching ring endpoints, in degrees.
const ENDPOINT_EPSILON: f64 = 1e-9;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    id: i64,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
    #[serde(default)]
    members: Vec<RelationMember>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RelationMember {
    #[serde(rename = "type")]
    member_type: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<Option<LatLon>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

impl From<LatLon> for GeoPoint {
    fn from(p: LatLon) -> Self {
        GeoPoint::new(p.lat, p.lon)
    }
}

/// Complete geometry or `None` if Overpass left holes in it.
fn full_geometry(geometry: &[Option<LatLon>]) -> Option<Vec<GeoPoint>> {
    geometry.iter().map(|p| p.map(GeoPoint::from)).collect()
}

struct StreetWay {
    id: i64,
    nodes: Vec<i64>,
    geometry: Vec<GeoPoint>,
    highway: HighwayTag,
}

fn is_network_way(element: &OverpassElement) -> Option<&str> {
    if element.element_type != "way" {
        return None;
    }
    let highway = element.tags.get("highway")?;
    if element.tags.get("area").map(String::as_str) == Some("yes") {
        return None;
    }
    if EXCLUDED_HIGHWAYS.contains(&highway.as_str()) {
        return None;
    }
    Some(highway)
}

/// Parse an Overpass highway response into a street graph.
pub fn parse_streets(json: &str) -> MapResult<StreetGraph> {
    let response: OverpassResponse = serde_json::from_str(json)?;

    let mut ways = Vec::new();
    for element in &response.elements {
        let Some(highway) = is_network_way(element) else {
            continue;
        };
        let Some(geometry) = full_geometry(&element.geometry) else {
            warn!(way = element.id, "Skipping way with incomplete geometry");
            continue;
        };
        if geometry.len() != element.nodes.len() || geometry.len() < 2 {
            warn!(
                way = element.id,
                nodes = element.nodes.len(),
                points = geometry.len(),
                "Skipping way whose geometry does not match its nodes"
            );
            continue;
        }
        ways.push(StreetWay {
            id: element.id,
            nodes: element.nodes.clone(),
            geometry,
            highway: HighwayTag::parse(highway),
        });
    }

    // Nodes used more than once across all ways are intersections.
    let mut usage: HashMap<i64, usize> = HashMap::new();
    for way in &ways {
        for node in &way.nodes {
            *usage.entry(*node).or_default() += 1;
        }
    }

    let mut edges = Vec::new();
    for way in ways {
        split_way(way, &usage, &mut edges);
    }

    debug!(edges = edges.len(), "Built street graph");
    Ok(StreetGraph::new(edges))
}

fn split_way(way: StreetWay, usage: &HashMap<i64, usize>, edges: &mut Vec<Edge>) {
    let class = way.highway.into_class();
    let last = way.nodes.len() - 1;
    let mut start = 0;

    for i in 1..=last {
        let node = way.nodes[i];
        let is_split = i == last || usage.get(&node).copied().unwrap_or(0) > 1;
        if !is_split {
            continue;
        }

        let geometry = way.geometry[start..=i].to_vec();
        let length = (geometry.len() >= 2).then(|| polyline_length(&geometry));
        edges.push(Edge {
            from: way.nodes[start],
            to: node,
            way_id: way.id,
            geometry,
            length,
            highway: class.clone(),
            style: None,
        });
        start = i;
    }
}

/// Parse an Overpass water response into polygons.
///
/// Closed ways become single-ring polygons; multipolygon relations have
/// their outer and inner member ways stitched into rings.
pub fn parse_water(json: &str) -> MapResult<Vec<WaterPolygon>> {
    let response: OverpassResponse = serde_json::from_str(json)?;
    let mut polygons = Vec::new();

    for element in &response.elements {
        match element.element_type.as_str() {
            "way" => {
                let Some(ring) = full_geometry(&element.geometry) else {
                    continue;
                };
                if is_closed(&ring) {
                    polygons.push(WaterPolygon {
                        exterior: ring,
                        holes: Vec::new(),
                    });
                } else {
                    debug!(way = element.id, "Skipping open water way");
                }
            }
            "relation" => polygons.extend(relation_polygons(element)),
            _ => {}
        }
    }

    debug!(polygons = polygons.len(), "Built water layer");
    Ok(polygons)
}

fn relation_polygons(relation: &OverpassElement) -> Vec<WaterPolygon> {
    let segments = |role: &str| -> Vec<Vec<GeoPoint>> {
        relation
            .members
            .iter()
            .filter(|m| m.member_type == "way" && m.role == role)
            .filter_map(|m| full_geometry(&m.geometry))
            .filter(|g| g.len() >= 2)
            .collect()
    };

    let outers = stitch_rings(segments("outer"));
    let inners = stitch_rings(segments("inner"));
    if outers.is_empty() {
        warn!(relation = relation.id, "Relation has no closed outer ring");
        return Vec::new();
    }

    let mut polygons: Vec<WaterPolygon> = outers
        .into_iter()
        .map(|exterior| WaterPolygon {
            exterior,
            holes: Vec::new(),
        })
        .collect();

    for hole in inners {
        let owner = polygons
            .iter()
            .position(|p| ring_contains(&p.exterior, &hole[0]))
            .unwrap_or(0);
        polygons[owner].holes.push(hole);
    }
    polygons
}

fn same_point(a: &GeoPoint, b: &GeoPoint) -> bool {
    (a.lat - b.lat).abs() < ENDPOINT_EPSILON && (a.lon - b.lon).abs() < ENDPOINT_EPSILON
}

fn is_closed(ring: &[GeoPoint]) -> bool {
    ring.len() >= 4 && same_point(&ring[0], &ring[ring.len() - 1])
}

/// Join way segments end to end into closed rings. Segments that cannot be
/// closed are dropped.
pub(crate) fn stitch_rings(mut segments: Vec<Vec<GeoPoint>>) -> Vec<Vec<GeoPoint>> {
    let mut rings = Vec::new();

    while let Some(mut ring) = segments.pop() {
        while !is_closed(&ring) {
            let end = ring[ring.len() - 1];
            let next = segments.iter().position(|s| {
                same_point(&s[0], &end) || same_point(&s[s.len() - 1], &end)
            });
            let Some(index) = next else {
                break;
            };
            let mut segment = segments.swap_remove(index);
            if !same_point(&segment[0], &end) {
                segment.reverse();
            }
            ring.extend(segment.into_iter().skip(1));
        }

        if is_closed(&ring) {
            rings.push(ring);
        } else {
            warn!(points = ring.len(), "Dropping ring that could not be closed");
        }
    }
    rings
}

/// Even-odd point-in-polygon test in lon/lat space.
fn ring_contains(ring: &[GeoPoint], point: &GeoPoint) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat)
            && point.lon < (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    #[test]
    fn test_stitch_reverses_segments() {
        let rings = stitch_rings(vec![
            vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0)],
            vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)],
        ]);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 5);
        assert!(is_closed(&rings[0]));
    }

    #[test]
    fn test_stitch_drops_open_chain() {
        let rings = stitch_rings(vec![vec![p(0.0, 0.0), p(0.0, 1.0)]]);
        assert!(rings.is_empty());
    }

    #[test]
    fn test_ring_contains() {
        let square = vec![p(0.0, 0.0), p(0.0, 2.0), p(2.0, 2.0), p(2.0, 0.0), p(0.0, 0.0)];
        assert!(ring_contains(&square, &p(1.0, 1.0)));
        assert!(!ring_contains(&square, &p(3.0, 1.0)));
    }

    #[test]
    fn test_single_point_ways_are_skipped() {
        let json = r#"{"elements": [{"type": "way", "id": 1, "nodes": [1],
            "geometry": [{"lat": 1.0, "lon": 1.0}], "tags": {"highway": "residential"}}]}"#;
        assert!(parse_streets(json).unwrap().is_empty());
    }
}
