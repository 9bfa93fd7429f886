//! Synthetic street graphs for classifier, renderer and pipeline tests.

use map_common::{Edge, GeoPoint, HighwayClass, HighwayTag, StreetGraph};

/// Meters per degree of latitude, close enough for test geometry.
const METERS_PER_DEGREE: f64 = 111_195.0;

/// Builds a graph of geometry-free edges with the given lengths, all tagged
/// `residential`.
///
/// # Example
///
/// ```
/// use test_utils::graph_with_lengths;
///
/// let graph = graph_with_lengths(&[Some(50.0), Some(150.0), None]);
/// assert_eq!(graph.len(), 3);
/// assert_eq!(graph.edges[2].length, None);
/// ```
pub fn graph_with_lengths(lengths: &[Option<f64>]) -> StreetGraph {
    StreetGraph::new(
        lengths
            .iter()
            .enumerate()
            .map(|(i, length)| {
                let mut edge = Edge::with_attributes(HighwayClass::from_values(["residential"]), *length);
                edge.from = i as i64;
                edge.to = i as i64 + 1;
                edge
            })
            .collect(),
    )
}

/// Builds a graph of geometry-free edges with the given highway tags.
pub fn graph_with_tags(tags: Vec<HighwayTag>) -> StreetGraph {
    StreetGraph::new(
        tags.into_iter()
            .map(|tag| Edge::with_attributes(tag.into_class(), Some(100.0)))
            .collect(),
    )
}

/// Builds an `n` x `n` street grid around `center`, `spacing` meters apart.
///
/// Horizontal streets are `primary`, vertical streets `residential`, and
/// every edge carries its real geometry and length.
pub fn grid_graph(center: GeoPoint, n: usize, spacing: f64) -> StreetGraph {
    let dlat = spacing / METERS_PER_DEGREE;
    let dlon = spacing / (METERS_PER_DEGREE * center.lat.to_radians().cos());
    let half = (n as f64 - 1.0) / 2.0;

    let node = |row: usize, col: usize| {
        GeoPoint::new(
            center.lat + (row as f64 - half) * dlat,
            center.lon + (col as f64 - half) * dlon,
        )
    };
    let id = |row: usize, col: usize| (row * n + col) as i64;

    let mut edges = Vec::new();
    for row in 0..n {
        for col in 0..n {
            if col + 1 < n {
                edges.push(make_edge(id(row, col), id(row, col + 1), node(row, col), node(row, col + 1), "primary"));
            }
            if row + 1 < n {
                edges.push(make_edge(id(row, col), id(row + 1, col), node(row, col), node(row + 1, col), "residential"));
            }
        }
    }
    StreetGraph::new(edges)
}

fn make_edge(from: i64, to: i64, a: GeoPoint, b: GeoPoint, highway: &str) -> Edge {
    Edge {
        from,
        to,
        way_id: from * 10_000 + to,
        length: Some(a.haversine_distance(&b)),
        geometry: vec![a, b],
        highway: HighwayClass::from_values([highway]),
        style: None,
    }
}
