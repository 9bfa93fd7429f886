//! Common types shared by the map fetching, rendering and CLI crates.

pub mod color;
pub mod error;
pub mod geo;
pub mod palette;
pub mod street;

pub use color::Color;
pub use error::{MapError, MapResult, PipelineError, Stage, StageReport};
pub use geo::{BoundingBox, GeoPoint};
pub use palette::{Palette, PaletteStore, Slot};
pub use street::{Edge, EdgeStyle, HighwayClass, HighwayTag, StreetGraph, WaterPolygon};
