//! Street map poster generator.
//!
//! Turns place names into palette-coloured street maps: geocode the place,
//! fetch its street network from OpenStreetMap, colour each street by a
//! classification policy, rasterize, and optionally frame the result with
//! the place name.

pub mod commands;
pub mod config;
pub mod pipeline;

pub use config::{BatchConfig, PlaceConfig};
pub use pipeline::{
    BatchReport, Pipeline, PipelineConfig, PlaceOutput, PlaceRequest, StageObserver,
    TracingObserver,
};
