//! Error types for the map generation pipeline.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for palette, fetch, render and export operations.
#[derive(Debug, Error)]
pub enum MapError {
    // === Configuration Errors ===
    #[error("Failed to load palette file {path}: {message}")]
    PaletteFile { path: String, message: String },

    #[error("Palette not found: {0}")]
    PaletteNotFound(String),

    #[error("Palette '{palette}' is missing slot {slot}")]
    MissingSlot { palette: String, slot: String },

    #[error("Invalid colour value: {0}")]
    InvalidColor(String),

    #[error("Invalid border specification: {0}")]
    InvalidBorder(String),

    #[error("Invalid argument '{param}': {message}")]
    InvalidArgument { param: String, message: String },

    // === External Service Errors ===
    #[error("Geocoding failed for '{0}'")]
    Geocoding(String),

    #[error("No street network found for {0}")]
    EmptyNetwork(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Font error: {0}")]
    Font(String),

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(String),
}

impl MapError {
    /// Whether the error is a configuration problem that should stop a batch
    /// before any place is processed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MapError::PaletteFile { .. }
                | MapError::PaletteNotFound(_)
                | MapError::MissingSlot { .. }
                | MapError::InvalidColor(_)
                | MapError::InvalidBorder(_)
                | MapError::InvalidArgument { .. }
        )
    }

    /// Whether the error came from one of the remote services.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            MapError::Geocoding(_) | MapError::EmptyNetwork(_) | MapError::Fetch(_)
        )
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Fetch(format!("JSON error: {}", err))
    }
}

/// A step of the per-place pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Geocode,
    Fetch,
    Classify,
    Render,
    Composite,
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Geocode => "geocode",
            Stage::Fetch => "fetch",
            Stage::Classify => "classify",
            Stage::Render => "render",
            Stage::Composite => "composite",
            Stage::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tagged with the stage and the (place, palette) pair it hit.
///
/// Stages that run once per place (geocode, fetch) carry no palette.
#[derive(Debug, Error)]
#[error("{stage} failed for {}: {source}", describe_target(.place, .palette))]
pub struct PipelineError {
    pub stage: Stage,
    pub place: String,
    pub palette: Option<String>,
    #[source]
    pub source: MapError,
}

impl PipelineError {
    pub fn new(stage: Stage, place: impl Into<String>, palette: Option<&str>, source: MapError) -> Self {
        Self {
            stage,
            place: place.into(),
            palette: palette.map(str::to_string),
            source,
        }
    }
}

fn describe_target(place: &str, palette: &Option<String>) -> String {
    match palette {
        Some(palette) => format!("'{}' with palette '{}'", place, palette),
        None => format!("'{}'", place),
    }
}

/// Timing record for a completed stage, reported to observers.
#[derive(Debug, Clone)]
pub struct StageReport<'a> {
    pub stage: Stage,
    pub place: &'a str,
    pub palette: Option<&'a str>,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_names_stage_and_pair() {
        let err = PipelineError::new(
            Stage::Render,
            "Grenoble, France",
            Some("onedark"),
            MapError::Render("pixmap allocation failed".to_string()),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("render failed"));
        assert!(msg.contains("Grenoble, France"));
        assert!(msg.contains("onedark"));
    }

    #[test]
    fn test_pipeline_error_without_palette() {
        let err = PipelineError::new(Stage::Fetch, "Dubai", None, MapError::EmptyNetwork("Dubai".into()));
        assert_eq!(
            err.to_string(),
            "fetch failed for 'Dubai': No street network found for Dubai"
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(MapError::PaletteNotFound("x".into()).is_configuration());
        assert!(MapError::InvalidBorder("x".into()).is_configuration());
        assert!(!MapError::Geocoding("x".into()).is_configuration());
        assert!(MapError::Geocoding("x".into()).is_external());
        assert!(!MapError::Render("x".into()).is_external());
    }
}
