//! Per-place map generation.
//!
//! For each place: geocode, fetch streets and water, then for each palette
//! classify, render and export, optionally followed by the labelled poster
//! frame. Every stage is timed and reported to a [`StageObserver`]; a
//! failing stage is returned as a [`PipelineError`] naming the stage and the
//! (place, palette) pair.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use map_common::{MapError, MapResult, PaletteStore, PipelineError, Stage, StageReport};
use osm_client::{Geocoder, GeometrySource};
use renderer::{
    apply_palette, export, frame_with_label, render_map, ClassificationPolicy, FrameStyle,
    LabelFont, RenderOptions, DEFAULT_PREVIEW_MAX,
};

/// Search radius around the geocoded center, in meters.
pub const DEFAULT_RADIUS_M: u32 = 3000;

/// Palette used when none is requested.
pub const DEFAULT_PALETTE: &str = "onedark";

/// Receives timing for each finished stage.
pub trait StageObserver: Send + Sync {
    fn stage_finished(&self, report: &StageReport<'_>);

    fn stage_failed(&self, _error: &PipelineError) {}
}

/// Emits one structured event per stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn stage_finished(&self, report: &StageReport<'_>) {
        info!(
            stage = %report.stage,
            place = report.place,
            palette = report.palette.unwrap_or("-"),
            duration_ms = report.duration.as_millis() as u64,
            "Stage finished"
        );
    }

    fn stage_failed(&self, err: &PipelineError) {
        error!(
            stage = %err.stage,
            place = %err.place,
            palette = err.palette.as_deref().unwrap_or("-"),
            error = %err.source,
            "Stage failed"
        );
    }
}

/// A place to map and the radius to fetch around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRequest {
    pub name: String,
    pub radius_m: u32,
}

impl PlaceRequest {
    pub fn new(name: impl Into<String>, radius_m: u32) -> Self {
        Self {
            name: name.into(),
            radius_m,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the output tree; each place gets a subdirectory.
    pub export_dir: PathBuf,
    pub palette_names: Vec<String>,
    pub policy: ClassificationPolicy,
    /// Canvas settings. The background slot is taken from the policy.
    pub render: RenderOptions,
    pub fetch_water: bool,
    pub frame: FrameStyle,
    pub preview_max: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("export"),
            palette_names: vec![DEFAULT_PALETTE.to_string()],
            policy: ClassificationPolicy::default(),
            render: RenderOptions::default(),
            fetch_water: true,
            frame: FrameStyle::default(),
            preview_max: DEFAULT_PREVIEW_MAX,
        }
    }
}

/// Files written for one place.
#[derive(Debug, Clone, Default)]
pub struct PlaceOutput {
    pub place: String,
    pub maps: Vec<PathBuf>,
    pub labelled: Vec<PathBuf>,
}

/// Outcome of a batch run. Places failing on external data are skipped; a
/// configuration error stops the batch and sets `aborted`.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<PlaceOutput>,
    pub failed: Vec<PipelineError>,
    pub aborted: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// `"Grenoble, France"` -> `"Grenoble_France"`.
///
/// The result is a single path component: separators become `_` and leading
/// dots are dropped.
pub fn clean_place_name(place: &str) -> String {
    let cleaned: String = place
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "place".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Text printed under a labelled map.
pub fn label_text(place: &str) -> String {
    place.trim().to_uppercase()
}

pub struct Pipeline<G, S> {
    geocoder: G,
    source: S,
    store: PaletteStore,
    config: PipelineConfig,
    font: Option<Box<dyn LabelFont>>,
    observer: Arc<dyn StageObserver>,
}

impl<G: Geocoder, S: GeometrySource> Pipeline<G, S> {
    /// Fails if a configured palette is missing from `store`, before any
    /// network work happens.
    pub fn new(geocoder: G, source: S, store: PaletteStore, config: PipelineConfig) -> MapResult<Self> {
        if config.palette_names.is_empty() {
            return Err(MapError::InvalidArgument {
                param: "palette_names".to_string(),
                message: "at least one palette is required".to_string(),
            });
        }
        store.resolve(&config.palette_names)?;

        Ok(Self {
            geocoder,
            source,
            store,
            config,
            font: None,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Also write a framed, labelled copy of each map.
    pub fn with_font(mut self, font: Box<dyn LabelFont>) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn map_path(&self, place: &str, palette: &str) -> PathBuf {
        let clean = clean_place_name(place);
        self.config
            .export_dir
            .join(&clean)
            .join(format!("{}_{}.png", clean, palette))
    }

    pub fn labelled_path(&self, place: &str, palette: &str) -> PathBuf {
        let clean = clean_place_name(place);
        self.config
            .export_dir
            .join(&clean)
            .join(format!("{}_{}_named.png", clean, palette))
    }

    async fn observe<T, F>(
        &self,
        stage: Stage,
        place: &str,
        palette: Option<&str>,
        work: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = MapResult<T>>,
    {
        let started = Instant::now();
        match work.await {
            Ok(value) => {
                self.observer.stage_finished(&StageReport {
                    stage,
                    place,
                    palette,
                    duration: started.elapsed(),
                });
                Ok(value)
            }
            Err(source) => {
                let err = PipelineError::new(stage, place, palette, source);
                self.observer.stage_failed(&err);
                Err(err)
            }
        }
    }

    /// Generate every configured palette for one place.
    pub async fn run_place(&self, request: &PlaceRequest) -> Result<PlaceOutput, PipelineError> {
        let place = request.name.as_str();
        info!(place, radius_m = request.radius_m, "Generating maps");

        let center = self
            .observe(Stage::Geocode, place, None, self.geocoder.geocode(place))
            .await?;

        let (mut graph, water) = self
            .observe(Stage::Fetch, place, None, async {
                let graph = self.source.fetch_streets(center, request.radius_m).await?;
                let water = if self.config.fetch_water {
                    self.source.fetch_water(center, request.radius_m).await?
                } else {
                    Vec::new()
                };
                Ok::<_, MapError>((graph, water))
            })
            .await?;
        info!(
            place,
            edges = graph.len(),
            nodes = graph.node_count(),
            water = water.len(),
            "Street network loaded"
        );

        let render_options = RenderOptions {
            background_slot: self.config.policy.background_slot(),
            ..self.config.render.clone()
        };
        let text = label_text(place);
        let mut output = PlaceOutput {
            place: place.to_string(),
            ..PlaceOutput::default()
        };

        for name in &self.config.palette_names {
            let palette_name = Some(name.as_str());

            let palette = self
                .observe(Stage::Classify, place, palette_name, async {
                    let palette = self.store.get(name)?;
                    apply_palette(&mut graph, &self.config.policy, palette);
                    Ok::<_, MapError>(palette)
                })
                .await?;

            let image = self
                .observe(Stage::Render, place, palette_name, async {
                    render_map(&graph, &water, palette, &render_options)
                })
                .await?;

            let map_path = self.map_path(place, name);
            self.observe(Stage::Export, place, palette_name, async {
                export(&image, &map_path, self.config.preview_max)
            })
            .await?;
            output.maps.push(map_path);

            if let Some(font) = &self.font {
                let framed = self
                    .observe(Stage::Composite, place, palette_name, async {
                        frame_with_label(&image, &text, palette, &**font, &self.config.frame)
                    })
                    .await?;

                let labelled_path = self.labelled_path(place, name);
                self.observe(Stage::Export, place, palette_name, async {
                    export(&framed, &labelled_path, self.config.preview_max)
                })
                .await?;
                output.labelled.push(labelled_path);
            }
        }

        Ok(output)
    }

    /// Run places one after another, skipping the ones that fail. A
    /// configuration error would fail every remaining place too, so it ends
    /// the batch.
    pub async fn run_batch(&self, places: &[PlaceRequest]) -> BatchReport {
        let mut report = BatchReport::default();
        for request in places {
            match self.run_place(request).await {
                Ok(output) => {
                    info!(place = %output.place, maps = output.maps.len(), "Place complete");
                    report.completed.push(output);
                }
                Err(err) if err.source.is_configuration() => {
                    error!(error = %err, "Aborting batch");
                    report.failed.push(err);
                    report.aborted = true;
                    break;
                }
                Err(err) => {
                    if err.source.is_external() {
                        warn!(error = %err, "Skipping place");
                    } else {
                        error!(error = %err, "Skipping place");
                    }
                    report.failed.push(err);
                }
            }
        }
        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            aborted = report.aborted,
            "Batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_place_name() {
        assert_eq!(clean_place_name("Grenoble, France"), "Grenoble_France");
        assert_eq!(clean_place_name("New York City"), "New_York_City");
        assert_eq!(clean_place_name(" Dubai "), "Dubai");
        assert_eq!(clean_place_name("St. Louis"), "St._Louis");
    }

    #[test]
    fn test_clean_place_name_stays_one_component() {
        assert_eq!(clean_place_name("../etc"), "_etc");
        assert_eq!(clean_place_name("a/../b"), "a_.._b");
        assert_eq!(clean_place_name("C:\\maps"), "C__maps");
        assert_eq!(clean_place_name(".."), "place");
        for name in ["../etc", "a/../b", "..", "/abs/path"] {
            let cleaned = clean_place_name(name);
            assert_eq!(std::path::Path::new(&cleaned).components().count(), 1, "{}", name);
            assert!(matches!(
                std::path::Path::new(&cleaned).components().next(),
                Some(std::path::Component::Normal(_))
            ));
        }
    }

    #[test]
    fn test_label_text() {
        assert_eq!(label_text("Grenoble"), "GRENOBLE");
        assert_eq!(label_text("Saint-Martin-d'Hères"), "SAINT-MARTIN-D'HÈRES");
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.palette_names, vec!["onedark"]);
        assert_eq!(config.preview_max, 1920);
        assert!(config.fetch_water);
    }
}
