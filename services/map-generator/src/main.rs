//! Street map poster generator.
//!
//! Commands:
//! - `generate`: fetch places from OpenStreetMap and render one map per palette
//! - `label`: frame existing maps and print a name below them
//! - `swatch`: write a colour strip for every palette in a palette file

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use map_common::PaletteStore;
use map_generator::commands::{label_images, write_swatches};
use map_generator::pipeline::{DEFAULT_PALETTE, DEFAULT_RADIUS_M};
use map_generator::{BatchConfig, Pipeline, PipelineConfig, PlaceRequest};
use osm_client::config::{DEFAULT_NOMINATIM_URL, DEFAULT_OVERPASS_URL};
use osm_client::{ClientConfig, NominatimClient, OverpassClient};
use renderer::{ClassificationPolicy, FrameStyle, RenderOptions, TrueTypeFont, DEFAULT_PREVIEW_MAX};

#[derive(Parser, Debug)]
#[command(name = "map-generator")]
#[command(about = "Palette-coloured street map posters from OpenStreetMap data")]
struct Cli {
    /// Log level, used when RUST_LOG is not set
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render street maps for places, one per palette
    Generate(GenerateArgs),
    /// Add a border and a name label to existing images
    Label(LabelArgs),
    /// Write a swatch image for every palette in a palette file
    Swatch(SwatchArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Colour and width by highway type
    RoadClass,
    /// Colour by segment length
    SegmentLength,
}

impl From<PolicyArg> for ClassificationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::RoadClass => ClassificationPolicy::RoadClass,
            PolicyArg::SegmentLength => ClassificationPolicy::segment_length(),
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Place names to geocode
    #[arg(long, num_args = 1..)]
    place: Vec<String>,

    /// YAML file listing places and palettes
    #[arg(long)]
    batch: Option<PathBuf>,

    /// Search radius in meters
    #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
    radius: u32,

    /// Palettes to render (default: the batch file's, else onedark)
    #[arg(long = "palette-names", alias = "palette_names", num_args = 1..)]
    palette_names: Vec<String>,

    /// JSON file of base16 palettes
    #[arg(long, alias = "palette_file", env = "MAPGEN_PALETTE_FILE", default_value = "base16_schemes.json")]
    palette_file: PathBuf,

    /// Output directory
    #[arg(long, alias = "export_dir", env = "MAPGEN_EXPORT_DIR", default_value = "export")]
    export_dir: PathBuf,

    /// Street classification policy
    #[arg(long, value_enum, default_value = "road-class")]
    policy: PolicyArg,

    /// Also write a framed copy with the place name
    #[arg(long)]
    label: bool,

    /// TrueType font for labels
    #[arg(long, env = "MAPGEN_FONT", default_value = "fonts/Raleway.ttf")]
    font: PathBuf,

    /// Output resolution
    #[arg(long, default_value_t = 300.0)]
    dpi: f32,

    /// Side of the square map, in inches
    #[arg(long, alias = "figure_size", default_value_t = 20.0)]
    figure_size: f32,

    /// Longest side of preview images, in pixels
    #[arg(long, default_value_t = DEFAULT_PREVIEW_MAX, value_parser = clap::value_parser!(u32).range(1..))]
    preview_max: u32,

    /// Skip the river layer
    #[arg(long)]
    no_water: bool,

    /// Nominatim base URL
    #[arg(long, env = "NOMINATIM_URL", default_value = DEFAULT_NOMINATIM_URL)]
    nominatim_url: String,

    /// Overpass interpreter URL
    #[arg(long, env = "OVERPASS_URL", default_value = DEFAULT_OVERPASS_URL)]
    overpass_url: String,
}

#[derive(Args, Debug)]
struct LabelArgs {
    /// Images to label
    #[arg(long, num_args = 1.., required = true)]
    image: Vec<PathBuf>,

    /// Palette for border and text colours
    #[arg(long, default_value = DEFAULT_PALETTE)]
    palette: String,

    /// JSON file of base16 palettes
    #[arg(long, alias = "palette_file", env = "MAPGEN_PALETTE_FILE", default_value = "base16_schemes.json")]
    palette_file: PathBuf,

    /// Output directory
    #[arg(long, alias = "export_dir", env = "MAPGEN_EXPORT_DIR", default_value = "export")]
    export_dir: PathBuf,

    /// Label text (default: derived from each file name)
    #[arg(long)]
    text: Option<String>,

    /// TrueType font for labels
    #[arg(long, env = "MAPGEN_FONT", default_value = "fonts/Raleway.ttf")]
    font: PathBuf,

    /// Longest side of preview images, in pixels
    #[arg(long, default_value_t = DEFAULT_PREVIEW_MAX, value_parser = clap::value_parser!(u32).range(1..))]
    preview_max: u32,
}

#[derive(Args, Debug)]
struct SwatchArgs {
    /// JSON file of base16 palettes
    palette_file: PathBuf,

    /// Directory for the swatch images
    export_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Label(args) => label(args),
        Command::Swatch(args) => swatch(args),
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let batch = args.batch.as_deref().map(BatchConfig::load).transpose()?;

    let mut places: Vec<PlaceRequest> = batch
        .as_ref()
        .map(|b| b.place_requests(args.radius))
        .unwrap_or_default();
    places.extend(args.place.iter().map(|p| PlaceRequest::new(p.clone(), args.radius)));
    if places.is_empty() {
        bail!("no places given: pass --place or --batch");
    }

    let palette_names = if !args.palette_names.is_empty() {
        args.palette_names.clone()
    } else {
        match &batch {
            Some(b) if !b.palettes.is_empty() => b.palettes.clone(),
            _ => vec![DEFAULT_PALETTE.to_string()],
        }
    };

    let store = PaletteStore::from_file(&args.palette_file)
        .with_context(|| format!("Failed to load palettes from {}", args.palette_file.display()))?;

    let config = PipelineConfig {
        export_dir: args.export_dir.clone(),
        palette_names,
        policy: args.policy.into(),
        render: RenderOptions {
            width_in: args.figure_size,
            height_in: args.figure_size,
            dpi: args.dpi,
            ..RenderOptions::default()
        },
        fetch_water: !args.no_water,
        frame: FrameStyle::default(),
        preview_max: args.preview_max,
    };
    config.render.pixel_size()?;

    let client_config = ClientConfig {
        nominatim_url: args.nominatim_url.clone(),
        overpass_url: args.overpass_url.clone(),
        ..ClientConfig::default()
    };
    let geocoder = NominatimClient::new(&client_config)?;
    let source = OverpassClient::new(&client_config)?;

    let mut pipeline = Pipeline::new(geocoder, source, store, config)?;
    if args.label {
        let font = TrueTypeFont::from_file(&args.font)
            .with_context(|| format!("Failed to load font {}", args.font.display()))?;
        pipeline = pipeline.with_font(Box::new(font));
    }

    info!(
        places = places.len(),
        palettes = pipeline.config().palette_names.len(),
        policy = pipeline.config().policy.name(),
        "Starting map generation"
    );
    let report = pipeline.run_batch(&places).await;

    for output in &report.completed {
        for path in output.maps.iter().chain(&output.labelled) {
            info!(place = %output.place, path = %path.display(), "Written");
        }
    }
    if !report.is_success() {
        for err in &report.failed {
            warn!(stage = %err.stage, place = %err.place, "{}", err);
        }
        if report.aborted {
            bail!(
                "batch aborted after {} of {} places",
                report.completed.len() + report.failed.len(),
                places.len()
            );
        }
        bail!("{} of {} places failed", report.failed.len(), places.len());
    }
    Ok(())
}

fn label(args: LabelArgs) -> Result<()> {
    let store = PaletteStore::from_file(&args.palette_file)
        .with_context(|| format!("Failed to load palettes from {}", args.palette_file.display()))?;
    let palette = store.get(&args.palette)?;
    let font = TrueTypeFont::from_file(&args.font)
        .with_context(|| format!("Failed to load font {}", args.font.display()))?;

    let written = label_images(
        &args.image,
        args.text.as_deref(),
        palette,
        &font,
        &FrameStyle::default(),
        &args.export_dir,
        args.preview_max,
    )?;
    info!(count = written.len(), "Labelled images");
    Ok(())
}

fn swatch(args: SwatchArgs) -> Result<()> {
    let store = PaletteStore::from_file(&args.palette_file)
        .with_context(|| format!("Failed to load palettes from {}", args.palette_file.display()))?;
    let written = write_swatches(&store, &args.export_dir)?;
    info!(count = written.len(), dir = %args.export_dir.display(), "Wrote swatches");
    Ok(())
}
