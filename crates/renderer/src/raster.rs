//! Rasterization of classified street graphs and water polygons.
//!
//! Coordinates are projected to Web Mercator and fitted into the canvas
//! with the street layer's aspect ratio preserved. Streets are stroked with
//! their classified colour; water is filled on top, clipped to the street
//! layer's bounding box.

use image::RgbaImage;
use rayon::prelude::*;
use tiny_skia::{
    Color as SkColor, FillRule, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke,
    Transform,
};
use tracing::{debug, info};

use map_common::{BoundingBox, Color, GeoPoint, MapError, MapResult, Palette, Slot, StreetGraph, WaterPolygon};

/// Points per inch, for converting stroke widths to pixels.
const POINTS_PER_INCH: f32 = 72.0;

/// Canvas size and layer colours.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width_in: f32,
    pub height_in: f32,
    pub dpi: f32,
    pub background_slot: Slot,
    pub water_slot: Slot,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width_in: 20.0,
            height_in: 20.0,
            dpi: 300.0,
            background_slot: Slot::Base00,
            water_slot: Slot::Base01,
        }
    }
}

impl RenderOptions {
    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> MapResult<(u32, u32)> {
        let width = (self.width_in * self.dpi).round();
        let height = (self.height_in * self.dpi).round();
        if !(width >= 1.0 && height >= 1.0) || width > u32::MAX as f32 || height > u32::MAX as f32 {
            return Err(MapError::InvalidArgument {
                param: "canvas".to_string(),
                message: format!(
                    "{}x{} in at {} dpi is not a drawable size",
                    self.width_in, self.height_in, self.dpi
                ),
            });
        }
        Ok((width as u32, height as u32))
    }

    /// Stroke width in pixels for a width in points.
    pub fn stroke_px(&self, points: f32) -> f32 {
        points * self.dpi / POINTS_PER_INCH
    }
}

/// Maps geographic points onto the canvas.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    bounds: BoundingBox,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projector {
    /// Fit Web Mercator `bounds` into a `width` x `height` canvas, centered.
    pub fn fit(bounds: BoundingBox, width: u32, height: u32) -> Self {
        let span_x = bounds.width().max(1.0);
        let span_y = bounds.height().max(1.0);
        let scale = (width as f64 / span_x).min(height as f64 / span_y);
        Self {
            bounds,
            scale,
            offset_x: (width as f64 - bounds.width() * scale) / 2.0,
            offset_y: (height as f64 - bounds.height() * scale) / 2.0,
        }
    }

    /// Pixel position of a point; y grows downwards.
    pub fn project(&self, point: &GeoPoint) -> (f32, f32) {
        let (x, y) = point.to_web_mercator();
        (
            ((x - self.bounds.min_x) * self.scale + self.offset_x) as f32,
            ((self.bounds.max_y - y) * self.scale + self.offset_y) as f32,
        )
    }

    /// Pixel rectangle covered by the fitted bounds.
    pub fn bounds_rect(&self) -> Option<Rect> {
        Rect::from_ltrb(
            self.offset_x as f32,
            self.offset_y as f32,
            (self.offset_x + self.bounds.width() * self.scale) as f32,
            (self.offset_y + self.bounds.height() * self.scale) as f32,
        )
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn add_ring(pb: &mut PathBuilder, projector: &Projector, ring: &[GeoPoint]) {
    let mut points = ring.iter().map(|p| projector.project(p));
    if let Some((x, y)) = points.next() {
        pb.move_to(x, y);
        for (x, y) in points {
            pb.line_to(x, y);
        }
        pb.close();
    }
}

/// Draw a classified street graph and optional water layer.
///
/// Every edge must carry a style; unclassified graphs are rejected.
pub fn render_map(
    graph: &StreetGraph,
    water: &[WaterPolygon],
    palette: &Palette,
    options: &RenderOptions,
) -> MapResult<RgbaImage> {
    let (width, height) = options.pixel_size()?;
    let bounds = graph
        .mercator_bounds()
        .ok_or_else(|| MapError::Render("street graph has no geometry".to_string()))?;
    if !graph.is_classified() {
        return Err(MapError::Render("street graph has unclassified edges".to_string()));
    }

    info!(width, height, edges = graph.len(), water = water.len(), "Generating image");

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| MapError::Render(format!("cannot allocate {}x{} canvas", width, height)))?;
    let background = palette.get(options.background_slot);
    pixmap.fill(SkColor::from_rgba8(background.r, background.g, background.b, background.a));

    let projector = Projector::fit(bounds, width, height);

    let mut drawn = 0usize;
    for edge in &graph.edges {
        let Some(style) = edge.style else { continue };
        if edge.geometry.len() < 2 {
            continue;
        }

        let mut pb = PathBuilder::new();
        let mut points = edge.geometry.iter().map(|p| projector.project(p));
        if let Some((x, y)) = points.next() {
            pb.move_to(x, y);
        }
        for (x, y) in points {
            pb.line_to(x, y);
        }

        let stroke = Stroke {
            width: options.stroke_px(style.width),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint_for(style.color), &stroke, Transform::identity(), None);
            drawn += 1;
        }
    }
    debug!(drawn, "Street layer drawn");

    if !water.is_empty() {
        draw_water(&mut pixmap, water, &projector, palette.get(options.water_slot))?;
    }

    pixmap_to_image(&pixmap)
}

fn draw_water(
    pixmap: &mut Pixmap,
    water: &[WaterPolygon],
    projector: &Projector,
    color: Color,
) -> MapResult<()> {
    let mut clip = Mask::new(pixmap.width(), pixmap.height())
        .ok_or_else(|| MapError::Render("cannot allocate clip mask".to_string()))?;
    if let Some(rect) = projector.bounds_rect() {
        clip.fill_path(&PathBuilder::from_rect(rect), FillRule::Winding, false, Transform::identity());
    }

    let paint = paint_for(color);
    for polygon in water {
        let mut pb = PathBuilder::new();
        add_ring(&mut pb, projector, &polygon.exterior);
        for hole in &polygon.holes {
            add_ring(&mut pb, projector, hole);
        }
        if let Some(path) = pb.finish() {
            pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), Some(&clip));
        }
    }
    debug!(polygons = water.len(), "Water layer drawn");
    Ok(())
}

/// Convert a premultiplied pixmap into a straight-alpha RGBA image.
pub fn pixmap_to_image(pixmap: &Pixmap) -> MapResult<RgbaImage> {
    let data: Vec<u8> = pixmap
        .pixels()
        .par_iter()
        .flat_map_iter(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| MapError::Render("pixel buffer size mismatch".to_string()))
}
