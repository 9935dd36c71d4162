//! Tracing mode: snap the lasso preview onto nearby edges.

use image::RgbaImage;
use kurbo::{Point, Rect};

use crate::edges::EdgeService;
use crate::geom::{boundary_distance, snap_to_pixel, Contour, Route};
use crate::lasso::LassoPath;
use crate::render::{Canvas, COMMITTED_COLOR, PREVIEW_COLOR};
use crate::route::{join_from, shortest_route, straight_line};
use crate::viewport::Viewport;

/// Lasso state plus the edge search used to build previews.
pub struct Tracer {
    lasso: LassoPath,
    cursor: Option<Point>,
    edges: Box<dyn EdgeService>,
}

impl Tracer {
    pub fn new(edges: Box<dyn EdgeService>) -> Self {
        Self {
            lasso: LassoPath::new(),
            cursor: None,
            edges,
        }
    }

    pub fn lasso(&self) -> &LassoPath {
        &self.lasso
    }

    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// Cursor moved to `at` (image space): recompute the preview.
    pub fn pointer_moved(&mut self, at: Point, raster: &RgbaImage, viewport: &Viewport) {
        let cursor = snap_to_pixel(at, raster.width(), raster.height());
        self.cursor = Some(cursor);
        if let Some(anchor) = self.lasso.last_anchor() {
            let route = preview_route(self.edges.as_ref(), raster, viewport, anchor, cursor);
            self.lasso.set_preview(route);
        }
    }

    /// Click at `at`: commit the segment ending there.
    pub fn commit(&mut self, at: Point, raster: &RgbaImage, viewport: &Viewport) {
        self.pointer_moved(at, raster, viewport);
        let cursor = snap_to_pixel(at, raster.width(), raster.height());
        let anchor = self.lasso.commit(cursor);
        log::debug!(
            "anchor {} at ({}, {})",
            self.lasso.anchors().len(),
            anchor.x,
            anchor.y
        );
    }

    pub fn undo(&mut self) {
        if let Some(p) = self.lasso.undo() {
            log::debug!("removed anchor at ({}, {})", p.x, p.y);
        }
    }

    /// Drop the pending preview so a confirm-time render shows only
    /// committed routes.
    pub fn confirm(&mut self) {
        self.lasso.clear_preview();
    }

    /// Committed routes in blue (one continuous line), preview in green.
    pub fn render_overlay(&self, canvas: &mut Canvas, width: f32) {
        let committed: Vec<Point> = self
            .lasso
            .routes()
            .iter()
            .flat_map(|r| r.points.iter().copied())
            .collect();
        canvas.polyline(&committed, COMMITTED_COLOR, width);
        if let Some(preview) = self.lasso.preview() {
            canvas.polyline(&preview.points, PREVIEW_COLOR, width);
        }
    }
}

/// Route from `anchor` to `cursor`, following the nearest edge when one is
/// found in the box spanned by the two points.
///
/// The search only runs when that box is more than one window pixel wide
/// and tall; otherwise, or when no edge is found, the route is a straight
/// line.
pub fn preview_route(
    edges: &dyn EdgeService,
    raster: &RgbaImage,
    viewport: &Viewport,
    anchor: Point,
    cursor: Point,
) -> Route {
    let region = Rect::from_points(anchor, cursor);
    let scale = viewport.display_scale();
    if region.width() / scale > 1.0 && region.height() / scale > 1.0 {
        let loops = edges.find_edges(raster, region, scale);
        if let Some(best) = closest_loop(&loops, cursor) {
            let arc = shortest_route(best, anchor, cursor);
            return join_from(anchor, arc);
        }
    }
    straight_line(anchor, cursor)
}

/// The loop whose boundary passes closest to `point`. First wins ties.
fn closest_loop(loops: &[Contour], point: Point) -> Option<&Contour> {
    let mut best: Option<(&Contour, f64)> = None;
    for c in loops {
        let d = boundary_distance(point, &c.points);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((c, d));
        }
    }
    best.map(|(c, _)| c)
}
