//! The operator's lasso: committed anchors and the routes joining them.

use kurbo::Point;

use crate::geom::{Contour, Route};
use crate::route::straight_line;

/// Whether any anchor has been placed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LassoState {
    Idle,
    Tracing,
}

/// Ordered anchors plus one route per anchor.
///
/// `routes[0]` is the single-point route of the first anchor; every later
/// `routes[i]` runs from `anchors[i - 1]` to `anchors[i]`. The preview is
/// the uncommitted segment from the last anchor to the cursor.
#[derive(Debug, Clone, Default)]
pub struct LassoPath {
    anchors: Vec<Point>,
    routes: Vec<Route>,
    preview: Option<Route>,
}

impl LassoPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LassoState {
        if self.anchors.is_empty() {
            LassoState::Idle
        } else {
            LassoState::Tracing
        }
    }

    pub fn anchors(&self) -> &[Point] {
        &self.anchors
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn preview(&self) -> Option<&Route> {
        self.preview.as_ref()
    }

    pub fn last_anchor(&self) -> Option<Point> {
        self.anchors.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Replace the preview segment. Ignored while idle, and routes that do
    /// not start at the last anchor are rejected.
    pub fn set_preview(&mut self, route: Route) -> bool {
        match self.last_anchor() {
            Some(anchor) if route.first() == Some(anchor) => {
                self.preview = Some(route);
                true
            }
            _ => false,
        }
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    /// Commit a click at `cursor`.
    ///
    /// The first click places a bare anchor. Later clicks commit the
    /// preview, or a straight line to `cursor` if no preview is pending.
    /// Returns the new last anchor.
    pub fn commit(&mut self, cursor: Point) -> Point {
        let route = match (self.last_anchor(), self.preview.take()) {
            (None, _) => Route::single(cursor),
            (Some(_), Some(preview)) => preview,
            (Some(anchor), None) => straight_line(anchor, cursor),
        };
        let anchor = route.last().unwrap_or(cursor);
        self.anchors.push(anchor);
        self.routes.push(route);
        anchor
    }

    /// Drop the last anchor and the route leading to it.
    pub fn undo(&mut self) -> Option<Point> {
        self.preview = None;
        self.routes.pop();
        self.anchors.pop()
    }

    /// All committed routes joined into one closed loop.
    ///
    /// Does not change the lasso. `None` while idle.
    pub fn finalize(&self) -> Option<Contour> {
        if self.routes.is_empty() {
            return None;
        }
        let points = self
            .routes
            .iter()
            .flat_map(|r| r.points.iter().copied())
            .collect();
        Some(Contour::new(points))
    }
}
