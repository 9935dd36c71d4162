//! Shared geometry: point sequences and polygon queries.
//!
//! All coordinates are image pixels (y down) unless a caller says otherwise.

pub use kurbo::Point;

/// Distances below this count as lying on a polygon edge.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// A closed loop of points. Index arithmetic wraps modulo the length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
}

/// An open, directed run of points between two locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, wrapping in both directions.
    ///
    /// Panics on an empty contour.
    pub fn at(&self, index: isize) -> Point {
        let n = self.points.len() as isize;
        self.points[index.rem_euclid(n) as usize]
    }
}

impl Route {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// A degenerate route holding one location.
    pub fn single(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

/// Where a point lies relative to a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    OnBoundary,
    Outside,
}

/// Classify `point` against the closed polygon `polygon`.
///
/// Points on an edge are reported as [`Containment::OnBoundary`], so
/// `Inside` and `Outside` are strict.
pub fn containment(point: Point, polygon: &[Point]) -> Containment {
    if polygon.is_empty() {
        return Containment::Outside;
    }
    if boundary_distance(point, polygon) < BOUNDARY_EPSILON {
        return Containment::OnBoundary;
    }
    if point_in_polygon(point, polygon) {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

/// Shortest distance from `point` to any edge of the closed polygon.
///
/// A single-point polygon degenerates to the distance to that point.
pub fn boundary_distance(point: Point, polygon: &[Point]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| segment_distance(point, polygon[i], polygon[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

/// Floor `p` to a whole pixel inside a `width` x `height` raster.
pub fn snap_to_pixel(p: Point, width: u32, height: u32) -> Point {
    let max_x = width.saturating_sub(1) as f64;
    let max_y = height.saturating_sub(1) as f64;
    Point::new(p.x.floor().clamp(0.0, max_x), p.y.floor().clamp(0.0, max_y))
}

/// Arithmetic mean of all points. `None` for an empty slice.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Some(Point::new(sum_x / n, sum_y / n))
}

/// Distance from `p` to the segment `a`-`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Ray-casting point-in-polygon test.
fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
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

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn containment_is_strict() {
        let sq = square();
        assert_eq!(containment(Point::new(5.0, 5.0), &sq), Containment::Inside);
        assert_eq!(containment(Point::new(15.0, 5.0), &sq), Containment::Outside);
        assert_eq!(containment(Point::new(10.0, 5.0), &sq), Containment::OnBoundary);
        assert_eq!(containment(Point::new(0.0, 0.0), &sq), Containment::OnBoundary);
    }

    #[test]
    fn boundary_distance_measures_nearest_edge() {
        let sq = square();
        assert!((boundary_distance(Point::new(5.0, 4.0), &sq) - 4.0).abs() < 1e-12);
        assert!((boundary_distance(Point::new(13.0, 14.0), &sq) - 5.0).abs() < 1e-12);
        let dot = [Point::new(1.0, 1.0)];
        assert!((boundary_distance(Point::new(4.0, 5.0), &dot) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn contour_index_wraps() {
        let c = Contour::new(square());
        assert_eq!(c.at(4), Point::new(0.0, 0.0));
        assert_eq!(c.at(-1), Point::new(0.0, 10.0));
        assert_eq!(c.at(-3), Point::new(10.0, 0.0));
    }

    #[test]
    fn centroid_of_square_is_center() {
        assert_eq!(centroid(&square()), Some(Point::new(5.0, 5.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn snap_floors_and_clamps() {
        assert_eq!(snap_to_pixel(Point::new(3.9, 0.2), 10, 10), Point::new(3.0, 0.0));
        assert_eq!(snap_to_pixel(Point::new(-4.0, 12.5), 10, 10), Point::new(0.0, 9.0));
    }
}
