//! Tolerance offset: grow or shrink a traced loop vertex by vertex.
//!
//! Each vertex moves along the normal of a tangent estimated over a
//! six-sample window, which smooths out single-pixel staircase noise from
//! the edge tracer. Which side of the normal is "out" is decided by testing
//! both candidates against the original loop.

use kurbo::{Point, Vec2};
use rayon::prelude::*;

use crate::geom::{containment, Containment, Contour};

/// Neighbours on each side used for the tangent estimate.
const TANGENT_REACH: isize = 3;

/// Stand-in for a zero horizontal delta when computing the tangent slope.
const MIN_RUN: f64 = 1e-8;

/// Move every vertex of `contour` by `distance` along its normal.
///
/// Positive `distance` enlarges the loop, negative shrinks it. A vertex
/// whose two candidates are both (or neither) on the requested side keeps
/// its original position.
pub fn offset(contour: &Contour, distance: f64) -> Contour {
    if distance == 0.0 || contour.is_empty() {
        return contour.clone();
    }
    let want = if distance < 0.0 {
        Containment::Inside
    } else {
        Containment::Outside
    };
    let magnitude = distance.abs();

    let points: Vec<Point> = (0..contour.len())
        .into_par_iter()
        .map(|i| {
            let vertex = contour.points[i];
            let normal = normal_at(contour, i) * magnitude;
            let a = vertex + normal;
            let b = vertex - normal;
            let a_ok = containment(a, &contour.points) == want;
            let b_ok = containment(b, &contour.points) == want;
            match (a_ok, b_ok) {
                (true, false) => a,
                (false, true) => b,
                _ => vertex,
            }
        })
        .collect();

    let moved = points
        .iter()
        .zip(&contour.points)
        .filter(|(p, q)| p != q)
        .count();
    log::debug!(
        "offset {:+.3} px: {} of {} vertices moved",
        distance,
        moved,
        contour.len()
    );
    Contour::new(points)
}

/// Unit normal at vertex `i`, from the chord between its neighbours three
/// steps back and three steps ahead.
fn normal_at(contour: &Contour, i: usize) -> Vec2 {
    let prev = contour.at(i as isize - TANGENT_REACH);
    let next = contour.at(i as isize + TANGENT_REACH);
    let dy = next.y - prev.y;
    let mut dx = next.x - prev.x;
    if dx == 0.0 {
        dx = MIN_RUN;
    }
    let angle = (dy / dx).atan();
    Vec2::new(-angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed square outline sampled every pixel, clockwise in image space.
    fn square(size: i32) -> Contour {
        let mut points = Vec::new();
        for x in 0..size {
            points.push(Point::new(x as f64, 0.0));
        }
        for y in 0..size {
            points.push(Point::new(size as f64, y as f64));
        }
        for x in (1..=size).rev() {
            points.push(Point::new(x as f64, size as f64));
        }
        for y in (1..=size).rev() {
            points.push(Point::new(0.0, y as f64));
        }
        Contour::new(points)
    }

    fn circle(radius: f64, n: usize) -> Contour {
        let points = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                Point::new(50.0 + radius * t.cos(), 50.0 + radius * t.sin())
            })
            .collect();
        Contour::new(points)
    }

    #[test]
    fn zero_distance_is_identity() {
        let c = circle(20.0, 64);
        assert_eq!(offset(&c, 0.0), c);
    }

    #[test]
    fn outward_offset_leaves_polygon() {
        let c = circle(20.0, 120);
        let grown = offset(&c, 2.0);
        for p in &grown.points {
            assert_eq!(containment(*p, &c.points), Containment::Outside, "{p:?}");
        }
    }

    #[test]
    fn inward_offset_stays_inside() {
        let c = circle(20.0, 120);
        let shrunk = offset(&c, -2.0);
        for p in &shrunk.points {
            assert_eq!(containment(*p, &c.points), Containment::Inside, "{p:?}");
        }
    }

    #[test]
    fn offset_distance_matches_on_straight_edges() {
        let c = square(20);
        let grown = offset(&c, 1.5);
        // Mid-edge samples have a clean tangent.
        assert_eq!(grown.points[10], Point::new(10.0, -1.5));
        let right = grown.points[30];
        assert!((right.x - 21.5).abs() < 1e-6 && (right.y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn vertical_tangent_uses_horizontal_normal() {
        let c = square(20);
        let shrunk = offset(&c, -1.0);
        let left = shrunk.points[70];
        assert!((left.x - 1.0).abs() < 1e-6, "{left:?}");
        assert!((left.y - c.points[70].y).abs() < 1e-6);
    }

    #[test]
    fn unresolvable_vertex_is_kept() {
        // A single point has no inside, so an inward move never resolves.
        let c = Contour::new(vec![Point::new(3.0, 4.0)]);
        assert_eq!(offset(&c, -1.0), c);
    }
}
