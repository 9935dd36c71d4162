//! Route selection along a closed contour.
//!
//! A contour is a loop, so between any two of its vertices there are two
//! arcs. The snap always follows the one with fewer vertices.

use kurbo::Point;

use crate::geom::{Contour, Route};

/// Index and position of the contour vertex closest to `point`.
///
/// Ties go to the vertex seen first. `None` for an empty contour.
pub fn nearest_index(contour: &Contour, point: Point) -> Option<(usize, Point)> {
    let mut best: Option<(usize, Point, f64)> = None;
    for (i, &p) in contour.points.iter().enumerate() {
        let d = p.distance_squared(point);
        if best.map_or(true, |(_, _, bd)| d < bd) {
            best = Some((i, p, d));
        }
    }
    best.map(|(i, p, _)| (i, p))
}

/// The shorter arc of `contour` from vertex `from` to vertex `to`,
/// directed `from -> to`.
///
/// Arc length is counted in vertices. The direct arc (the one that does
/// not cross index 0) wins ties.
pub fn arc_between(contour: &Contour, from: usize, to: usize) -> Route {
    let n = contour.len();
    if n == 0 {
        return Route::default();
    }
    let direct = from.abs_diff(to);
    let wrapped = n - direct;
    let towards: isize = if from <= to { 1 } else { -1 };
    let (steps, step) = if direct <= wrapped {
        (direct, towards)
    } else {
        (wrapped, -towards)
    };
    let points = (0..=steps as isize)
        .map(|k| contour.at(from as isize + step * k))
        .collect();
    Route::new(points)
}

/// Snap both points onto `contour` and return the shorter arc between
/// them, directed `from -> to`.
pub fn shortest_route(contour: &Contour, from: Point, to: Point) -> Route {
    match (nearest_index(contour, from), nearest_index(contour, to)) {
        (Some((i1, _)), Some((i2, _))) => {
            log::trace!("snap arc {} -> {} of {}", i1, i2, contour.len());
            arc_between(contour, i1, i2)
        }
        _ => straight_line(from, to),
    }
}

/// Rasterized line from `from` to `to`, both ends included.
///
/// Endpoints are rounded to whole pixels first.
pub fn straight_line(from: Point, to: Point) -> Route {
    let (mut x, mut y) = (from.x.round() as i64, from.y.round() as i64);
    let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        points.push(Point::new(x as f64, y as f64));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    Route::new(points)
}

/// Prefix `arc` with a line from `anchor` when the arc starts elsewhere,
/// so the result always begins at `anchor`.
pub fn join_from(anchor: Point, arc: Route) -> Route {
    let start = match arc.first() {
        Some(p) => p,
        None => return Route::single(anchor),
    };
    if start == anchor {
        return arc;
    }
    let mut points = straight_line(anchor, start).points;
    points.pop();
    points.extend(arc.points);
    Route::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `n` vertices on a line, vertex i at x = i.
    fn ring(n: usize) -> Contour {
        Contour::new((0..n).map(|i| Point::new(i as f64, 0.0)).collect())
    }

    fn indices(route: &Route) -> Vec<usize> {
        route.points.iter().map(|p| p.x as usize).collect()
    }

    #[test]
    fn nearest_index_takes_first_on_tie() {
        let c = Contour::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ]);
        assert_eq!(nearest_index(&c, Point::new(2.0, 0.1)), Some((1, Point::new(2.0, 0.0))));
        assert_eq!(nearest_index(&c, Point::new(1.0, 0.0)), Some((0, Point::new(0.0, 0.0))));
        assert_eq!(nearest_index(&Contour::default(), Point::ZERO), None);
    }

    #[test]
    fn equal_arcs_prefer_direct() {
        let c = ring(8);
        assert_eq!(indices(&arc_between(&c, 0, 4)), vec![0, 1, 2, 3, 4]);
        assert_eq!(indices(&arc_between(&c, 4, 0)), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn wrapped_arc_when_shorter() {
        let c = ring(10);
        assert_eq!(indices(&arc_between(&c, 1, 8)), vec![1, 0, 9, 8]);
        assert_eq!(indices(&arc_between(&c, 8, 1)), vec![8, 9, 0, 1]);
        assert_eq!(indices(&arc_between(&c, 2, 5)), vec![2, 3, 4, 5]);
    }

    #[test]
    fn arc_length_is_minimal_for_all_pairs() {
        let n = 9;
        let c = ring(n);
        for i1 in 0..n {
            for i2 in 0..n {
                let route = arc_between(&c, i1, i2);
                let d = i1.abs_diff(i2);
                assert_eq!(route.len(), d.min(n - d) + 1);
                assert_eq!(route.first(), Some(c.points[i1]));
                assert_eq!(route.last(), Some(c.points[i2]));
            }
        }
    }

    #[test]
    fn same_point_gives_single_vertex() {
        let c = ring(5);
        let route = shortest_route(&c, Point::new(3.0, 0.2), Point::new(3.1, -0.2));
        assert_eq!(route.points, vec![Point::new(3.0, 0.0)]);
    }

    #[test]
    fn straight_line_is_directed_and_inclusive() {
        let route = straight_line(Point::new(5.0, 2.0), Point::new(0.0, 0.0));
        assert_eq!(route.len(), 6);
        assert_eq!(route.first(), Some(Point::new(5.0, 2.0)));
        assert_eq!(route.last(), Some(Point::new(0.0, 0.0)));
        for pair in route.points.windows(2) {
            assert!((pair[0].x - pair[1].x).abs() <= 1.0);
            assert!((pair[0].y - pair[1].y).abs() <= 1.0);
        }
    }

    #[test]
    fn straight_line_degenerates_to_point() {
        let p = Point::new(7.0, 7.0);
        assert_eq!(straight_line(p, p).points, vec![p]);
    }

    #[test]
    fn join_from_prepends_connector() {
        let arc = Route::new(vec![Point::new(3.0, 0.0), Point::new(4.0, 0.0)]);
        let joined = join_from(Point::new(0.0, 0.0), arc.clone());
        assert_eq!(
            joined.points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(3.0, 0.0),
                Point::new(4.0, 0.0),
            ]
        );
        assert_eq!(join_from(Point::new(3.0, 0.0), arc.clone()), arc);
    }
}
