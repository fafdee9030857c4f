use crate::geom::point::{Point2, Rect};
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A simple closed polygon. The boundary is implicitly closed: the last
/// vertex connects back to the first.
///
/// Polygons are the crate's only collision primitive. Obstacles and robot
/// bodies are both unions of polygons, and a collision is an intersection
/// between two of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon<F> {
    vertices: Vec<Point2<F>>,
}

impl<F: Float> Polygon<F> {
    /// Creates a polygon from its vertices in boundary order.
    pub fn new(vertices: Vec<Point2<F>>) -> Self {
        assert!(vertices.len() >= 3, "a polygon requires at least three vertices");
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point2<F>] {
        &self.vertices
    }

    /// Iterates over the boundary segments, including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = (Point2<F>, Point2<F>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// The axis-aligned bounding box of the polygon.
    pub fn bounds(&self) -> Rect<F> {
        let mut min = self.vertices[0];
        let mut max = self.vertices[0];
        for v in &self.vertices[1..] {
            min = Point2::new(min.x.min(v.x), min.y.min(v.y));
            max = Point2::new(max.x.max(v.x), max.y.max(v.y));
        }
        Rect::new(min, max)
    }

    /// Even-odd test for a point against the polygon interior.
    pub fn contains(&self, point: &Point2<F>) -> bool {
        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];
            if (vi.y > point.y) != (vj.y > point.y)
                && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Checks whether a segment crosses or touches the polygon boundary, or
    /// lies inside it.
    pub fn intersects_segment(&self, start: &Point2<F>, end: &Point2<F>) -> bool {
        if self.contains(start) || self.contains(end) {
            return true;
        }
        self.edges().any(|(a, b)| segments_intersect(*start, *end, a, b))
    }

    /// Checks whether two polygon regions overlap. Covers boundary crossings
    /// and one polygon fully containing the other.
    pub fn intersects_polygon(&self, other: &Polygon<F>) -> bool {
        for (a1, a2) in self.edges() {
            for (b1, b2) in other.edges() {
                if segments_intersect(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        self.contains(&other.vertices[0]) || other.contains(&self.vertices[0])
    }
}

/// Tests whether segments [p1, p2] and [q1, q2] intersect, endpoints
/// included. Uses orientation signs with collinear overlap handling.
pub fn segments_intersect<F: Float>(p1: Point2<F>, p2: Point2<F>, q1: Point2<F>, q2: Point2<F>) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > F::zero() && d2 < F::zero()) || (d1 < F::zero() && d2 > F::zero()))
        && ((d3 > F::zero() && d4 < F::zero()) || (d3 < F::zero() && d4 > F::zero()))
    {
        return true;
    }

    (d1 == F::zero() && on_segment(q1, q2, p1))
        || (d2 == F::zero() && on_segment(q1, q2, p2))
        || (d3 == F::zero() && on_segment(p1, p2, q1))
        || (d4 == F::zero() && on_segment(p1, p2, q2))
}

/// Cross product sign of (b - a) x (c - a): positive for counter-clockwise.
fn orientation<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>) -> F {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether c, known collinear with [a, b], lies within the segment.
fn on_segment<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon<f64> {
        Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    #[should_panic]
    fn rejects_degenerate_polygon() {
        let _ = Polygon::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
    }

    #[test]
    fn contains_interior_points() {
        let square = unit_square();
        assert!(square.contains(&Point2::new(0.5, 0.5)));
        assert!(!square.contains(&Point2::new(1.5, 0.5)));
        assert!(!square.contains(&Point2::new(-0.1, 0.5)));
    }

    #[test]
    fn contains_concave_polygon() {
        // An L-shape with the notch at the upper right.
        let l_shape = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ]);
        assert!(l_shape.contains(&Point2::new(0.5, 1.5)));
        assert!(l_shape.contains(&Point2::new(1.5, 0.5)));
        assert!(!l_shape.contains(&Point2::new(1.5, 1.5)));
    }

    #[test]
    fn segment_intersection_cases() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 2.0);
        assert!(segments_intersect(a, b, Point2::new(0.0, 2.0), Point2::new(2.0, 0.0)));
        assert!(!segments_intersect(a, b, Point2::new(3.0, 0.0), Point2::new(4.0, 1.0)));
        // Shared endpoint counts as an intersection.
        assert!(segments_intersect(a, b, b, Point2::new(3.0, 0.0)));
        // Collinear overlap.
        assert!(segments_intersect(a, b, Point2::new(1.0, 1.0), Point2::new(3.0, 3.0)));
        // Collinear but disjoint.
        assert!(!segments_intersect(a, Point2::new(1.0, 1.0), Point2::new(1.5, 1.5), b));
    }

    #[test]
    fn segment_against_polygon() {
        let square = unit_square();
        assert!(square.intersects_segment(&Point2::new(-1.0, 0.5), &Point2::new(2.0, 0.5)));
        assert!(square.intersects_segment(&Point2::new(0.5, 0.5), &Point2::new(0.6, 0.6)));
        assert!(!square.intersects_segment(&Point2::new(-1.0, 2.0), &Point2::new(2.0, 2.0)));
    }

    #[test]
    fn polygon_overlap() {
        let square = unit_square();
        let shifted = Polygon::new(vec![
            Point2::new(0.5, 0.5),
            Point2::new(1.5, 0.5),
            Point2::new(1.5, 1.5),
            Point2::new(0.5, 1.5),
        ]);
        let inner = Polygon::new(vec![
            Point2::new(0.4, 0.4),
            Point2::new(0.6, 0.4),
            Point2::new(0.5, 0.6),
        ]);
        let far = Polygon::new(vec![
            Point2::new(5.0, 5.0),
            Point2::new(6.0, 5.0),
            Point2::new(5.5, 6.0),
        ]);
        assert!(square.intersects_polygon(&shifted));
        assert!(square.intersects_polygon(&inner));
        assert!(inner.intersects_polygon(&square));
        assert!(!square.intersects_polygon(&far));
    }

    #[test]
    fn polygon_bounds() {
        let triangle = Polygon::new(vec![
            Point2::new(-1.0, 0.0),
            Point2::new(2.0, -3.0),
            Point2::new(0.5, 4.0),
        ]);
        let bounds = triangle.bounds();
        assert_eq!(bounds.min(), Point2::new(-1.0, -3.0));
        assert_eq!(bounds.max(), Point2::new(2.0, 4.0));
    }
}
