use serde::{Deserialize, Serialize};

use super::{Point2, TOLERANCE};

/// Winding direction of a closed ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    /// Counter-clockwise (positive signed area).
    CounterClockwise,
    /// Clockwise (negative signed area).
    Clockwise,
}

impl Winding {
    /// Returns the opposite winding.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::CounterClockwise => Self::Clockwise,
            Self::Clockwise => Self::CounterClockwise,
        }
    }
}

/// Computes the signed area of a closed ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the winding of a ring, or `None` if it encloses no area.
#[must_use]
pub fn winding(points: &[Point2]) -> Option<Winding> {
    let area = signed_area_2d(points);
    if area > TOLERANCE {
        Some(Winding::CounterClockwise)
    } else if area < -TOLERANCE {
        Some(Winding::Clockwise)
    } else {
        None
    }
}

/// Returns the ring with the requested winding, reversing it if needed.
#[must_use]
pub fn with_winding(points: Vec<Point2>, target: Winding) -> Vec<Point2> {
    match winding(&points) {
        Some(w) if w != target => points.into_iter().rev().collect(),
        _ => points,
    }
}

/// Even-odd point-in-polygon test. Points exactly on an edge may fall
/// either way.
#[must_use]
pub fn contains_point(ring: &[Point2], p: &Point2) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Removes consecutive duplicate points and an explicit closing point.
///
/// Outline parsers emit closed subpaths with the first point repeated at
/// the end; the extrusion routine expects implicit closure.
#[must_use]
pub fn clean_ring(points: &[Point2]) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for &p in points {
        if let Some(last) = out.last() {
            if (p - last).norm() < TOLERANCE {
                continue;
            }
        }
        out.push(p);
    }
    while out.len() > 1 {
        let first = out[0];
        let last = out[out.len() - 1];
        if (first - last).norm() < TOLERANCE {
            out.pop();
        } else {
            break;
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&square());
        assert!((area - 1.0).abs() < TOLERANCE);
        assert_eq!(winding(&square()), Some(Winding::CounterClockwise));
    }

    #[test]
    fn signed_area_cw_square() {
        let pts: Vec<_> = square().into_iter().rev().collect();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
        assert_eq!(winding(&pts), Some(Winding::Clockwise));
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d(&[Point2::new(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area_2d(&[]).abs() < TOLERANCE);
        let collinear = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert_eq!(winding(&collinear), None);
    }

    #[test]
    fn with_winding_reverses_only_when_needed() {
        let ccw = with_winding(square(), Winding::CounterClockwise);
        assert_eq!(ccw, square());
        let cw = with_winding(square(), Winding::Clockwise);
        assert_eq!(winding(&cw), Some(Winding::Clockwise));
    }

    #[test]
    fn contains_point_inside_and_outside() {
        let sq = square();
        assert!(contains_point(&sq, &Point2::new(0.5, 0.5)));
        assert!(!contains_point(&sq, &Point2::new(1.5, 0.5)));
        assert!(!contains_point(&sq, &Point2::new(-0.1, 0.9)));
    }

    #[test]
    fn clean_ring_drops_closing_and_duplicate_points() {
        let mut pts = square();
        pts.insert(1, Point2::new(0.0, 0.0));
        pts.push(Point2::new(0.0, 0.0));
        let cleaned = clean_ring(&pts);
        assert_eq!(cleaned, square());
    }
}
