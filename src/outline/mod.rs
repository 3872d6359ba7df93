//! Region outlines and their decomposition into flat shapes.

use crate::data::RegionId;
use crate::math::polygon_2d::{clean_ring, contains_point, signed_area_2d, winding, with_winding, Winding};
use crate::math::Point2;

/// A named 2D boundary for one region: closed, already-flattened subpaths
/// as produced by a vector-graphics parser.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlinePath {
    pub region_id: RegionId,
    pub subpaths: Vec<Vec<Point2>>,
}

impl OutlinePath {
    #[must_use]
    pub fn new(region_id: RegionId, subpaths: Vec<Vec<Point2>>) -> Self {
        Self { region_id, subpaths }
    }
}

/// A flat polygon with optional holes.
///
/// The outer ring is counter-clockwise and holes are clockwise, with
/// implicit closure (no repeated end point).
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Shape {
    /// Builds a shape from raw rings, normalizing winding and closure.
    #[must_use]
    pub fn new(outer: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Self {
        Self {
            outer: with_winding(clean_ring(&outer), Winding::CounterClockwise),
            holes: holes
                .into_iter()
                .map(|h| with_winding(clean_ring(&h), Winding::Clockwise))
                .collect(),
        }
    }

    /// All rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &[Point2]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// Total number of contour points across all rings.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.rings().map(<[Point2]>::len).sum()
    }

    /// Enclosed area (outer minus holes).
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rings().map(signed_area_2d).sum()
    }
}

/// Splits an [`OutlinePath`] into disjoint shapes.
///
/// Subpaths whose winding matches `solid_winding` are solids; the others
/// are holes, each assigned to the smallest solid that contains it. A hole
/// with no enclosing solid is promoted to a solid. A path with a single
/// subpath is always a solid.
pub struct ToShapes<'a> {
    path: &'a OutlinePath,
    solid_winding: Winding,
}

impl<'a> ToShapes<'a> {
    /// Creates a new `ToShapes` operation.
    #[must_use]
    pub fn new(path: &'a OutlinePath, solid_winding: Winding) -> Self {
        Self { path, solid_winding }
    }

    /// Executes the decomposition. Degenerate subpaths (fewer than three
    /// distinct points or zero area) are dropped.
    #[must_use]
    pub fn execute(&self) -> Vec<Shape> {
        let rings: Vec<(Vec<Point2>, Winding)> = self
            .path
            .subpaths
            .iter()
            .map(|sp| clean_ring(sp))
            .filter(|r| r.len() >= 3)
            .filter_map(|r| winding(&r).map(|w| (r, w)))
            .collect();

        if let [(ring, _)] = rings.as_slice() {
            return vec![Shape::new(ring.clone(), Vec::new())];
        }

        let (solids, holes): (Vec<_>, Vec<_>) =
            rings.into_iter().partition(|(_, w)| *w == self.solid_winding);

        let mut outers: Vec<Vec<Point2>> = solids.into_iter().map(|(r, _)| r).collect();
        let mut assigned: Vec<Vec<Vec<Point2>>> = vec![Vec::new(); outers.len()];
        let mut orphans = Vec::new();

        for (hole, _) in holes {
            let sample = hole[0];
            let container = outers
                .iter()
                .enumerate()
                .filter(|(_, o)| contains_point(o, &sample))
                .min_by(|(_, a), (_, b)| {
                    signed_area_2d(a).abs().total_cmp(&signed_area_2d(b).abs())
                })
                .map(|(i, _)| i);
            match container {
                Some(i) => assigned[i].push(hole),
                None => orphans.push(hole),
            }
        }

        if !orphans.is_empty() {
            tracing::debug!(
                region = %self.path.region_id,
                count = orphans.len(),
                "promoting unenclosed holes to solids"
            );
        }
        for orphan in orphans {
            outers.push(orphan);
            assigned.push(Vec::new());
        }

        outers
            .into_iter()
            .zip(assigned)
            .map(|(outer, holes)| Shape::new(outer, holes))
            .collect()
    }
}
