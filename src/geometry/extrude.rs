use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3};
use crate::outline::Shape;

use super::triangulate::{triangulate_shape, CapTriangulation};
use super::Geometry;

/// Extrusion parameters. Bevels are not supported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeSettings {
    /// Extent along +z.
    pub depth: f64,
    /// Number of side-wall layers between the caps.
    pub steps: u32,
}

impl ExtrudeSettings {
    #[must_use]
    pub fn new(depth: f64, steps: u32) -> Self {
        Self { depth, steps }
    }
}

/// Sweeps a flat shape along +z into a closed triangle mesh.
///
/// A depth of zero or less produces a single upward-facing cap at `z = 0`
/// instead of a zero-volume solid.
pub struct Extrude<'a> {
    shape: &'a Shape,
    settings: ExtrudeSettings,
}

impl<'a> Extrude<'a> {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(shape: &'a Shape, settings: ExtrudeSettings) -> Self {
        Self { shape, settings }
    }

    /// Executes the extrusion. Normals and bounds are computed before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the depth is not finite or the shape's cap
    /// cannot be triangulated.
    pub fn execute(&self) -> Result<Geometry> {
        let depth = self.settings.depth;
        if !depth.is_finite() {
            return Err(GeometryError::NonFinite("extrusion depth").into());
        }
        let cap = triangulate_shape(self.shape)?;

        let mut geometry = Geometry::default();
        if depth > 0.0 {
            push_cap(&mut geometry, &cap, 0.0, true);
            push_cap(&mut geometry, &cap, depth, false);
            let steps = self.settings.steps.max(1);
            for ring in self.shape.rings() {
                push_side_walls(&mut geometry, ring, depth, steps);
            }
        } else {
            push_cap(&mut geometry, &cap, 0.0, false);
        }

        geometry.compute_vertex_normals();
        geometry.compute_bounding_box();
        Ok(geometry)
    }
}

/// Appends a cap at height `z`. `flip` reverses winding so the face
/// points down (-z).
#[allow(clippy::cast_possible_truncation)]
fn push_cap(geometry: &mut Geometry, cap: &CapTriangulation, z: f64, flip: bool) {
    let base = geometry.positions.len() as u32;
    geometry
        .positions
        .extend(cap.points.iter().map(|p| Point3::new(p.x, p.y, z)));
    geometry.indices.extend(cap.triangles.iter().map(|t| {
        if flip {
            [base + t[0], base + t[2], base + t[1]]
        } else {
            [base + t[0], base + t[1], base + t[2]]
        }
    }));
}

/// Appends one quad per ring edge per layer, each with its own four
/// vertices so side normals stay flat.
#[allow(clippy::cast_possible_truncation)]
fn push_side_walls(geometry: &mut Geometry, ring: &[Point2], depth: f64, steps: u32) {
    let n = ring.len();
    let layer_height = depth / f64::from(steps);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        for s in 0..steps {
            let z0 = layer_height * f64::from(s);
            let z1 = if s + 1 == steps {
                depth
            } else {
                layer_height * f64::from(s + 1)
            };
            let base = geometry.positions.len() as u32;
            geometry.positions.extend([
                Point3::new(a.x, a.y, z0),
                Point3::new(b.x, b.y, z0),
                Point3::new(b.x, b.y, z1),
                Point3::new(a.x, a.y, z1),
            ]);
            geometry.indices.push([base, base + 1, base + 2]);
            geometry.indices.push([base, base + 2, base + 3]);
        }
    }
}
