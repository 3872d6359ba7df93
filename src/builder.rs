//! Initial mesh construction from outlines and a period's dataset.

use crate::data::{Dataset, Record, RegionId, NO_PARTY};
use crate::error::{GeometryError, Result};
use crate::geometry::{Extrude, ExtrudeSettings, Geometry, GeometryStore, StepPolicy};
use crate::math::polygon_2d::Winding;
use crate::outline::{OutlinePath, Shape, ToShapes};
use crate::scale::DepthScale;
use crate::scene::{ExtrudedMesh, MaterialPalette, MeshGroup, MeshId};

/// Depth and record resolved for one region in one dataset.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub depth: f64,
    pub record: Option<&'a Record>,
}

impl Resolved<'_> {
    /// Record category, or [`NO_PARTY`] when the region has no record.
    #[must_use]
    pub fn category(&self) -> &str {
        self.record.map_or(NO_PARTY, |r| r.category.as_str())
    }
}

/// Depth for `region`: the floored scale of its magnitude, or exactly 0
/// when the dataset has no record for it.
#[must_use]
pub fn resolve_depth<'a>(
    region: RegionId,
    dataset: Option<&'a Dataset>,
    scale: &DepthScale,
) -> Resolved<'a> {
    match dataset.and_then(|d| d.get(region)) {
        Some(record) => Resolved {
            depth: scale.floored(record.magnitude),
            record: Some(record),
        },
        None => Resolved {
            depth: 0.0,
            record: None,
        },
    }
}

/// Extrudes `shape` to `depth` with steps chosen by `policy`.
///
/// # Errors
///
/// Returns an error if the shape cannot be triangulated.
pub fn extrude_shape(shape: &Shape, depth: f64, policy: &StepPolicy) -> Result<Geometry> {
    Extrude::new(shape, ExtrudeSettings::new(depth, policy.steps_for(depth))).execute()
}

/// Builds one mesh per shape per outline, sized by the dataset.
pub struct GeometryBuilder<'a> {
    paths: &'a [OutlinePath],
    dataset: Option<&'a Dataset>,
    scale: &'a DepthScale,
    policy: StepPolicy,
    solid_winding: Winding,
}

impl<'a> GeometryBuilder<'a> {
    /// Creates a new `GeometryBuilder`. A `None` dataset builds every
    /// region flat.
    #[must_use]
    pub fn new(
        paths: &'a [OutlinePath],
        dataset: Option<&'a Dataset>,
        scale: &'a DepthScale,
        policy: StepPolicy,
    ) -> Self {
        Self {
            paths,
            dataset,
            scale,
            policy,
            solid_winding: Winding::CounterClockwise,
        }
    }

    /// Winding that marks a subpath as a solid rather than a hole.
    #[must_use]
    pub fn with_solid_winding(mut self, winding: Winding) -> Self {
        self.solid_winding = winding;
        self
    }

    /// Adds the meshes to `group`, allocating their geometry in `store`.
    ///
    /// Shapes that cannot be triangulated are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if `palette` has no material for a category and
    /// no fallback.
    pub fn execute(
        &self,
        group: &mut MeshGroup,
        store: &mut GeometryStore,
        palette: &MaterialPalette,
    ) -> Result<Vec<MeshId>> {
        let mut ids = Vec::new();
        let mut skipped = 0usize;

        for path in self.paths {
            let resolved = resolve_depth(path.region_id, self.dataset, self.scale);
            let category = resolved.category().to_owned();
            let material = palette
                .resolve(&category)
                .ok_or(GeometryError::EntityNotFound("material"))?;

            for shape in ToShapes::new(path, self.solid_winding).execute() {
                let geometry = match extrude_shape(&shape, resolved.depth, &self.policy) {
                    Ok(g) => g,
                    Err(e) => {
                        tracing::warn!(region = %path.region_id, error = %e, "skipping shape");
                        skipped += 1;
                        continue;
                    }
                };
                let geometry = store.insert(geometry);
                ids.push(group.add(ExtrudedMesh {
                    region_id: path.region_id,
                    category: category.clone(),
                    shape,
                    depth: resolved.depth,
                    geometry,
                    material,
                }));
            }
        }

        tracing::info!(
            paths = self.paths.len(),
            meshes = ids.len(),
            skipped,
            period = ?self.dataset.and_then(Dataset::period),
            "built extruded meshes"
        );
        Ok(ids)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data::{DatasetIndex, Period};
    use crate::math::Point2;
    use crate::scene::{Material, Rgb};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    fn index() -> DatasetIndex {
        DatasetIndex::from_records(vec![Record {
            region_id: RegionId(1),
            category: "DEMOCRAT".into(),
            magnitude: 1_000.0,
            period: Period(2000),
        }])
    }

    #[test]
    fn matched_region_is_floored_and_tagged() {
        let index = index();
        let scale = DepthScale::log_for(1_000_000.0, (0.0, 45.0));
        let r = resolve_depth(RegionId(1), index.dataset(Period(2000)), &scale);
        assert!((r.depth - 22.5).abs() < 1e-9);
        assert_eq!(r.category(), "DEMOCRAT");
    }

    #[test]
    fn unmatched_region_is_exactly_zero() {
        let index = index();
        let scale = DepthScale::log_for(1_000_000.0, (0.0, 45.0));
        let r = resolve_depth(RegionId(2), index.dataset(Period(2000)), &scale);
        assert!(r.depth.abs() < f64::EPSILON);
        assert_eq!(r.category(), NO_PARTY);
        let none = resolve_depth(RegionId(1), None, &scale);
        assert!(none.depth.abs() < f64::EPSILON);
    }

    #[test]
    fn tiny_magnitude_is_floored_not_zero() {
        let index = DatasetIndex::from_records(vec![Record {
            region_id: RegionId(7),
            category: "GREEN".into(),
            magnitude: 1.0,
            period: Period(2000),
        }]);
        let scale = DepthScale::log_for(1_000_000.0, (0.0, 45.0));
        let r = resolve_depth(RegionId(7), index.dataset(Period(2000)), &scale);
        assert!((r.depth - scale.min_depth()).abs() < f64::EPSILON);
    }

    #[test]
    fn builds_one_mesh_per_shape_sharing_depth() {
        let index = index();
        let scale = DepthScale::log_for(1_000_000.0, (0.0, 45.0));
        let paths = vec![
            OutlinePath::new(RegionId(1), vec![rect(0.0, 0.0, 1.0, 1.0), rect(3.0, 0.0, 4.0, 1.0)]),
            OutlinePath::new(RegionId(2), vec![rect(5.0, 5.0, 6.0, 6.0)]),
        ];
        let mut group = MeshGroup::new();
        let mut store = GeometryStore::new();
        let mut palette = MaterialPalette::new(Material::height_gradient());
        let dem = palette.assign("DEMOCRAT", Material::Solid { color: Rgb::new(0, 0, 255) });

        let ids = GeometryBuilder::new(&paths, index.dataset(Period(2000)), &scale, StepPolicy::default())
            .execute(&mut group, &mut store, &palette)
            .unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(store.live_count(), 3);
        let region_one: Vec<_> = group.by_region(RegionId(1)).collect();
        assert_eq!(region_one.len(), 2);
        for (_, mesh) in &region_one {
            assert!((mesh.depth - 22.5).abs() < 1e-9);
            assert_eq!(mesh.material, dem);
            assert_eq!(mesh.category, "DEMOCRAT");
        }
        let (_, flat) = group.by_region(RegionId(2)).next().unwrap();
        assert!(flat.depth.abs() < f64::EPSILON);
        assert_eq!(flat.category, NO_PARTY);
        assert!(store.get(flat.geometry).unwrap().bounding_box.max.z.abs() < f64::EPSILON);
    }

    #[test]
    fn does_not_mutate_inputs() {
        let index = index();
        let scale = DepthScale::log_for(1_000_000.0, (0.0, 45.0));
        let paths = vec![OutlinePath::new(RegionId(1), vec![rect(0.0, 0.0, 1.0, 1.0)])];
        let before = paths.clone();
        let mut group = MeshGroup::new();
        let mut store = GeometryStore::new();
        let palette = MaterialPalette::new(Material::height_gradient());
        GeometryBuilder::new(&paths, index.dataset(Period(2000)), &scale, StepPolicy::default())
            .execute(&mut group, &mut store, &palette)
            .unwrap();
        assert_eq!(paths, before);
        assert_eq!(index.dataset(Period(2000)).unwrap().len(), 1);
    }
}
