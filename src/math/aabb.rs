use super::{Matrix4, Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// An empty box: `min` is +inf and `max` is -inf, so any union replaces it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing all `points`. Empty when `points` is empty.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_by_point(p);
        }
        aabb
    }

    /// Returns `true` if the box contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grows the box to include `p`.
    pub fn expand_by_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    #[must_use]
    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Box of the eight transformed corners.
    #[must_use]
    pub fn transformed(&self, m: &Matrix4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let mut out = Self::empty();
        for &x in &[self.min.x, self.max.x] {
            for &y in &[self.min.y, self.max.y] {
                for &z in &[self.min.z, self.max.z] {
                    out.expand_by_point(&m.transform_point(&Point3::new(x, y, z)));
                }
            }
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_points_and_center() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0)];
        let aabb = Aabb::from_points(&pts);
        assert_relative_eq!(aabb.center(), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(aabb.size(), Vector3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn empty_box_is_identity_for_union() {
        let a = Aabb::from_points(&[Point3::new(1.0, 1.0, 1.0)]);
        assert!(Aabb::empty().is_empty());
        assert_eq!(Aabb::empty().union(&a), a);
        assert_eq!(a.union(&Aabb::empty()), a);
        assert_relative_eq!(Aabb::empty().size(), Vector3::zeros());
    }

    #[test]
    fn transformed_by_y_flip() {
        let aabb = Aabb::from_points(&[Point3::new(0.0, 1.0, 0.0), Point3::new(1.0, 3.0, 1.0)]);
        let flip = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, -1.0, 1.0));
        let t = aabb.transformed(&flip);
        assert_relative_eq!(t.min, Point3::new(0.0, -3.0, 0.0));
        assert_relative_eq!(t.max, Point3::new(1.0, -1.0, 1.0));
    }
}
