use super::{Aabb, Matrix4, Point3, Vector3, TOLERANCE};

/// A half-line `origin + t * direction`, `t >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a ray; `direction` is normalized.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// Maps the ray through an affine transform. The direction is
    /// renormalized, so `t` values are not preserved across the mapping.
    #[must_use]
    pub fn transform(&self, m: &Matrix4) -> Self {
        Self::new(m.transform_point(&self.origin), m.transform_vector(&self.direction))
    }

    /// Slab test. Returns the entry distance, or `None` on a miss.
    #[must_use]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f64> {
        if aabb.is_empty() {
            return None;
        }
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
            if d.abs() < TOLERANCE {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }
        Some(t_min)
    }

    /// Double-sided Möller–Trumbore ray/triangle test.
    #[must_use]
    pub fn intersect_triangle(&self, a: &Point3, b: &Point3, c: &Point3) -> Option<f64> {
        let e1 = b - a;
        let e2 = c - a;
        let p = self.direction.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() < TOLERANCE {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&e1);
        let v = self.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(&q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}
