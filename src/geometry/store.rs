use slotmap::SlotMap;

use crate::error::GeometryError;

use super::Geometry;

slotmap::new_key_type! {
    /// Unique identifier for a geometry buffer in the geometry store.
    pub struct GeometryId;
}

/// Arena owning every live geometry buffer.
///
/// Stands in for graphics memory: a geometry lives from [`insert`](Self::insert)
/// until [`dispose`](Self::dispose). Generational keys make a disposed id
/// unusable instead of aliasing a newer buffer.
#[derive(Debug, Default)]
pub struct GeometryStore {
    geometries: SlotMap<GeometryId, Geometry>,
    disposed: u64,
}

impl GeometryStore {
    /// Creates a new, empty geometry store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a geometry and returns its ID.
    pub fn insert(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.insert(geometry)
    }

    /// Returns a reference to the geometry, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry was disposed or never existed.
    pub fn get(&self, id: GeometryId) -> Result<&Geometry, GeometryError> {
        self.geometries
            .get(id)
            .ok_or(GeometryError::EntityNotFound("geometry"))
    }

    /// Releases a geometry. Returns `false` if it was already gone.
    pub fn dispose(&mut self, id: GeometryId) -> bool {
        if self.geometries.remove(id).is_some() {
            self.disposed += 1;
            true
        } else {
            false
        }
    }

    /// Disposes `old` and inserts `geometry` in its place.
    pub fn replace(&mut self, old: GeometryId, geometry: Geometry) -> GeometryId {
        self.dispose(old);
        self.insert(geometry)
    }

    /// Number of geometries currently allocated.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.geometries.len()
    }

    /// Total number of geometries released since creation.
    #[must_use]
    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn replace_releases_previous_allocation() {
        let mut store = GeometryStore::new();
        let first = store.insert(Geometry::default());
        let second = store.replace(first, Geometry::default());
        assert_eq!(store.live_count(), 1);
        assert_eq!(store.disposed_count(), 1);
        assert!(store.get(first).is_err());
        assert!(store.get(second).is_ok());
    }

    #[test]
    fn double_dispose_is_harmless() {
        let mut store = GeometryStore::new();
        let id = store.insert(Geometry::default());
        assert!(store.dispose(id));
        assert!(!store.dispose(id));
        assert_eq!(store.disposed_count(), 1);
        assert_eq!(store.live_count(), 0);
    }
}
