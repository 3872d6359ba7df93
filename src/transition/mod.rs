//! Timed depth transitions driven by the render loop.
//!
//! Each transitioning mesh owns one [`Transition`] record in the
//! controller's active set. Every frame the controller advances the records
//! and regenerates the affected geometry from the mesh's flat shape.
//! Starting a transition for a mesh that already has one replaces it.

mod easing;

pub use easing::Easing;

use std::collections::HashMap;

use crate::builder::{extrude_shape, resolve_depth};
use crate::config::TransitionConfig;
use crate::data::{DatasetIndex, Period};
use crate::geometry::{GeometryStore, StepPolicy};
use crate::math::TOLERANCE;
use crate::scale::DepthScale;
use crate::scene::{MaterialPalette, MeshGroup, MeshId};

/// Interpolation of one mesh's depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub mesh: MeshId,
    pub start_depth: f64,
    pub target_depth: f64,
    /// Seconds since the transition started.
    pub elapsed: f64,
    /// Seconds.
    pub duration: f64,
    pub easing: Easing,
}

impl Transition {
    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Eased depth at the current time; exactly `target_depth` once finished.
    #[must_use]
    pub fn current_depth(&self) -> f64 {
        if self.is_finished() {
            return self.target_depth;
        }
        let t = self.easing.apply(self.progress());
        self.start_depth + (self.target_depth - self.start_depth) * t
    }
}

/// Per-mesh transition state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshState {
    Idle,
    Transitioning,
}

/// Owns the active transitions.
#[derive(Debug, Clone)]
pub struct TransitionController {
    active: HashMap<MeshId, Transition>,
    duration: f64,
    easing: Easing,
    current_period: Option<Period>,
}

impl TransitionController {
    #[must_use]
    pub fn new(duration: f64, easing: Easing) -> Self {
        Self {
            active: HashMap::new(),
            duration,
            easing,
            current_period: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &TransitionConfig) -> Self {
        Self::new(config.duration, config.easing)
    }

    /// Records the period the meshes were initially built for.
    pub fn set_current_period(&mut self, period: Period) {
        self.current_period = Some(period);
    }

    #[must_use]
    pub fn current_period(&self) -> Option<Period> {
        self.current_period
    }

    /// Retargets every mesh to `period`'s dataset.
    ///
    /// Returns `false` and changes nothing if the period has no dataset.
    /// Meshes already at their target are left alone; the others start a
    /// transition from their current depth, replacing any in flight.
    pub fn select_period(
        &mut self,
        period: Period,
        index: &DatasetIndex,
        group: &mut MeshGroup,
        palette: &MaterialPalette,
        scale: &DepthScale,
    ) -> bool {
        let Some(dataset) = index.dataset(period) else {
            tracing::warn!(%period, "no dataset for selected period; ignoring");
            return false;
        };

        let ids: Vec<MeshId> = group.ids().collect();
        let mut started = 0usize;
        for id in ids {
            let Some(mesh) = group.get_mut(id) else {
                continue;
            };
            let resolved = resolve_depth(mesh.region_id, Some(dataset), scale);
            if mesh.category != resolved.category() {
                mesh.category = resolved.category().to_owned();
                if let Some(material) = palette.resolve(&mesh.category) {
                    mesh.material = material;
                }
            }

            if (resolved.depth - mesh.depth).abs() < TOLERANCE {
                self.active.remove(&id);
                continue;
            }
            self.active.insert(
                id,
                Transition {
                    mesh: id,
                    start_depth: mesh.depth,
                    target_depth: resolved.depth,
                    elapsed: 0.0,
                    duration: self.duration,
                    easing: self.easing,
                },
            );
            started += 1;
        }

        self.current_period = Some(period);
        tracing::debug!(%period, started, active = self.active.len(), "period selected");
        true
    }

    /// Advances every active transition by `dt` seconds, regenerating the
    /// geometry of each affected mesh. The previous geometry is disposed
    /// before the new one is stored. Returns the number of meshes rebuilt.
    pub fn advance(
        &mut self,
        dt: f64,
        group: &mut MeshGroup,
        store: &mut GeometryStore,
        policy: &StepPolicy,
    ) -> usize {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut finished = Vec::new();
        let mut rebuilt = 0usize;

        for (id, transition) in &mut self.active {
            transition.elapsed += dt;
            let Some(mesh) = group.get_mut(*id) else {
                finished.push(*id);
                continue;
            };
            let depth = transition.current_depth();
            match extrude_shape(&mesh.shape, depth, policy) {
                Ok(geometry) => {
                    mesh.geometry = store.replace(mesh.geometry, geometry);
                    mesh.depth = depth;
                    rebuilt += 1;
                }
                Err(e) => {
                    tracing::warn!(region = %mesh.region_id, error = %e, "cannot rebuild geometry; dropping transition");
                    finished.push(*id);
                    continue;
                }
            }
            if transition.is_finished() {
                finished.push(*id);
            }
        }

        for id in &finished {
            self.active.remove(id);
        }
        if !finished.is_empty() && self.active.is_empty() {
            tracing::debug!(period = ?self.current_period, "transitions settled");
        }
        tracing::trace!(rebuilt, active = self.active.len(), "advanced transitions");
        rebuilt
    }

    #[must_use]
    pub fn state(&self, mesh: MeshId) -> MeshState {
        if self.active.contains_key(&mesh) {
            MeshState::Transitioning
        } else {
            MeshState::Idle
        }
    }

    #[must_use]
    pub fn get(&self, mesh: MeshId) -> Option<&Transition> {
        self.active.get(&mesh)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }
}
