//! Application context tying the data, scene, transitions, input and
//! render loop together.

use crate::builder::GeometryBuilder;
use crate::config::AppConfig;
use crate::data::{DatasetIndex, Period, Record};
use crate::error::{ConfigError, Result};
use crate::geometry::GeometryStore;
use crate::outline::OutlinePath;
use crate::panel::{DebugPanel, PanelChange, PanelEffect};
use crate::picking::{Picker, Selection};
use crate::render::{FrameClock, FrameContext, PostProcessing, RenderBackend};
use crate::scale::DepthScale;
use crate::scene::{MapControls, Scene, Viewport};
use crate::transition::TransitionController;

/// Owns every piece of runtime state. One instance per map.
pub struct App<B: RenderBackend> {
    config: AppConfig,
    index: DatasetIndex,
    scale: DepthScale,
    scene: Scene,
    store: GeometryStore,
    transitions: TransitionController,
    controls: MapControls,
    selection: Selection,
    post: PostProcessing,
    panel: DebugPanel,
    clock: FrameClock,
    backend: B,
}

impl<B: RenderBackend> App<B> {
    /// Builds the map for the first configured period.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the initial meshes
    /// cannot be assembled.
    pub fn new(
        config: AppConfig,
        paths: &[OutlinePath],
        records: impl IntoIterator<Item = Record>,
        mut backend: B,
    ) -> Result<Self> {
        config.validate()?;
        let initial = config
            .periods
            .first()
            .copied()
            .ok_or_else(|| ConfigError::Invalid("at least one period is required".into()))?;

        let index = DatasetIndex::from_records(records);
        let scale = DepthScale::from_config(&config.scale, index.max_magnitude().unwrap_or(0.0));
        if index.dataset(initial).is_none() {
            tracing::warn!(period = %initial, "initial period has no data; building flat");
        }

        let mut scene = Scene::from_config(&config);
        let mut store = GeometryStore::new();
        GeometryBuilder::new(paths, index.dataset(initial), &scale, config.extrusion)
            .with_solid_winding(config.outline.solid_winding)
            .execute(&mut scene.group, &mut store, &scene.palette)?;
        scene.group.recenter(&store)?;

        let mut transitions = TransitionController::from_config(&config.transition);
        transitions.set_current_period(initial);

        let surface = &config.surface;
        let post = PostProcessing::from_config(&config.post, surface.width, surface.height, surface.pixel_ratio);
        backend.resize(scene.camera.viewport(), surface.pixel_ratio);

        tracing::info!(
            periods = index.periods().count(),
            meshes = scene.group.len(),
            initial = %initial,
            "map ready"
        );

        Ok(Self {
            controls: MapControls::from_config(&config.controls),
            panel: DebugPanel::new(config.periods.clone()),
            config,
            index,
            scale,
            scene,
            store,
            transitions,
            selection: Selection::default(),
            post,
            clock: FrameClock::default(),
            backend,
        })
    }

    /// Runs one iteration of the render loop: camera controls, active
    /// transitions, then the frame itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to draw.
    pub fn frame(&mut self, dt: f64) -> Result<()> {
        self.controls.update(&mut self.scene.camera);
        self.transitions
            .advance(dt, &mut self.scene.group, &mut self.store, &self.config.extrusion);
        let elapsed = self.clock.tick(dt);
        tracing::trace!(frame = self.clock.frames(), elapsed, "frame");
        self.backend.render(&FrameContext {
            scene: &self.scene,
            store: &self.store,
            post: &self.post,
            selection: &self.selection,
            elapsed,
        })
    }

    /// Starts transitions toward `period`'s data and shows it in the
    /// panel. Returns `false` if the period has no dataset.
    pub fn select_period(&mut self, period: Period) -> bool {
        let started = self.transitions.select_period(
            period,
            &self.index,
            &mut self.scene.group,
            &self.scene.palette,
            &self.scale,
        );
        if started {
            self.panel.sync_period(period);
        }
        started
    }

    /// Propagates a surface resize to the camera, the post-processing
    /// chain and the backend.
    pub fn on_resize(&mut self, width: u32, height: u32, pixel_ratio: f64) {
        let viewport = Viewport::new(width, height);
        self.config.surface.width = width;
        self.config.surface.height = height;
        self.config.surface.pixel_ratio = pixel_ratio;
        self.scene.camera.resize(viewport);
        self.post.resize(width, height, pixel_ratio);
        self.backend.resize(viewport, pixel_ratio);
    }

    /// Picks under the pointer (pixels, origin top-left) and updates the
    /// selection. Returns `true` if the selection changed.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let ndc = self.scene.camera.viewport().pointer_to_ndc(x, y);
        let hit = Picker::new(ndc).execute(&self.scene.camera, &self.scene.group, &self.store);
        self.selection
            .apply_pick(hit.as_ref(), self.config.interaction.clear_on_miss)
    }

    /// Applies a panel edit; a period edit starts the transitions.
    pub fn apply_panel(&mut self, change: PanelChange) -> PanelEffect {
        let effect = self.panel.apply(change, &mut self.scene.camera, &mut self.post);
        if let PanelEffect::PeriodSelected(period) = effect {
            self.select_period(period);
        }
        effect
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn index(&self) -> &DatasetIndex {
        &self.index
    }

    #[must_use]
    pub fn scale(&self) -> &DepthScale {
        &self.scale
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    #[must_use]
    pub fn transitions(&self) -> &TransitionController {
        &self.transitions
    }

    pub fn controls_mut(&mut self) -> &mut MapControls {
        &mut self.controls
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn post(&self) -> &PostProcessing {
        &self.post
    }

    #[must_use]
    pub fn panel(&self) -> &DebugPanel {
        &self.panel
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data::{RegionId, NO_PARTY};
    use crate::math::Point2;
    use crate::config::OutlineConfig;
    use crate::math::polygon_2d::Winding;
    use crate::render::{HeadlessBackend, Pass};
    use approx::assert_relative_eq;
    use tracing_subscriber::EnvFilter;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    fn rec(region: u32, category: &str, magnitude: f64, period: i32) -> Record {
        Record {
            region_id: RegionId(region),
            category: category.into(),
            magnitude,
            period: Period(period),
        }
    }

    fn app() -> App<HeadlessBackend> {
        init_tracing();
        let paths = vec![
            OutlinePath::new(RegionId(1), vec![rect(0.0, 0.0, 40.0, 40.0)]),
            OutlinePath::new(RegionId(2), vec![rect(40.0, 0.0, 50.0, 10.0)]),
        ];
        let records = vec![
            rec(1, "DEMOCRAT", 500_000.0, 2000),
            rec(1, "REPUBLICAN", 300_000.0, 2000),
            rec(2, "REPUBLICAN", 40_000.0, 2000),
            rec(1, "DEMOCRAT", 1_200_000.0, 2004),
        ];
        let config = AppConfig {
            periods: vec![Period(2000), Period(2004)],
            ..AppConfig::default()
        };
        App::new(config, &paths, records, HeadlessBackend::new()).unwrap()
    }

    fn depth_of(app: &App<HeadlessBackend>, region: u32) -> f64 {
        app.scene().group.by_region(RegionId(region)).next().unwrap().1.depth
    }

    #[test]
    fn initial_build_uses_first_period() {
        let app = app();
        assert_eq!(app.scene().group.len(), 2);
        assert_eq!(app.store().live_count(), 2);
        assert_eq!(
            depth_of(&app, 1).to_bits(),
            app.scale().floored(500_000.0).to_bits()
        );
        assert_eq!(app.transitions().current_period(), Some(Period(2000)));
        assert_eq!(app.backend().surface.unwrap().0, Viewport::new(1280, 720));
    }

    #[test]
    fn period_change_animates_to_new_depths_without_leaks() {
        let mut app = app();
        assert!(app.select_period(Period(2004)));
        assert!(!app.transitions().is_idle());

        for _ in 0..180 {
            app.frame(1.0 / 60.0).unwrap();
        }

        assert!(app.transitions().is_idle());
        let target = app.scale().floored(1_200_000.0);
        assert_eq!(depth_of(&app, 1).to_bits(), target.to_bits());
        assert!(depth_of(&app, 2).abs() < f64::EPSILON);
        let (_, r2) = app.scene().group.by_region(RegionId(2)).next().unwrap();
        assert_eq!(r2.category, NO_PARTY);
        assert_eq!(app.store().live_count(), 2);
        assert!(app.store().disposed_count() > 0);
        assert_eq!(app.backend().frames.len(), 180);
        assert_eq!(app.clock().frames(), 180);
    }

    #[test]
    fn unknown_period_changes_nothing() {
        let mut app = app();
        let before = depth_of(&app, 1);
        assert!(!app.select_period(Period(1996)));
        app.frame(1.0).unwrap();
        assert_eq!(depth_of(&app, 1).to_bits(), before.to_bits());
        assert_eq!(app.store().disposed_count(), 0);
    }

    #[test]
    fn panel_period_is_the_transition_trigger() {
        let mut app = app();
        let effect = app.apply_panel(PanelChange::Period(Period(2004)));
        assert_eq!(effect, PanelEffect::PeriodSelected(Period(2004)));
        assert!(!app.transitions().is_idle());
        assert_eq!(app.apply_panel(PanelChange::Period(Period(2012))), PanelEffect::Rejected);
    }

    #[test]
    fn resize_reaches_camera_post_and_backend() {
        let mut app = app();
        app.on_resize(640, 480, 2.0);
        assert_eq!(app.scene().camera.viewport(), Viewport::new(640, 480));
        assert_eq!(app.backend().surface, Some((Viewport::new(640, 480), 2.0)));
        for pass in app.post().passes() {
            if let Pass::Pixelation { resolution, .. } = pass {
                assert_eq!(*resolution, [1280.0, 960.0]);
            }
        }
        app.frame(0.0).unwrap();
        assert_eq!(app.backend().last_frame().unwrap().viewport, Viewport::new(640, 480));
    }

    #[test]
    fn pointer_selection_sticks_on_miss() {
        let mut app = app();
        assert!(app.on_pointer_move(640.0, 360.0));
        assert_eq!(app.selection().objects.len(), 1);
        let selected = app.selection().objects[0];
        assert_eq!(app.scene().group.get(selected).unwrap().region_id, RegionId(1));

        assert!(!app.on_pointer_move(1.0, 1.0));
        assert!(app.selection().contains(selected));
        app.frame(0.0).unwrap();
        assert_eq!(app.backend().last_frame().unwrap().selected, 1);
    }

    #[test]
    fn hidden_surface_resize_keeps_rendering() {
        let mut app = app();
        let before = *app.scene().camera.projection_matrix();

        app.on_resize(0, 0, 1.0);
        assert_eq!(app.scene().camera.viewport(), Viewport::new(0, 0));
        app.frame(1.0 / 60.0).unwrap();
        assert_relative_eq!(*app.scene().camera.projection_matrix(), before);

        app.on_resize(1280, 720, 1.0);
        app.frame(1.0 / 60.0).unwrap();
        assert_relative_eq!(*app.scene().camera.projection_matrix(), before, epsilon = 1e-12);
        assert_eq!(app.backend().last_frame().unwrap().viewport, Viewport::new(1280, 720));
    }

    #[test]
    fn picking_after_resize_uses_new_surface_size() {
        let mut app = app();
        app.on_resize(640, 480, 1.0);

        // Center of the old 1280x720 surface, right edge of the new one.
        assert!(!app.on_pointer_move(640.0, 360.0));
        assert!(app.selection().is_empty());

        assert!(app.on_pointer_move(320.0, 240.0));
        let selected = app.selection().objects[0];
        assert_eq!(app.scene().group.get(selected).unwrap().region_id, RegionId(1));
    }

    #[test]
    fn direct_period_selection_updates_panel() {
        let mut app = app();
        assert_eq!(app.panel().period(), Some(Period(2000)));
        assert!(app.select_period(Period(2004)));
        assert_eq!(app.panel().period(), Some(Period(2004)));
        assert!(!app.select_period(Period(1996)));
        assert_eq!(app.panel().period(), Some(Period(2004)));
    }

    #[test]
    fn solid_winding_comes_from_config() {
        init_tracing();
        let mut outer = rect(0.0, 0.0, 40.0, 40.0);
        outer.reverse();
        let paths = vec![OutlinePath::new(RegionId(1), vec![outer, rect(10.0, 10.0, 20.0, 20.0)])];
        let records = || vec![rec(1, "DEMOCRAT", 500_000.0, 2000)];

        let ccw = App::new(AppConfig::default(), &paths, records(), HeadlessBackend::new()).unwrap();
        assert_eq!(ccw.scene().group.len(), 2);

        let config = AppConfig {
            outline: OutlineConfig {
                solid_winding: Winding::Clockwise,
            },
            ..AppConfig::default()
        };
        let cw = App::new(config, &paths, records(), HeadlessBackend::new()).unwrap();
        assert_eq!(cw.scene().group.len(), 1);
        let (_, mesh) = cw.scene().group.iter().next().unwrap();
        assert_eq!(mesh.shape.holes.len(), 1);
    }
}
