//! Interactive viewer state
//!
//! [`Viewer`] owns everything one visualization needs: camera and orbit
//! controls, the scene graph and its resources, pointer/focus state, the
//! tooltip, and the camera transition. UI code forwards input events to
//! its handlers; nothing here depends on a windowing toolkit.

use glam::{Vec2, Vec3};
use shared::DatasetNode;

use crate::helpers::{format_value, Rgb, SequentialScale};
use crate::hierarchy::Hierarchy;
use crate::highlight::PickState;
use crate::layout::treemap;
use crate::scene::builder::{self, TreemapPool};
use crate::scene::city::{build_city_scene, City, CityConfig, CityPool};
use crate::scene::resources::{MemoryInfo, Resources};
use crate::scene::{ObjectId, SceneGraph, Tag};
use crate::state::settings::{ViewerSettings, ZoomSettings};
use crate::tooltip::{self, Tooltip, TooltipContent};
use crate::viewport::camera::{PerspectiveCamera, Viewport};
use crate::viewport::controls::OrbitControls;
use crate::viewport::picking::{intersect_objects, nearest_tagged, PickParams};
use crate::viewport::transition::{
    CameraMode, CameraTransition, DollyOut, Pose, Tick, TransitionError, TransitionRequest,
};

/// Camera rotation looking straight down the -Y axis
pub const TOP_DOWN: Vec3 = Vec3::new(-std::f32::consts::FRAC_PI_2, 0.0, 0.0);

/// Allocations allowed to survive scene disposal (the sprite tooltip's)
const BASELINE_GEOMETRIES: usize = 1;
const BASELINE_TEXTURES: usize = 1;

/// What the viewer is showing
#[derive(Debug)]
pub enum SceneContent {
    Empty,
    Treemap {
        hierarchy: Hierarchy,
        pool: TreemapPool,
    },
    City {
        city: City,
        pool: CityPool,
    },
}

/// Counters of visible side effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerStats {
    pub render_requests: u64,
    pub highlight_attaches: u64,
    pub tooltip_updates: u64,
}

pub struct Viewer {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub scene: SceneGraph,
    pub resources: Resources,
    pub viewport: Viewport,
    pub pick: PickState,
    tooltip: Box<dyn Tooltip>,
    transition: CameraTransition,
    content: SceneContent,
    zoom: ZoomSettings,
    pick_params: PickParams,
    /// Scene offset of the overview pose
    overview_offset: Vec3,
    stats: ViewerStats,
    torn_down: bool,
}

impl Viewer {
    fn with_settings(viewport: Viewport, settings: &ViewerSettings, zoom: ZoomSettings) -> Self {
        let cam = &settings.camera;
        let mut camera = PerspectiveCamera::new(cam.fov, viewport.aspect(), cam.near, cam.far);
        camera.position = Vec3::new(0.0, zoom.overview_height, 0.0);

        let c = &settings.controls;
        let mut controls = OrbitControls::new(c.min_distance, c.max_distance, c.max_polar_angle);
        controls.update(&mut camera);
        controls.save_state(&camera);

        let [r, g, b] = settings.background_color;
        let mut scene = SceneGraph::new();
        scene.background = Some(Rgb(r, g, b));

        Self {
            camera,
            controls,
            scene,
            resources: Resources::new(),
            viewport,
            pick: PickState::default(),
            tooltip: Box::new(tooltip::OverlayTooltip::default()),
            transition: CameraTransition::new(),
            content: SceneContent::Empty,
            zoom,
            pick_params: PickParams {
                line_threshold: settings.picking.line_threshold,
                text_tolerance: settings.treemap.tolerance as f32,
            },
            overview_offset: Vec3::ZERO,
            stats: ViewerStats::default(),
            torn_down: false,
        }
    }

    fn install_tooltip(&mut self, settings: &ViewerSettings, max_title_chars: usize) {
        self.tooltip = tooltip::create(settings.tooltip, &mut self.resources, max_title_chars);
        self.tooltip.attach();
    }

    /// Viewer with nothing loaded (e.g. after a failed dataset load)
    pub fn empty(viewport: Viewport, settings: &ViewerSettings) -> Self {
        let mut viewer = Self::with_settings(viewport, settings, settings.treemap_zoom.clone());
        viewer.install_tooltip(settings, 0);
        viewer
    }

    /// Lay out `data` as a treemap and build its scene
    pub fn treemap(data: &DatasetNode, viewport: Viewport, settings: &ViewerSettings) -> Self {
        let mut viewer = Self::with_settings(viewport, settings, settings.treemap_zoom.clone());

        let mut hierarchy = Hierarchy::from_dataset(data);
        treemap(&mut hierarchy, &settings.layout);

        let layout = &settings.layout;
        viewer.overview_offset =
            builder::base_offset(layout.width as f32, layout.depth as f32, &settings.treemap);
        viewer.scene.position = viewer.overview_offset;
        let pool = builder::build_treemap(
            &hierarchy,
            &mut viewer.scene,
            &mut viewer.resources,
            &settings.treemap,
            &SequentialScale::default(),
        );

        let max_title = hierarchy
            .descendants(hierarchy.root())
            .into_iter()
            .map(|id| hierarchy.full_name(id, "/").chars().count())
            .max()
            .unwrap_or(0);
        viewer.install_tooltip(settings, max_title);
        viewer.content = SceneContent::Treemap { hierarchy, pool };
        viewer.request_render();
        viewer
    }

    /// Generate a toy city and build its scene
    pub fn city(config: CityConfig, viewport: Viewport, settings: &ViewerSettings) -> Self {
        let mut viewer = Self::with_settings(viewport, settings, settings.city_zoom.clone());

        let city = City::generate(config);
        viewer.overview_offset = city.base_offset();
        viewer.scene.position = viewer.overview_offset;
        let pool = build_city_scene(&city, &mut viewer.scene, &mut viewer.resources);

        let max_title = city
            .buildings
            .keys()
            .map(|pos| format!("Building {pos}").chars().count())
            .max()
            .unwrap_or(0);
        viewer.install_tooltip(settings, max_title);
        viewer.content = SceneContent::City { city, pool };
        viewer.request_render();
        viewer
    }

    pub fn content(&self) -> &SceneContent {
        &self.content
    }

    pub fn hierarchy(&self) -> Option<&Hierarchy> {
        match &self.content {
            SceneContent::Treemap { hierarchy, .. } => Some(hierarchy),
            _ => None,
        }
    }

    pub fn city_model(&self) -> Option<&City> {
        match &self.content {
            SceneContent::City { city, .. } => Some(city),
            _ => None,
        }
    }

    pub fn tooltip(&self) -> &dyn Tooltip {
        self.tooltip.as_ref()
    }

    pub fn stats(&self) -> ViewerStats {
        self.stats
    }

    pub fn mode(&self) -> CameraMode {
        self.transition.mode()
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_animating()
    }

    pub fn focused(&self) -> Option<ObjectId> {
        self.pick.focused()
    }

    pub fn overview_offset(&self) -> Vec3 {
        self.overview_offset
    }

    fn request_render(&mut self) {
        self.stats.render_requests += 1;
    }

    /// Tooltip text for a data object
    pub fn describe(&self, tag: Tag) -> Option<TooltipContent> {
        match (&self.content, tag) {
            (SceneContent::Treemap { hierarchy, .. }, Tag::Hierarchy(id)) => {
                let node = hierarchy.get(id)?;
                Some(TooltipContent::new(
                    hierarchy.full_name(id, "/"),
                    format_value(node.value),
                ))
            }
            (SceneContent::City { city, .. }, Tag::Building(pos)) => {
                let building = city.building(pos)?;
                Some(TooltipContent::new(
                    format!("Building {pos}"),
                    format!("height {}", format_value(building.height as f64)),
                ))
            }
            _ => None,
        }
    }

    // ── Event handlers ────────────────────────────────────────

    /// Pointer moved to `screen` (absolute pixels). While a transition is
    /// running only the stored coordinates change.
    pub fn on_pointer_move(&mut self, screen: Vec2) {
        self.pick.screen = screen;
        self.pick.ndc = self.viewport.to_ndc(screen - self.viewport.origin);
        if self.transition.is_animating() {
            return;
        }
        self.intersect();
    }

    fn intersect(&mut self) {
        let ray = self.camera.ray_from_ndc(self.pick.ndc);
        let hits = intersect_objects(&self.scene, &self.resources, &ray, &self.pick_params);
        match nearest_tagged(&hits, &self.scene) {
            Some(target) if self.pick.focused() == Some(target) => {}
            Some(target) => self.focus(target),
            None => self.cancel_highlight(),
        }
    }

    fn focus(&mut self, target: ObjectId) {
        let Some(tag) = self.scene.tag(target) else {
            return;
        };
        let curves = match (&self.content, tag) {
            (SceneContent::City { city, .. }, Tag::Building(pos)) => city.connection_curves(pos),
            _ => Vec::new(),
        };
        self.pick.focus_on(target, curves, &mut self.scene, &mut self.resources);
        self.stats.highlight_attaches += 1;

        match self.describe(tag) {
            Some(content) => {
                self.tooltip
                    .update(&content, self.pick.screen, &self.viewport, &mut self.resources);
                self.stats.tooltip_updates += 1;
            }
            None => tracing::warn!(?tag, "focused object has no description"),
        }
        tracing::trace!(?tag, "focus changed");
        self.request_render();
    }

    fn cancel_highlight(&mut self) {
        if self.pick.clear_focus(&mut self.scene, &mut self.resources) {
            self.tooltip.clear(&mut self.resources);
            self.request_render();
        }
    }

    /// Zoom gesture: focus the highlighted object, or return to the
    /// overview when nothing is highlighted.
    pub fn on_double_click(&mut self) -> Result<(), TransitionError> {
        let request = self
            .pick
            .focused()
            .and_then(|object| self.focus_request(object))
            .unwrap_or_else(|| self.overview_request());
        self.start_transition(request)
    }

    /// Return to the overview regardless of what is highlighted
    pub fn zoom_out(&mut self) -> Result<(), TransitionError> {
        let request = self.overview_request();
        self.start_transition(request)
    }

    fn start_transition(&mut self, request: TransitionRequest) -> Result<(), TransitionError> {
        self.transition
            .begin(request, &self.camera, self.scene.position, &mut self.controls)?;
        self.request_render();
        Ok(())
    }

    fn focus_request(&self, object: ObjectId) -> Option<TransitionRequest> {
        let center = self.scene.get(object)?.transform.position;
        let camera = self.camera.position;
        let dolly_out = (self.transition.mode() == CameraMode::Overview).then_some(DollyOut {
            height: self.zoom.dolly_height,
            duration: self.zoom.dolly_duration,
        });
        Some(TransitionRequest {
            to: CameraMode::Focused(object),
            pose: Pose {
                camera_position: Vec3::new(camera.x, self.zoom.focus_height, camera.z),
                // Always straight down, even after orbiting; the focus view is a plan view
                camera_rotation: TOP_DOWN,
                // Puts the rectangle's midpoint directly under the camera
                scene_offset: Vec3::new(
                    camera.x - center.x,
                    self.overview_offset.y,
                    camera.z - center.z,
                ),
            },
            dolly_out,
            duration: self.zoom.duration,
        })
    }

    fn overview_request(&self) -> TransitionRequest {
        let (position, rotation) = match self.controls.saved() {
            Some(saved) => (saved.position, saved.rotation),
            None => (Vec3::new(0.0, self.zoom.overview_height, 0.0), TOP_DOWN),
        };
        TransitionRequest {
            to: CameraMode::Overview,
            pose: Pose {
                camera_position: position,
                camera_rotation: rotation,
                scene_offset: self.overview_offset,
            },
            dolly_out: None,
            duration: self.zoom.duration,
        }
    }

    /// Advance animations by `dt` seconds. Returns whether another frame
    /// should be drawn.
    pub fn on_frame(&mut self, dt: f32) -> bool {
        let tick = self.transition.tick(
            dt,
            &mut self.camera,
            &mut self.scene.position,
            &mut self.controls,
        );
        match tick {
            Tick::Idle => false,
            Tick::Running => {
                self.request_render();
                true
            }
            Tick::Finished(mode) => {
                tracing::debug!(?mode, "zoom complete");
                self.request_render();
                true
            }
        }
    }

    /// The camera was moved by user input
    pub fn on_controls_change(&mut self) {
        self.tooltip.clear(&mut self.resources);
        self.request_render();
    }

    /// Orbit by a pointer drag in degrees
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if self.controls.rotate(&mut self.camera, dx, dy) {
            self.on_controls_change();
        }
    }

    /// Dolly the camera; positive moves toward the target
    pub fn dolly(&mut self, delta: f32) {
        if self.controls.zoom(&mut self.camera, delta) {
            self.on_controls_change();
        }
    }

    pub fn pan(&mut self, dx: f32, dz: f32) {
        if self.controls.pan(&mut self.camera, dx, dz) {
            self.on_controls_change();
        }
    }

    /// Release every scene resource, then the tooltip. Returns the
    /// allocations that were still live after the scene was disposed.
    /// Calling it again is a no-op.
    pub fn teardown(&mut self) -> MemoryInfo {
        if self.torn_down {
            return self.resources.memory();
        }
        self.torn_down = true;

        self.pick.clear_focus(&mut self.scene, &mut self.resources);
        self.scene.clear(&mut self.resources);
        match std::mem::replace(&mut self.content, SceneContent::Empty) {
            SceneContent::Treemap { pool, .. } => pool.dispose(&mut self.resources),
            SceneContent::City { pool, .. } => pool.dispose(&mut self.resources),
            SceneContent::Empty => {}
        }

        let memory = self.resources.memory();
        if memory.geometries > BASELINE_GEOMETRIES || memory.textures > BASELINE_TEXTURES {
            tracing::warn!(?memory, "Memory leak?");
        }
        self.tooltip.dispose(&mut self.resources);
        tracing::info!("viewer torn down");
        memory
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn viewer() -> Viewer {
        Viewer::treemap(
            &fixtures::small_dataset(),
            Viewport::new(800.0, 600.0),
            &ViewerSettings::default(),
        )
    }

    #[test]
    fn test_initial_pose() {
        let v = viewer();
        assert_eq!(v.camera.position, Vec3::new(0.0, 750.0, 0.0));
        assert!((v.camera.rotation - TOP_DOWN).length() < 1e-4);
        assert_eq!(v.scene.position, Vec3::new(-477.0, 25.0, -530.0));
        assert_eq!(v.mode(), CameraMode::Overview);
        assert!(!v.is_animating());
    }

    #[test]
    fn test_describe_uses_full_name_and_value() {
        let v = viewer();
        let h = v.hierarchy().unwrap();
        let a = h.node(h.root()).children[0];
        assert_eq!(
            v.describe(Tag::Hierarchy(a)),
            Some(TooltipContent::new("root/A", "10"))
        );
        assert_eq!(v.describe(Tag::Building(shared::GridPos::new(0, 0))), None);
    }

    #[test]
    fn test_pointer_over_background_focuses_nothing() {
        let mut v = viewer();
        // Far corner of the window misses the whole treemap
        v.on_pointer_move(Vec2::new(1.0, 1.0));
        assert_eq!(v.focused(), None);
        assert_eq!(v.stats().highlight_attaches, 0);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut v = viewer();
        let memory = v.teardown();
        assert_eq!(memory, MemoryInfo::default());
        assert_eq!(v.resources.memory(), MemoryInfo::default());
        assert!(v.scene.is_empty());
        v.teardown();
    }

    #[test]
    fn test_city_description() {
        let v = Viewer::city(
            fixtures::small_city_config(),
            Viewport::new(800.0, 600.0),
            &ViewerSettings::default(),
        );
        let (&pos, building) = v.city_model().unwrap().buildings.iter().next().unwrap();
        let content = v.describe(Tag::Building(pos)).unwrap();
        assert_eq!(content.title, format!("Building {}", pos));
        assert_eq!(content.value, format!("height {}", format_value(building.height as f64)));
    }
}
