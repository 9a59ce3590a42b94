//! Headless test harness for driving a [`Viewer`] programmatically.
//!
//! Wraps a viewer with a fixed-size viewport and offers helpers to point at
//! tagged objects by projecting them to screen space, trigger zoom
//! gestures, and run transitions to completion.

use glam::{Vec2, Vec3};
use shared::DatasetNode;

use crate::fixtures;
use crate::hierarchy::NodeId;
use crate::scene::city::CityConfig;
use crate::scene::{ObjectId, Tag};
use crate::state::settings::ViewerSettings;
use crate::viewer::Viewer;
use crate::viewport::camera::Viewport;
use crate::viewport::transition::TransitionError;

/// Frame step used by [`TestHarness::run_animation`] (60 fps)
pub const FRAME: f32 = 1.0 / 60.0;
const MAX_FRAMES: usize = 600;

/// Headless viewer plus input helpers
pub struct TestHarness {
    pub viewer: Viewer,
}

impl TestHarness {
    pub fn viewport() -> Viewport {
        Viewport::new(1024.0, 768.0)
    }

    /// Treemap of `data` with default settings
    pub fn treemap(data: &DatasetNode) -> Self {
        Self::treemap_with(data, &ViewerSettings::default())
    }

    pub fn treemap_with(data: &DatasetNode, settings: &ViewerSettings) -> Self {
        Self {
            viewer: Viewer::treemap(data, Self::viewport(), settings),
        }
    }

    /// Treemap of the bundled flare sample
    pub fn flare() -> Self {
        Self::treemap(&fixtures::flare_sample())
    }

    pub fn city(config: CityConfig) -> Self {
        Self {
            viewer: Viewer::city(config, Self::viewport(), &ViewerSettings::default()),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn object(&self, tag: Tag) -> Option<ObjectId> {
        self.viewer.scene.find_tagged(tag)
    }

    /// First hierarchy node called `name`
    pub fn node_named(&self, name: &str) -> Option<NodeId> {
        self.viewer
            .hierarchy()?
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| id)
    }

    /// Leaves whose rectangle has a non-empty area
    pub fn visible_leaves(&self) -> Vec<NodeId> {
        let Some(hierarchy) = self.viewer.hierarchy() else {
            return Vec::new();
        };
        hierarchy
            .iter()
            .filter(|(_, n)| n.is_leaf() && n.width() > 0.0 && n.depth_extent() > 0.0)
            .map(|(id, _)| id)
            .collect()
    }

    /// World-space center of an object's top face
    pub fn top_center(&self, object: ObjectId) -> Option<Vec3> {
        let world = self.viewer.scene.world_matrix(object)?;
        Some(world.transform_point3(Vec3::new(0.0, 0.5, 0.0)))
    }

    /// World-space center of an object's box
    pub fn world_center(&self, object: ObjectId) -> Option<Vec3> {
        let world = self.viewer.scene.world_matrix(object)?;
        Some(world.transform_point3(Vec3::ZERO))
    }

    /// Screen pixel over the top face of the object carrying `tag`
    pub fn screen_point(&self, tag: Tag) -> Option<Vec2> {
        let object = self.object(tag)?;
        let point = self.top_center(object)?;
        let (screen, _) = self.viewer.camera.project(point, &self.viewer.viewport)?;
        Some(screen)
    }

    // ── Input ─────────────────────────────────────────────────

    /// Move the pointer over `tag`. Returns whether it ended up focused.
    pub fn hover(&mut self, tag: Tag) -> bool {
        let Some(screen) = self.screen_point(tag) else {
            return false;
        };
        self.viewer.on_pointer_move(screen);
        self.viewer.focused().is_some() && self.viewer.focused() == self.object(tag)
    }

    /// Move the pointer far past the top-left corner. Looking down from
    /// either pose, the ray lands well outside the content footprint.
    pub fn hover_background(&mut self) {
        let viewport = &self.viewer.viewport;
        let far = viewport.origin - Vec2::new(viewport.width, viewport.height) * 4.0;
        self.viewer.on_pointer_move(far);
    }

    pub fn zoom(&mut self) -> Result<(), TransitionError> {
        self.viewer.on_double_click()
    }

    /// Step frames until the running transition completes. Returns the
    /// number of frames stepped.
    pub fn run_animation(&mut self) -> usize {
        let mut frames = 0;
        while self.viewer.is_animating() && frames < MAX_FRAMES {
            self.viewer.on_frame(FRAME);
            frames += 1;
        }
        frames
    }
}
