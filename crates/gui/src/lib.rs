// Library crate: exposes the headless viewer core for integration tests.
// GUI-specific modules (app, ui, viewport panel and painter) remain in the binary crate.

pub mod dataset;
pub mod fixtures;
pub mod harness;
pub mod helpers;
pub mod hierarchy;
pub mod highlight;
pub mod layout;
pub mod scene;
pub mod state;
pub mod tooltip;
pub mod viewer;

/// Camera, controls, picking and transitions. The egui panel and painter
/// stay in the binary crate.
pub mod viewport {
    pub mod camera;
    pub mod controls;
    pub mod picking;
    pub mod transition;
    pub mod tween;
}
