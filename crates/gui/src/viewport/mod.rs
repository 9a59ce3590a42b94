//! 3D viewport panel
//!
//! Forwards egui pointer input to the [`Viewer`] handlers and paints the
//! scene with [`renderer::paint_viewport`].

mod renderer;
pub use treemap3d_lib::viewport::camera;

use egui::Ui;
use glam::Vec2;

use crate::state::settings::ControlsSettings;
use crate::viewer::Viewer;

/// World units of pan per dragged pixel, per unit of orbit distance
const PAN_SPEED: f32 = 0.0015;

/// Viewport panel owning the active viewer
#[derive(Default)]
pub struct ViewportPanel {
    viewer: Option<Viewer>,
    last_pointer: Option<egui::Pos2>,
}

impl ViewportPanel {
    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut Viewer> {
        self.viewer.as_mut()
    }

    /// Replace the active viewer. The previous one is torn down first.
    pub fn set_viewer(&mut self, viewer: Viewer) {
        self.teardown();
        self.viewer = Some(viewer);
        self.last_pointer = None;
    }

    pub fn teardown(&mut self) {
        if let Some(mut old) = self.viewer.take() {
            old.teardown();
        }
    }

    /// Size and position of the drawing surface for the next frame
    pub fn available_viewport(ui: &Ui) -> camera::Viewport {
        let rect = ui.available_rect_before_wrap();
        camera::Viewport {
            origin: Vec2::new(rect.min.x, rect.min.y),
            width: rect.width(),
            height: rect.height(),
        }
    }

    /// Handle input and paint. Returns whether another frame is needed.
    pub fn show(&mut self, ui: &mut Ui, controls: &ControlsSettings, dt: f32) -> bool {
        let (rect, response) = ui.allocate_exact_size(
            ui.available_size(),
            egui::Sense::click_and_drag(),
        );

        let Some(viewer) = self.viewer.as_mut() else {
            ui.painter_at(rect).rect_filled(rect, 0.0, egui::Color32::WHITE);
            return false;
        };

        // The panel may move when side panels open; keep screen mapping in sync
        viewer.viewport.origin = Vec2::new(rect.min.x, rect.min.y);
        if (viewer.viewport.width, viewer.viewport.height) != (rect.width(), rect.height()) {
            viewer.viewport.width = rect.width();
            viewer.viewport.height = rect.height();
            viewer.camera.aspect = viewer.viewport.aspect();
        }

        // ── Hover picking ─────────────────────────────
        let hover = response.hover_pos();
        if let Some(pos) = hover.filter(|_| hover != self.last_pointer) {
            viewer.on_pointer_move(Vec2::new(pos.x, pos.y));
        }
        self.last_pointer = hover;

        // ── Zoom gesture ──────────────────────────────
        if response.double_clicked() {
            if let Err(e) = viewer.on_double_click() {
                tracing::debug!("zoom ignored: {e}");
            }
        }

        // ── Camera controls ───────────────────────────
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            viewer.orbit(delta.x * controls.rotate_speed, delta.y * controls.rotate_speed);
        }

        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            let k = viewer.controls.distance * PAN_SPEED;
            viewer.pan(-delta.x * k, -delta.y * k);
        }

        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > 0.1 {
            viewer.dolly(scroll * controls.zoom_speed);
        }

        let animating = viewer.on_frame(dt);

        if ui.is_rect_visible(rect) {
            renderer::paint_viewport(&ui.painter_at(rect), rect, viewer);
        }
        animating
    }
}
