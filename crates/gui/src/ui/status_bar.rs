use egui::Ui;

use crate::viewer::{SceneContent, Viewer};
use crate::viewport::camera::Viewport;

pub fn show(ui: &mut Ui, viewer: Option<&Viewer>, status: &str) {
    ui.horizontal(|ui| {
        ui.weak(status);

        if let Some(viewer) = viewer {
            ui.separator();
            match viewer.content() {
                SceneContent::Treemap { hierarchy, .. } => {
                    ui.weak(format!("nodes: {}", hierarchy.len()));
                }
                SceneContent::City { city, .. } => {
                    ui.weak(format!("buildings: {}", city.buildings.len()));
                }
                SceneContent::Empty => {
                    ui.weak("no data");
                }
            }

            ui.separator();
            if viewer.is_animating() {
                ui.colored_label(egui::Color32::from_rgb(255, 200, 100), "zooming…");
            } else {
                ui.weak(format!("{:?}", viewer.mode()));
            }

            if let Some(content) = viewer.tooltip().content() {
                ui.separator();
                ui.label(format!("{}: {}", content.title, content.value));
            }

            let memory = viewer.resources.memory();
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.weak("treemap3d v0.1");
                ui.separator();
                ui.weak(format!(
                    "geometries {} · materials {} · textures {}",
                    memory.geometries, memory.materials, memory.textures
                ));
            });
        }
    });
}

/// Hint drawn when nothing is loaded yet
pub fn loading_hint(ui: &Ui, viewport: &Viewport, text: &str) {
    let center = egui::pos2(
        viewport.origin.x + viewport.width / 2.0,
        viewport.origin.y + viewport.height / 2.0,
    );
    ui.painter().text(
        center,
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(14.0),
        egui::Color32::from_rgb(100, 100, 110),
    );
}
