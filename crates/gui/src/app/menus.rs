//! Application menu bar

use eframe::egui;

use crate::dataset::DatasetSource;
use crate::state::ViewerSettings;
use crate::tooltip::TooltipKind;

use super::ViewKind;

/// What the user picked from a menu
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    Load(DatasetSource),
    /// Ask for a dataset URL
    PromptUrl,
    ShowTreemap,
    /// Generate a city; `true` picks a fresh seed
    ShowCity { reseed: bool },
    SetTooltip(TooltipKind),
    ZoomOut,
    SaveSettings,
    Quit,
}

pub fn file_menu(ui: &mut egui::Ui, actions: &mut Vec<MenuAction>) {
    ui.menu_button("File", |ui| {
        if ui.button("Open dataset…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open hierarchical dataset")
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                actions.push(MenuAction::Load(DatasetSource::Path(path)));
            }
        }
        if ui.button("Open URL…").clicked() {
            ui.close_menu();
            actions.push(MenuAction::PromptUrl);
        }
        if ui.button("Flare sample").clicked() {
            ui.close_menu();
            actions.push(MenuAction::Load(DatasetSource::Bundled));
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.close_menu();
            actions.push(MenuAction::Quit);
        }
    });
}

pub fn view_menu(ui: &mut egui::Ui, view: ViewKind, actions: &mut Vec<MenuAction>) {
    ui.menu_button("View", |ui| {
        if ui.radio(view == ViewKind::Treemap, "Treemap").clicked() {
            ui.close_menu();
            actions.push(MenuAction::ShowTreemap);
        }
        if ui.radio(view == ViewKind::City, "City").clicked() {
            ui.close_menu();
            actions.push(MenuAction::ShowCity { reseed: false });
        }
        if ui
            .add_enabled(view == ViewKind::City, egui::Button::new("Regenerate city"))
            .clicked()
        {
            ui.close_menu();
            actions.push(MenuAction::ShowCity { reseed: true });
        }
        ui.separator();
        if ui.button("Zoom out").clicked() {
            ui.close_menu();
            actions.push(MenuAction::ZoomOut);
        }
    });
}

pub fn settings_menu(ui: &mut egui::Ui, settings: &ViewerSettings, actions: &mut Vec<MenuAction>) {
    ui.menu_button("Settings", |ui| {
        ui.label("Tooltip");
        for (kind, label) in [(TooltipKind::Overlay, "Overlay panel"), (TooltipKind::Sprite, "Sprite")] {
            if ui.radio(settings.tooltip == kind, label).clicked() {
                ui.close_menu();
                actions.push(MenuAction::SetTooltip(kind));
            }
        }
        ui.separator();
        if ui.button("Save settings").clicked() {
            ui.close_menu();
            actions.push(MenuAction::SaveSettings);
        }
    });
}

/// URL prompt. Returns the entered URL once confirmed; `None` keeps the
/// window open, and closing it clears `input`.
pub fn url_window(ctx: &egui::Context, input: &mut Option<String>) -> Option<String> {
    let mut open = input.is_some();
    let mut submitted = None;
    if let Some(url) = input.as_mut() {
        egui::Window::new("Open URL")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let edit = ui.add(
                    egui::TextEdit::singleline(url)
                        .hint_text("https://…/flare.json")
                        .desired_width(360.0),
                );
                let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if (ui.button("Load").clicked() || enter) && !url.trim().is_empty() {
                    submitted = Some(url.trim().to_string());
                }
            });
    }
    if !open || submitted.is_some() {
        *input = None;
    }
    submitted
}
