//! Application style configuration

use eframe::egui;

/// Light theme to match the white scene background
pub fn configure_styles(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals = egui::Visuals::light();

    style.visuals.window_corner_radius = egui::CornerRadius::same(6);
    style.visuals.menu_corner_radius = egui::CornerRadius::same(4);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(3);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(3);

    style.spacing.item_spacing = egui::vec2(6.0, 4.0);
    style.spacing.button_padding = egui::vec2(6.0, 3.0);
    style.spacing.menu_margin = egui::Margin::same(4);

    style.visuals.panel_fill = egui::Color32::from_rgb(246, 246, 248);
    style.visuals.selection.bg_fill = egui::Color32::from_rgb(214, 39, 40);

    style.text_styles.insert(
        egui::TextStyle::Small,
        egui::FontId::proportional(11.0),
    );

    ctx.set_style(style);
}
