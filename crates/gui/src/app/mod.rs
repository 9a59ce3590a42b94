//! Main application module

mod menus;
mod styles;

use std::time::Duration;

use eframe::egui;
use shared::DatasetNode;

use crate::dataset::{self, DatasetSource, LoadHandle};
use crate::scene::city::CityConfig;
use crate::state::ViewerSettings;
use crate::tooltip::TooltipKind;
use crate::ui::status_bar;
use crate::viewer::Viewer;
use crate::viewport::ViewportPanel;
use menus::MenuAction;

/// Which visualization is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Treemap,
    City,
}

/// Options parsed from the command line
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub source: DatasetSource,
    pub view: ViewKind,
    pub city_seed: Option<u64>,
    pub tooltip: Option<TooltipKind>,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            source: DatasetSource::Bundled,
            view: ViewKind::Treemap,
            city_seed: None,
            tooltip: None,
        }
    }
}

/// Scene waiting for the first frame that knows the viewport size
enum PendingScene {
    Treemap(DatasetNode),
    City(CityConfig),
}

pub struct TreemapApp {
    settings: ViewerSettings,
    viewport: ViewportPanel,
    view: ViewKind,
    loading: Option<LoadHandle>,
    pending: Option<PendingScene>,
    /// Last successfully loaded dataset, kept for rebuilds
    dataset: Option<DatasetNode>,
    status: String,
    url_input: Option<String>,
}

impl TreemapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: StartupOptions) -> Self {
        let mut settings = ViewerSettings::load();
        if let Some(kind) = options.tooltip {
            settings.tooltip = kind;
        }
        if let Some(seed) = options.city_seed {
            settings.city.seed = seed;
        }

        styles::configure_styles(&cc.egui_ctx);

        let mut app = Self {
            settings,
            viewport: ViewportPanel::default(),
            view: options.view,
            loading: None,
            pending: None,
            dataset: None,
            status: String::new(),
            url_input: None,
        };
        match options.view {
            ViewKind::Treemap => app.start_load(options.source),
            ViewKind::City => app.show_city(false),
        }
        app
    }

    fn start_load(&mut self, source: DatasetSource) {
        self.status = format!("Loading {}…", source.label());
        tracing::info!(source = %source.label(), "loading dataset");
        self.loading = Some(dataset::load_async(source));
    }

    /// Check on an in-flight load
    fn poll_loading(&mut self, ctx: &egui::Context) {
        let Some(handle) = &self.loading else {
            return;
        };
        let Some(result) = handle.try_recv() else {
            ctx.request_repaint_after(Duration::from_millis(100));
            return;
        };
        let label = handle.source().label();
        self.loading = None;

        match result {
            Ok(data) => {
                self.status = format!("{label}: {} nodes", data.count());
                self.view = ViewKind::Treemap;
                self.pending = Some(PendingScene::Treemap(data.clone()));
                self.dataset = Some(data);
            }
            Err(e) => {
                tracing::error!("Failed to load {label}: {e}");
                self.status = format!("Failed to load {label}: {e}");
            }
        }
    }

    fn show_city(&mut self, reseed: bool) {
        if reseed {
            self.settings.city.seed = rand::random();
        }
        self.view = ViewKind::City;
        self.status = format!("City (seed {})", self.settings.city.seed);
        self.pending = Some(PendingScene::City(self.settings.city.clone()));
    }

    /// Rebuild whatever is showing, e.g. after a settings change
    fn rebuild(&mut self) {
        match self.view {
            ViewKind::Treemap => {
                if let Some(data) = &self.dataset {
                    self.pending = Some(PendingScene::Treemap(data.clone()));
                }
            }
            ViewKind::City => self.show_city(false),
        }
    }

    fn apply(&mut self, action: MenuAction, ctx: &egui::Context) {
        match action {
            MenuAction::Load(source) => self.start_load(source),
            MenuAction::PromptUrl => self.url_input = Some(String::new()),
            MenuAction::ShowTreemap => {
                if self.dataset.is_some() {
                    self.view = ViewKind::Treemap;
                    self.rebuild();
                } else {
                    self.start_load(DatasetSource::Bundled);
                }
            }
            MenuAction::ShowCity { reseed } => self.show_city(reseed),
            MenuAction::SetTooltip(kind) => {
                if self.settings.tooltip != kind {
                    self.settings.tooltip = kind;
                    self.rebuild();
                }
            }
            MenuAction::ZoomOut => {
                if let Some(viewer) = self.viewport.viewer_mut() {
                    if let Err(e) = viewer.zoom_out() {
                        tracing::debug!("zoom out ignored: {e}");
                    }
                }
            }
            MenuAction::SaveSettings => {
                self.settings.save();
                self.status = "Settings saved".to_string();
            }
            MenuAction::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn build_pending(&mut self, ui: &egui::Ui) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let viewport = ViewportPanel::available_viewport(ui);
        let viewer = match pending {
            PendingScene::Treemap(data) => Viewer::treemap(&data, viewport, &self.settings),
            PendingScene::City(config) => Viewer::city(config, viewport, &self.settings),
        };
        self.viewport.set_viewer(viewer);
    }
}

impl eframe::App for TreemapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loading(ctx);

        // ── Menu bar ──────────────────────────────────────────
        let mut actions = Vec::new();
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut actions);
                menus::view_menu(ui, self.view, &mut actions);
                menus::settings_menu(ui, &self.settings, &mut actions);
            });
        });

        if let Some(url) = menus::url_window(ctx, &mut self.url_input) {
            actions.push(MenuAction::Load(DatasetSource::from_arg(&url)));
        }

        for action in actions {
            self.apply(action, ctx);
        }

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, self.viewport.viewer(), &self.status);
            });

        // ── Central panel: 3D viewport ───────────────────────
        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        let animating = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.build_pending(ui);
                let viewport = ViewportPanel::available_viewport(ui);
                let animating = self.viewport.show(ui, &self.settings.controls, dt);
                if self.loading.is_some() && self.viewport.viewer().is_none() {
                    status_bar::loading_hint(ui, &viewport, &self.status);
                }
                animating
            })
            .inner;

        if animating {
            ctx.request_repaint();
        }
    }
}
