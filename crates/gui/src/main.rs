mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::viewer`, `crate::state`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use treemap3d_lib::dataset;
pub use treemap3d_lib::scene;
pub use treemap3d_lib::state;
pub use treemap3d_lib::tooltip;
pub use treemap3d_lib::viewer;

use app::{StartupOptions, TreemapApp, ViewKind};
use dataset::DatasetSource;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treemap3d=info,treemap3d_lib=info".into()),
        )
        .init();

    let options = parse_args(std::env::args().skip(1));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("treemap3d")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "treemap3d",
        native_options,
        Box::new(move |cc| Ok(Box::new(TreemapApp::new(cc, options)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

/// `--data <path|url>`, `--city [seed]`, `--tooltip overlay|sprite`
fn parse_args(args: impl Iterator<Item = String>) -> StartupOptions {
    let mut options = StartupOptions::default();
    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data" => match args.next() {
                Some(value) => options.source = DatasetSource::from_arg(&value),
                None => tracing::warn!("--data needs a path or URL"),
            },
            "--city" => {
                options.view = ViewKind::City;
                if let Some(seed) = args.peek().and_then(|s| s.parse::<u64>().ok()) {
                    options.city_seed = Some(seed);
                    args.next();
                }
            }
            "--tooltip" => match args.next().map(|v| v.parse()) {
                Some(Ok(kind)) => options.tooltip = Some(kind),
                Some(Err(e)) => tracing::warn!("{e}"),
                None => tracing::warn!("--tooltip needs overlay or sprite"),
            },
            other => tracing::warn!("ignoring unknown argument {other}"),
        }
    }
    options
}
