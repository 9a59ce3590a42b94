pub mod settings;

pub use settings::{ViewerSettings, ZoomSettings};
