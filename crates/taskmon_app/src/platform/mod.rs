mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::{run_app, RunOptions};
pub use config::{AppConfig, DEFAULT_CONFIG_FILE};
pub use logging::{initialize as initialize_logging, LogDestination};

pub(crate) use config::load as load_config;
