mod app;
mod cli;
mod config;
mod effects;
mod host;
mod logging;
mod render;

pub use app::run_app;
