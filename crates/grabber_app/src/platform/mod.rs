mod app;
pub mod cli;
pub mod config;
mod effects;
mod ui;
mod wizard;

pub use app::run_app;
