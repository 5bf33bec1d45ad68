mod app;
mod commands;
mod effects;
mod export;
pub mod logging;
mod render;

pub use app::run;
