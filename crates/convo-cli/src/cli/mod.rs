pub mod config;
pub mod dump;
pub mod render;
pub mod tracing_setup;

pub use config::CliConfig;
pub use dump::NoteDump;
pub use render::render_rows;
