mod color_mode;
mod log_level;

pub use color_mode::ColorMode;
pub use log_level::LogLevel;
