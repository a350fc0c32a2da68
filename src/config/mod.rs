mod trace_config;

pub use trace_config::{TraceConfig, TraceConfigError, get_config_file_path};
