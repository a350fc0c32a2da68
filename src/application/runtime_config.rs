use std::path::PathBuf;

use crate::application::data::ColorMode;
use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: Option<String>,
    pub directory: PathBuf,
    pub config: Option<PathBuf>,
    pub color: ColorMode,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root: cli.root,
            directory: cli.directory,
            config: cli.config,
            color: cli.color,
        }
    }
}
