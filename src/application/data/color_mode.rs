use clap::ValueEnum;
use derive_more::Display;
use supports_color::Stream;

/// When to colour the indentation markers of the traversal report.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Display)]
pub enum ColorMode {
    #[default]
    #[display("auto")]
    Auto,
    #[display("always")]
    Always,
    #[display("never")]
    Never,
}

impl ColorMode {
    pub fn should_colorize(&self) -> bool {
        match self {
            ColorMode::Auto => supports_color::on(Stream::Stdout).is_some(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}
