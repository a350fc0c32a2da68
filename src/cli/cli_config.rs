use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{ColorMode, LogLevel};

/// Prints the include tree of a device-tree source file, then every visited
/// file in sorted order.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Root .dts file, relative to the directory
    pub root: Option<String>,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Directory include paths are resolved against
    #[clap(long, short = 'C', default_value = ".")]
    pub directory: PathBuf,

    /// Config file to use instead of <DIRECTORY>/dtsi-trace.yaml
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_uses_defaults() {
        let cli = Cli::try_parse_from(["dtsi-trace"]).unwrap();
        assert_eq!(cli.root, None);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.directory, PathBuf::from("."));
        assert_eq!(cli.config, None);
        assert_eq!(cli.color, ColorMode::Auto);
    }

    #[test]
    fn all_arguments_are_parsed() {
        let cli = Cli::try_parse_from([
            "dtsi-trace",
            "board.dts",
            "-C",
            "arch/arm/boot/dts/qcom",
            "--config",
            "trace.yaml",
            "--log-level",
            "debug",
            "--color",
            "never",
        ])
        .unwrap();
        assert_eq!(cli.root.as_deref(), Some("board.dts"));
        assert_eq!(cli.directory, PathBuf::from("arch/arm/boot/dts/qcom"));
        assert_eq!(cli.config, Some(PathBuf::from("trace.yaml")));
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.color, ColorMode::Never);
    }
}
