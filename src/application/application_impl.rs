use std::io::Write;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;
use tracing::info;

use crate::application::RuntimeConfig;
use crate::application::data::ColorMode;
use crate::config::{TraceConfig, TraceConfigError};
use crate::tracer::{IncludeTracer, ReportWriter, TraceError};

/// Root traced when neither the command line nor the config file names one.
pub const DEFAULT_ROOT: &str = "msm8996pro-pmi8996-comma-leeco.dts";

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        Self::run_with_output(app_config, std::io::stdout()).await
    }

    pub async fn run_with_output(
        app_config: impl Into<RuntimeConfig>,
        out: impl Write,
    ) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let trace_config = TraceConfig::read(&app_config.directory, app_config.config.as_deref())
            .await
            .context(TraceConfigSnafu)?;

        let root = app_config
            .root
            .as_deref()
            .or(trace_config.root.as_deref())
            .unwrap_or(DEFAULT_ROOT);
        let colorize = app_config.color.should_colorize();
        if app_config.color == ColorMode::Always {
            colored::control::set_override(true);
        }
        debug!("Tracing from root '{}' (color: {})", root, app_config.color);

        let tracer = IncludeTracer::new(&app_config.directory, trace_config.matcher());
        let mut report = ReportWriter::new(out, trace_config.indent.as_str(), colorize);

        let trace = tracer
            .trace(root, &mut report)
            .await
            .context(IncludeTraceSnafu { root })?;
        let deepest = trace.visits().iter().map(|visit| visit.depth).max();
        info!(
            "Traced {} file(s) from {}, deepest include chain: {}",
            trace.visits().len(),
            root,
            deepest.unwrap_or_default()
        );

        report.write_listing(&trace).context(OutputSnafu)?;

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    TraceConfigError { source: TraceConfigError },
    #[snafu(display("Failed to trace the includes of '{}'", root))]
    IncludeTraceError { root: String, source: TraceError },
    #[snafu(display("Failed to write the sorted listing"))]
    OutputError { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::get_config_file_path;
    use std::path::Path;
    use tempfile::TempDir;

    fn runtime_config(directory: &Path, root: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            root: root.map(str::to_string),
            directory: directory.to_path_buf(),
            config: None,
            color: ColorMode::Never,
        }
    }

    async fn run_to_string(config: RuntimeConfig) -> (Result<(), ApplicationError>, String) {
        let mut out = Vec::new();
        let result = Application::run_with_output(config, &mut out).await;
        (result, String::from_utf8(out).expect("Output is not UTF-8"))
    }

    #[compio::test]
    async fn prints_report_then_sorted_listing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("z.dts"),
            "#include \"m.dtsi\"\n#include \"b.dtsi\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("m.dtsi"), "").unwrap();
        std::fs::write(dir.path().join("b.dtsi"), "").unwrap();

        let (result, output) = run_to_string(runtime_config(dir.path(), Some("z.dts"))).await;

        assert!(result.is_ok());
        assert_eq!(
            output,
            "z.dts\n|  m.dtsi\n|  b.dtsi\n\nb.dtsi\nm.dtsi\nz.dts\n"
        );
    }

    #[compio::test]
    async fn falls_back_to_the_default_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_ROOT), "/dts-v1/;\n").unwrap();

        let (result, output) = run_to_string(runtime_config(dir.path(), None)).await;

        assert!(result.is_ok());
        assert_eq!(output, format!("{DEFAULT_ROOT}\n\n{DEFAULT_ROOT}\n"));
    }

    #[compio::test]
    async fn config_file_sets_root_and_indent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            get_config_file_path(dir.path()),
            "root: board.dts\nindent: \"  \"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("board.dts"), "#include \"soc.dtsi\"\n").unwrap();
        std::fs::write(dir.path().join("soc.dtsi"), "").unwrap();

        let (result, output) = run_to_string(runtime_config(dir.path(), None)).await;

        assert!(result.is_ok());
        assert_eq!(output, "board.dts\n  soc.dtsi\n\nboard.dts\nsoc.dtsi\n");
    }

    #[compio::test]
    async fn command_line_root_overrides_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(get_config_file_path(dir.path()), "root: board.dts\n").unwrap();
        std::fs::write(dir.path().join("other.dts"), "").unwrap();

        let (result, output) =
            run_to_string(runtime_config(dir.path(), Some("other.dts"))).await;

        assert!(result.is_ok());
        assert_eq!(output, "other.dts\n\nother.dts\n");
    }

    #[compio::test]
    async fn failed_trace_skips_the_listing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.dts"), "#include \"missing.dtsi\"\n").unwrap();

        let (result, output) = run_to_string(runtime_config(dir.path(), Some("a.dts"))).await;

        assert!(matches!(
            result,
            Err(ApplicationError::IncludeTraceError {
                source: TraceError::ReadError { .. },
                ..
            })
        ));
        assert_eq!(output, "a.dts\n|  missing.dtsi\n");
    }

    #[compio::test]
    async fn broken_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::write(get_config_file_path(dir.path()), "- not\n- a map\n").unwrap();

        let (result, output) = run_to_string(runtime_config(dir.path(), Some("a.dts"))).await;

        assert!(matches!(
            result,
            Err(ApplicationError::TraceConfigError { .. })
        ));
        assert!(output.is_empty());
    }
}
