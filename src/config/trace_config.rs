use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::ext::BestEffortPathExt;
use crate::tracer::{
    DEFAULT_INCLUDE_MARKER, DEFAULT_INDENT, DEFAULT_REFERENCE_MARKER, IncludeMatcher,
};

const CONFIG_FILE_NAME: &str = "dtsi-trace.yaml";

const ROOT_KEY: &str = "root";
const INCLUDE_MARKER_KEY: &str = "include_marker";
const REFERENCE_MARKER_KEY: &str = "reference_marker";
const INDENT_KEY: &str = "indent";

pub fn get_config_file_path(directory: &Path) -> PathBuf {
    directory.join(CONFIG_FILE_NAME)
}

/// Settings read from `dtsi-trace.yaml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    pub root: Option<String>,
    pub include_marker: String,
    pub reference_marker: String,
    pub indent: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            root: None,
            include_marker: DEFAULT_INCLUDE_MARKER.to_string(),
            reference_marker: DEFAULT_REFERENCE_MARKER.to_string(),
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl TraceConfig {
    /// Reads the config for a run.
    ///
    /// An explicit path must exist. Without one, the file in `directory` is
    /// used when present and defaults otherwise.
    pub async fn read(
        directory: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, TraceConfigError> {
        match explicit {
            Some(path) => Self::from_path(path).await,
            None => {
                let path = get_config_file_path(directory);
                debug!("Reading config file: {}", path.best_effort_path_display());
                let bytes = match fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(err) if err.kind() == ErrorKind::NotFound => {
                        debug!("No config file found, using defaults");
                        return Ok(Self::default());
                    }
                    Err(err) => return Err(err).context(ReadSnafu { file_path: path }),
                };
                Self::from_bytes(&path, bytes)
            }
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, TraceConfigError> {
        debug!("Reading config file: {}", path.best_effort_path_display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.to_path_buf(),
        })?;
        Self::from_bytes(path, bytes)
    }

    fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self, TraceConfigError> {
        debug!("Successfully read config file: {} bytes", bytes.len());
        let contents = String::from_utf8(bytes).context(DecodeSnafu {
            file_path: path.to_path_buf(),
        })?;
        contents.as_str().try_into()
    }

    pub fn matcher(&self) -> IncludeMatcher {
        IncludeMatcher::new(&self.include_marker, &self.reference_marker)
    }

    fn apply_mapping(
        &mut self,
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), TraceConfigError> {
        for (key, value) in top_level {
            let Yaml::Value(Scalar::String(key)) = key else {
                warn!("Skipping non-string config key: {:?}", key);
                continue;
            };

            match &**key {
                ROOT_KEY => self.root = Some(Self::string_value(ROOT_KEY, value)?),
                INCLUDE_MARKER_KEY => {
                    self.include_marker = Self::marker_value(INCLUDE_MARKER_KEY, value)?
                }
                REFERENCE_MARKER_KEY => {
                    self.reference_marker = Self::marker_value(REFERENCE_MARKER_KEY, value)?
                }
                INDENT_KEY => self.indent = Self::string_value(INDENT_KEY, value)?,
                other => warn!("Ignoring unknown config key '{}'", other),
            }
        }
        Ok(())
    }

    fn string_value(key: &str, value: &Yaml) -> Result<String, TraceConfigError> {
        value
            .as_str()
            .map(str::to_string)
            .context(InvalidValueSnafu { key })
    }

    fn marker_value(key: &str, value: &Yaml) -> Result<String, TraceConfigError> {
        let marker = Self::string_value(key, value)?;
        ensure!(!marker.is_empty(), EmptyMarkerSnafu { key });
        Ok(marker)
    }
}

impl TryFrom<&str> for TraceConfig {
    type Error = TraceConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let mut config = Self::default();

        let Some(document) = documents.first() else {
            return Ok(config);
        };
        if let Yaml::Value(Scalar::Null) = document {
            return Ok(config);
        }

        let top_level = document
            .as_mapping()
            .ok_or(TraceConfigError::TopLevelNotMap)?;
        config.apply_mapping(top_level)?;

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum TraceConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path.best_effort_path_display()))]
    ReadError {
        file_path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path.best_effort_path_display()))]
    DecodeError {
        file_path: PathBuf,
        source: FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config key '{}' should be a string", key))]
    InvalidValue { key: String },
    #[snafu(display("Config key '{}' must not be empty", key))]
    EmptyMarker { key: String },
}
