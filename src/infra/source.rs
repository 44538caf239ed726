//! The source-of-truth configuration file.
//!
//! The file location comes from an override environment variable when set,
//! otherwise from a fixed path under the base directory. The format follows
//! the extension: `.toml` and `.json` are recognised, everything else is
//! parsed as YAML.

use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming an alternative configuration file.
pub const DEFAULT_OVERRIDE_ENV: &str = "SHORTCODE_YAML_FILE";
/// Location of the configuration file relative to the base directory.
pub const DEFAULT_RELATIVE_PATH: &str = ".config/shortcodes.yaml";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read configuration file `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {format} configuration file `{}`: {message}", .path.display())]
    Parse {
        path: PathBuf,
        format: SourceFormat,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Toml,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Json => "JSON",
        })
    }
}

/// Computes where the configuration file lives.
#[derive(Debug, Clone)]
pub struct SourceLocator {
    base_dir: PathBuf,
    override_location: Option<String>,
    default_relative: PathBuf,
}

impl SourceLocator {
    /// Locator rooted at `base_dir`; trailing separators are dropped.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().components().collect(),
            override_location: None,
            default_relative: PathBuf::from(DEFAULT_RELATIVE_PATH),
        }
    }

    /// Locator whose override is read from the environment variable `var`.
    pub fn from_env(base_dir: impl AsRef<Path>, var: &str) -> Self {
        Self::new(base_dir).with_override(env::var(var).ok())
    }

    /// Empty overrides are ignored.
    pub fn with_override(mut self, location: Option<String>) -> Self {
        self.override_location = location.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_default_relative(mut self, relative: impl Into<PathBuf>) -> Self {
        self.default_relative = relative.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn override_location(&self) -> Option<&str> {
        self.override_location.as_deref()
    }

    /// Resolve the configuration file path.
    ///
    /// An override naming an existing file is used verbatim. Stream-style
    /// locations (`scheme://…`) and absolute paths are also kept as they are;
    /// any other override is taken relative to the base directory.
    pub fn config_path(&self) -> PathBuf {
        match self.override_location.as_deref() {
            Some(location) => {
                let candidate = Path::new(location);
                if candidate.is_file() || candidate.is_absolute() || location.contains("://") {
                    candidate.to_path_buf()
                } else {
                    self.base_dir.join(candidate)
                }
            }
            None => self.base_dir.join(&self.default_relative),
        }
    }
}

/// Read and parse the configuration file into a generic value.
pub fn load_source(path: &Path) -> Result<Value, SourceError> {
    let contents = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let format = SourceFormat::from_path(path);
    debug!(
        target = "infra::source",
        op = "source::load",
        path = %path.display(),
        %format,
        bytes = contents.len(),
        "Parsing configuration file"
    );
    parse_source(&contents, format).map_err(|message| SourceError::Parse {
        path: path.to_path_buf(),
        format,
        message,
    })
}

fn parse_source(contents: &str, format: SourceFormat) -> Result<Value, String> {
    match format {
        SourceFormat::Yaml => serde_yaml::from_str(contents).map_err(|err| err.to_string()),
        SourceFormat::Toml => toml::from_str(contents).map_err(|err| err.to_string()),
        SourceFormat::Json => serde_json::from_str(contents).map_err(|err| err.to_string()),
    }
}
