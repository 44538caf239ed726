//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::binder::DEFAULT_NAMESPACE_SEPARATOR;
use crate::cache::{
    DEFAULT_DURABLE_DIR, DEFAULT_DURABLE_KEY, DEFAULT_FAST_KEY, DEFAULT_MEMORY_CAPACITY,
};
use crate::infra::source::{DEFAULT_OVERRIDE_ENV, DEFAULT_RELATIVE_PATH};

mod cli;

pub use cli::{CliArgs, Command, GlobalOverrides, RenderArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "shortcodes";
const ENV_PREFIX: &str = "SHORTCODES";
const DEFAULT_BASE_DIR: &str = ".";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub source: SourceSettings,
    pub cache: CacheSettings,
    pub binding: BindingSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_dir: PathBuf,
    /// Environment variable that may point at the configuration file.
    pub override_env: String,
    /// Location of the configuration file relative to `base_dir`.
    pub default_relative: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub fast_key: String,
    pub durable_key: String,
    pub memory_capacity: usize,
    pub enable_durable: bool,
    pub durable_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BindingSettings {
    pub separator: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings {
                level: LevelFilter::INFO,
                format: LogFormat::Compact,
            },
            source: SourceSettings {
                base_dir: PathBuf::from(DEFAULT_BASE_DIR),
                override_env: DEFAULT_OVERRIDE_ENV.to_string(),
                default_relative: PathBuf::from(DEFAULT_RELATIVE_PATH),
            },
            cache: CacheSettings {
                fast_key: DEFAULT_FAST_KEY.to_string(),
                durable_key: DEFAULT_DURABLE_KEY.to_string(),
                memory_capacity: DEFAULT_MEMORY_CAPACITY,
                enable_durable: false,
                durable_dir: PathBuf::from(DEFAULT_DURABLE_DIR),
            },
            binding: BindingSettings {
                separator: DEFAULT_NAMESPACE_SEPARATOR.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    source: RawSourceSettings,
    cache: RawCacheSettings,
    binding: RawBindingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(base_dir) = overrides.base_dir.as_ref() {
            self.source.base_dir = Some(base_dir.clone());
        }
        if let Some(enable) = overrides.enable_durable {
            self.cache.enable_durable = Some(enable);
        }
        if let Some(dir) = overrides.durable_dir.as_ref() {
            self.cache.durable_dir = Some(dir.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            source,
            cache,
            binding,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let source = build_source_settings(source)?;
        let cache = build_cache_settings(cache)?;
        let binding = build_binding_settings(binding)?;

        Ok(Self {
            logging,
            source,
            cache,
            binding,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    let base_dir = source
        .base_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));

    let override_env = match source.override_env {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(LoadError::invalid(
                    "source.override_env",
                    "variable name must not be empty",
                ));
            }
            if name.contains('=') || name.contains('\0') {
                return Err(LoadError::invalid(
                    "source.override_env",
                    format!("`{name}` is not a valid environment variable name"),
                ));
            }
            name
        }
        None => DEFAULT_OVERRIDE_ENV.to_string(),
    };

    let default_relative = source
        .default_relative
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RELATIVE_PATH));
    if default_relative.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "source.default_relative",
            "path must not be empty",
        ));
    }
    if default_relative.is_absolute() {
        return Err(LoadError::invalid(
            "source.default_relative",
            "path must be relative to source.base_dir",
        ));
    }

    Ok(SourceSettings {
        base_dir,
        override_env,
        default_relative,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let fast_key = non_empty_key(cache.fast_key, DEFAULT_FAST_KEY, "cache.fast_key")?;
    let durable_key = non_empty_key(cache.durable_key, DEFAULT_DURABLE_KEY, "cache.durable_key")?;

    // Zero is accepted and clamped to one by the fast tier.
    let memory_capacity = match cache.memory_capacity {
        Some(value) => usize::try_from(value).map_err(|_| {
            LoadError::invalid(
                "cache.memory_capacity",
                "value exceeds supported range for usize",
            )
        })?,
        None => DEFAULT_MEMORY_CAPACITY,
    };

    let durable_dir = cache
        .durable_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DURABLE_DIR));
    if durable_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "cache.durable_dir",
            "path must not be empty",
        ));
    }

    Ok(CacheSettings {
        fast_key,
        durable_key,
        memory_capacity,
        enable_durable: cache.enable_durable.unwrap_or(false),
        durable_dir,
    })
}

fn build_binding_settings(binding: RawBindingSettings) -> Result<BindingSettings, LoadError> {
    let separator = binding
        .separator
        .unwrap_or_else(|| DEFAULT_NAMESPACE_SEPARATOR.to_string());
    if separator.is_empty() {
        return Err(LoadError::invalid(
            "binding.separator",
            "separator must not be empty",
        ));
    }
    Ok(BindingSettings { separator })
}

fn non_empty_key(
    value: Option<String>,
    default: &str,
    key: &'static str,
) -> Result<String, LoadError> {
    match value {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(LoadError::invalid(key, "cache key must not be empty"));
            }
            Ok(trimmed.to_string())
        }
        None => Ok(default.to_string()),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    base_dir: Option<PathBuf>,
    override_env: Option<String>,
    default_relative: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    fast_key: Option<String>,
    durable_key: Option<String>,
    memory_capacity: Option<u64>,
    enable_durable: Option<bool>,
    durable_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBindingSettings {
    separator: Option<String>,
}
