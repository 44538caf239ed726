use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the shortcodes binary.
#[derive(Debug, Parser)]
#[command(
    name = "shortcodes",
    version,
    about = "Resolve shortcode configuration and bind shortcodes to handlers"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "SHORTCODES_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the resolved configuration as JSON.
    Resolve,
    /// List every declared shortcode with its binding target.
    Bindings,
    /// Invoke the handler bound to a shortcode.
    Render(RenderArgs),
    /// Delete the configuration from every cache tier.
    Purge,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Shortcode tag to expand.
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Attribute passed to the handler, as `name=value`. Repeatable.
    #[arg(long = "attr", value_name = "NAME=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,

    /// Enclosed content passed to the handler.
    #[arg(long, value_name = "TEXT")]
    pub content: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the directory the default configuration path is resolved against.
    #[arg(
        long = "base-dir",
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        global = true
    )]
    pub base_dir: Option<PathBuf>,

    /// Toggle reading from the durable cache tier.
    #[arg(
        long = "enable-durable",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub enable_durable: Option<bool>,

    /// Override the directory backing the durable cache tier.
    #[arg(
        long = "durable-dir",
        value_name = "PATH",
        value_hint = ValueHint::DirPath,
        global = true
    )]
    pub durable_dir: Option<PathBuf>,
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("attribute name is empty in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}
