use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use shortcodes::{
    application::{
        builtin,
        error::AppError,
        loader::{ShortcodeLoader, ShortcodeTable},
        registry::Invocation,
    },
    config::{self, Command, RenderArgs},
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_application_error(&error);
            error.exit_code()
        }
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(source = report.source, error = %report.joined(), "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(source = report.source, error = %report.joined(), "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    let registry = Arc::new(builtin::registry());
    let loader = ShortcodeLoader::from_settings(&settings, registry);

    match cli_args.command.unwrap_or(Command::Resolve) {
        Command::Resolve => run_resolve(&loader),
        Command::Bindings => run_bindings(&loader),
        Command::Render(args) => run_render(&loader, args),
        Command::Purge => run_purge(&loader),
    }
}

fn run_resolve(loader: &ShortcodeLoader) -> Result<(), AppError> {
    let resolution = loader.resolver().resolve_detailed();
    let rendered = serde_json::to_string_pretty(&resolution.config.as_value())
        .map_err(|err| AppError::unexpected(format!("failed to encode configuration: {err}")))?;
    write_stdout(&rendered)
}

fn run_bindings(loader: &ShortcodeLoader) -> Result<(), AppError> {
    let bindings = loader.create_bindings();
    let mut lines = String::new();
    for (shortcode, handler) in &bindings {
        lines.push_str(&format!("{shortcode}\t{}\n", handler.target()));
    }
    write_stdout(lines.trim_end())
}

fn run_render(loader: &ShortcodeLoader, args: RenderArgs) -> Result<(), AppError> {
    let mut table = ShortcodeTable::new();
    loader.register_all(&mut table);

    let RenderArgs {
        tag,
        attributes,
        content,
    } = args;
    let mut invocation = Invocation::new(tag.clone());
    for (name, value) in attributes {
        invocation = invocation.with_attribute(name, value);
    }
    if let Some(content) = content {
        invocation = invocation.with_content(content);
    }

    let output = table
        .render(&tag, &invocation)
        .ok_or(AppError::UnknownShortcode(tag))?;
    write_stdout(&output)
}

fn run_purge(loader: &ShortcodeLoader) -> Result<(), AppError> {
    loader.resolver().purge();
    info!(
        target = "shortcodes::cli",
        op = "cli::purge",
        fast_key = %loader.resolver().keys().fast,
        durable_key = %loader.resolver().keys().durable,
        "Purged cached configuration"
    );
    Ok(())
}

fn write_stdout(text: &str) -> Result<(), AppError> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").map_err(InfraError::from)?;
    stdout.flush().map_err(InfraError::from)?;
    Ok(())
}
