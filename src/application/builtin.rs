//! Handler types shipped with the binary.

use std::fmt::Write as _;

use time::OffsetDateTime;

use super::registry::{HandlerRegistry, HandlerType, Invocation};

pub const CURRENT_YEAR: &str = "CurrentYear";
pub const ECHO: &str = "Echo";
pub const ATTRIBUTES: &str = "Attributes";

/// Registry containing every built-in handler type.
pub fn registry() -> HandlerRegistry {
    HandlerRegistry::new()
        .with(HandlerType::new(CURRENT_YEAR).with_get_html(|_| current_year()))
        .with(HandlerType::new(ECHO).with_invoke(echo))
        .with(HandlerType::new(ATTRIBUTES).with_get_html(attributes))
}

fn current_year() -> String {
    OffsetDateTime::now_utc().year().to_string()
}

fn echo(invocation: &Invocation) -> String {
    invocation.content.clone().unwrap_or_default()
}

// Attribute values are emitted verbatim; escaping belongs to the host.
fn attributes(invocation: &Invocation) -> String {
    let mut out = String::new();
    for (name, value) in &invocation.attributes {
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{name}=\"{value}\"");
    }
    out
}
