//! Binds declared shortcodes to handler callables.
//!
//! For each `(shortcode, specifier)` pair the binder looks for a handler type
//! named exactly `specifier`, then for `namespace + separator + specifier`.
//! On the resolved type it prefers `get_html` over `invoke`. Anything that
//! does not resolve is bound to a stand-in that reports the missing handler,
//! so every declared shortcode ends up with a callable.

use std::{collections::BTreeMap, fmt, sync::Arc};

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::configuration::Configuration;

use super::registry::{HandlerFn, HandlerMethod, HandlerRegistry, HandlerType, Invocation};

/// Separator joining a namespace and an unqualified specifier.
pub const DEFAULT_NAMESPACE_SEPARATOR: &str = "\\";

const METRIC_BINDING_TOTAL: &str = "shortcodes_binding_total";

/// Text produced by the stand-in bound to unresolvable shortcodes.
///
/// The shortcode name is embedded verbatim; escaping belongs to the host's
/// rendering layer.
pub fn missing_handler_message(shortcode: &str) -> String {
    format!("Could not find a handler for the shortcode [{shortcode}]")
}

/// What a shortcode ended up bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingTarget {
    Method {
        type_name: String,
        method: HandlerMethod,
    },
    Fallback,
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingTarget::Method { type_name, method } => write!(f, "{type_name}::{method}"),
            BindingTarget::Fallback => f.write_str("<missing handler>"),
        }
    }
}

/// A shortcode bound to a callable.
#[derive(Clone)]
pub struct BoundHandler {
    shortcode: String,
    target: BindingTarget,
    handler: HandlerFn,
}

impl BoundHandler {
    fn method(
        shortcode: &str,
        handler_type: &HandlerType,
        method: HandlerMethod,
        handler: HandlerFn,
    ) -> Self {
        Self {
            shortcode: shortcode.to_string(),
            target: BindingTarget::Method {
                type_name: handler_type.name().to_string(),
                method,
            },
            handler,
        }
    }

    /// Stand-in whose output depends only on the shortcode name.
    pub fn fallback(shortcode: &str) -> Self {
        let message = missing_handler_message(shortcode);
        Self {
            shortcode: shortcode.to_string(),
            target: BindingTarget::Fallback,
            handler: Arc::new(move |_: &Invocation| message.clone()),
        }
    }

    pub fn shortcode(&self) -> &str {
        &self.shortcode
    }

    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    pub fn is_fallback(&self) -> bool {
        self.target == BindingTarget::Fallback
    }

    pub fn call(&self, invocation: &Invocation) -> String {
        (self.handler)(invocation)
    }
}

impl fmt::Debug for BoundHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHandler")
            .field("shortcode", &self.shortcode)
            .field("target", &self.target)
            .finish()
    }
}

/// Shortcode name → bound handler.
pub type Bindings = BTreeMap<String, BoundHandler>;

/// Resolves configuration entries against a [`HandlerRegistry`].
#[derive(Debug, Clone)]
pub struct HandlerBinder {
    registry: Arc<HandlerRegistry>,
    separator: String,
}

impl HandlerBinder {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            separator: DEFAULT_NAMESPACE_SEPARATOR.to_string(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Bind every declared shortcode. Never fails; a configuration without a
    /// `shortcodes` mapping yields no bindings.
    pub fn bind(&self, config: &Configuration) -> Bindings {
        let namespace = config.namespace();
        config
            .entries()
            .map(|(shortcode, specifier)| {
                let bound = self.bind_entry(namespace, shortcode, specifier);
                (shortcode.to_string(), bound)
            })
            .collect()
    }

    /// Bind a single entry. `specifier` is `None` when the configured value is
    /// not a string.
    pub fn bind_entry(
        &self,
        namespace: &str,
        shortcode: &str,
        specifier: Option<&str>,
    ) -> BoundHandler {
        let resolved = specifier.and_then(|specifier| self.resolve_type(namespace, specifier));

        let bound = resolved.and_then(|handler_type| {
            HandlerMethod::PRECEDENCE.iter().find_map(|&method| {
                handler_type
                    .find_method(method)
                    .map(|handler| BoundHandler::method(shortcode, handler_type, method, handler))
            })
        });

        match bound {
            Some(bound) => {
                debug!(
                    target = "application::binder",
                    op = "binder::bind_entry",
                    shortcode,
                    handler = %bound.target(),
                    "Bound shortcode"
                );
                if let BindingTarget::Method { method, .. } = bound.target() {
                    counter!(METRIC_BINDING_TOTAL, "outcome" => method.as_str()).increment(1);
                }
                bound
            }
            None => {
                warn!(
                    target = "application::binder",
                    op = "binder::bind_entry",
                    shortcode,
                    specifier = specifier.unwrap_or("<non-string>"),
                    namespace,
                    type_found = resolved.is_some(),
                    "No handler found for shortcode; binding fallback"
                );
                counter!(METRIC_BINDING_TOTAL, "outcome" => "fallback").increment(1);
                BoundHandler::fallback(shortcode)
            }
        }
    }

    fn resolve_type(&self, namespace: &str, specifier: &str) -> Option<&HandlerType> {
        if let Some(handler_type) = self.registry.resolve(specifier) {
            return Some(handler_type);
        }
        if namespace.is_empty() {
            return None;
        }
        let qualified = format!("{namespace}{}{specifier}", self.separator);
        self.registry.resolve(&qualified)
    }
}
