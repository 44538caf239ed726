//! Explicit handler registry.
//!
//! Handler types are registered by name at startup. A type exposes up to two
//! methods: `get_html`, the preferred entry point, and a generic `invoke`
//! entry point used when `get_html` is absent.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

/// Callable behind a handler method.
pub type HandlerFn = Arc<dyn Fn(&Invocation) -> String + Send + Sync>;

/// Methods a handler type can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerMethod {
    GetHtml,
    Invoke,
}

impl HandlerMethod {
    /// Lookup order used when binding a shortcode.
    pub const PRECEDENCE: [HandlerMethod; 2] = [HandlerMethod::GetHtml, HandlerMethod::Invoke];

    pub fn as_str(self) -> &'static str {
        match self {
            HandlerMethod::GetHtml => "get_html",
            HandlerMethod::Invoke => "invoke",
        }
    }
}

impl fmt::Display for HandlerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments the host passes when a shortcode is expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub content: Option<String>,
}

impl Invocation {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A named handler type and the methods it exposes.
#[derive(Clone)]
pub struct HandlerType {
    name: String,
    methods: HashMap<HandlerMethod, HandlerFn>,
}

impl HandlerType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    pub fn with_method<F>(mut self, method: HandlerMethod, handler: F) -> Self
    where
        F: Fn(&Invocation) -> String + Send + Sync + 'static,
    {
        self.methods.insert(method, Arc::new(handler));
        self
    }

    pub fn with_get_html<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation) -> String + Send + Sync + 'static,
    {
        self.with_method(HandlerMethod::GetHtml, handler)
    }

    pub fn with_invoke<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation) -> String + Send + Sync + 'static,
    {
        self.with_method(HandlerMethod::Invoke, handler)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn find_method(&self, method: HandlerMethod) -> Option<HandlerFn> {
        self.methods.get(&method).cloned()
    }

    pub fn has_method(&self, method: HandlerMethod) -> bool {
        self.methods.contains_key(&method)
    }
}

impl fmt::Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().copied().collect();
        methods.sort();
        f.debug_struct("HandlerType")
            .field("name", &self.name)
            .field("methods", &methods)
            .finish()
    }
}

/// Name → handler type lookup built at startup.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    types: HashMap<String, HandlerType>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, returning the one it replaced.
    pub fn register(&mut self, handler: HandlerType) -> Option<HandlerType> {
        self.types.insert(handler.name.clone(), handler)
    }

    pub fn with(mut self, handler: HandlerType) -> Self {
        self.register(handler);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&HandlerType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_method_returns_registered_callables() {
        let handler = HandlerType::new("Greeter").with_get_html(|inv| format!("hi {}", inv.tag));
        assert!(handler.has_method(HandlerMethod::GetHtml));
        assert!(handler.find_method(HandlerMethod::Invoke).is_none());

        let method = handler.find_method(HandlerMethod::GetHtml).expect("get_html");
        assert_eq!(method(&Invocation::new("greet")), "hi greet");
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register(HandlerType::new("A")).is_none());
        let replaced = registry.register(HandlerType::new("A").with_invoke(|_| String::new()));
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);
        assert!(
            registry
                .resolve("A")
                .expect("registered")
                .has_method(HandlerMethod::Invoke)
        );
    }

    #[test]
    fn names_are_sorted() {
        let registry = HandlerRegistry::new()
            .with(HandlerType::new("b"))
            .with(HandlerType::new("a"));
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
    }

    #[test]
    fn invocation_builder_collects_arguments() {
        let inv = Invocation::new("quote")
            .with_attribute("by", "Ada")
            .with_content("text");
        assert_eq!(inv.attribute("by"), Some("Ada"));
        assert_eq!(inv.attribute("missing"), None);
        assert_eq!(inv.content.as_deref(), Some("text"));
    }

    #[test]
    fn debug_lists_methods_in_order() {
        let handler = HandlerType::new("T")
            .with_invoke(|_| String::new())
            .with_get_html(|_| String::new());
        let rendered = format!("{handler:?}");
        assert!(rendered.contains("[GetHtml, Invoke]"), "{rendered}");
    }
}
