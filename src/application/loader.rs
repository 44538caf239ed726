//! Resolve-then-bind facade and host registration.

use std::{collections::BTreeMap, sync::Arc};

use tracing::info;

use crate::cache::{CacheConfig, FileCache, MemoryCache};
use crate::config::Settings;
use crate::domain::configuration::Configuration;
use crate::infra::source::SourceLocator;

use super::binder::{Bindings, BoundHandler, HandlerBinder};
use super::registry::{HandlerRegistry, Invocation};
use super::resolver::ConfigResolver;

/// Whatever system ultimately invokes shortcode handlers.
pub trait ShortcodeHost {
    fn add_shortcode(&mut self, tag: &str, handler: BoundHandler);
}

/// In-memory host: tag → handler.
#[derive(Debug, Clone, Default)]
pub struct ShortcodeTable {
    handlers: BTreeMap<String, BoundHandler>,
}

impl ShortcodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &str) -> Option<&BoundHandler> {
        self.handlers.get(tag)
    }

    /// Invoke the handler registered for `tag`, if any.
    pub fn render(&self, tag: &str, invocation: &Invocation) -> Option<String> {
        self.handlers.get(tag).map(|handler| handler.call(invocation))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl ShortcodeHost for ShortcodeTable {
    fn add_shortcode(&mut self, tag: &str, handler: BoundHandler) {
        self.handlers.insert(tag.to_string(), handler);
    }
}

/// Couples a [`ConfigResolver`] with a [`HandlerBinder`].
#[derive(Debug, Clone)]
pub struct ShortcodeLoader {
    resolver: ConfigResolver,
    binder: HandlerBinder,
}

impl ShortcodeLoader {
    pub fn new(resolver: ConfigResolver, binder: HandlerBinder) -> Self {
        Self { resolver, binder }
    }

    /// Build the tiers, locator and binder described by `settings`.
    ///
    /// The durable tier is always attached so that source hits keep it warm
    /// and purges clear it; `cache.enable_durable` only controls whether it is
    /// read during resolution. Its directory is not touched until first use,
    /// so an unusable `cache.durable_dir` only degrades that tier.
    pub fn from_settings(settings: &Settings, registry: Arc<HandlerRegistry>) -> Self {
        let cache_config = CacheConfig::from(&settings.cache);
        let fast = Arc::new(MemoryCache::from_config(&cache_config));
        let durable = Arc::new(FileCache::new(cache_config.durable_dir.clone()));

        let locator =
            SourceLocator::from_env(&settings.source.base_dir, &settings.source.override_env)
                .with_default_relative(settings.source.default_relative.clone());

        let resolver = ConfigResolver::new(fast, locator)
            .with_durable(durable, cache_config.enable_durable)
            .with_keys(cache_config.keys());
        let binder =
            HandlerBinder::new(registry).with_separator(settings.binding.separator.clone());

        Self::new(resolver, binder)
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn binder(&self) -> &HandlerBinder {
        &self.binder
    }

    pub fn config(&self) -> Configuration {
        self.resolver.resolve()
    }

    pub fn create_bindings(&self) -> Bindings {
        self.binder.bind(&self.config())
    }

    /// Register every binding with `host`, returning how many were registered.
    pub fn register_all<H>(&self, host: &mut H) -> usize
    where
        H: ShortcodeHost + ?Sized,
    {
        let bindings = self.create_bindings();
        let count = bindings.len();
        for (tag, handler) in bindings {
            host.add_shortcode(&tag, handler);
        }
        info!(
            target = "application::loader",
            op = "loader::register_all",
            registered = count,
            "Registered shortcodes"
        );
        count
    }
}
