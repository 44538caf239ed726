//! Resolution, binding and host registration services.

pub mod binder;
pub mod builtin;
pub mod error;
pub mod loader;
pub mod registry;
pub mod resolver;
