//! Shortcode configuration loader.
//!
//! Resolves the shortcode configuration through a tiered fetch chain (fast
//! cache → durable cache → configuration file) and binds every declared
//! shortcode to a handler from an explicit [`application::registry::HandlerRegistry`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
