//! Shared types, error model, and configuration for garimpo.
//!
//! This crate is the foundation depended on by all other garimpo crates.
//! It provides:
//! - [`GarimpoError`] — the unified error type
//! - Domain types ([`SearchParams`], [`ProductRecord`], [`Price`], [`CategoryCode`])
//! - Configuration ([`AppConfig`], [`CrawlerConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlerConfig, DefaultsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{GarimpoError, Result};
pub use types::{
    Aggressiveness, CategoryCode, Condition, CURRENT_SCHEMA_VERSION, MinReputation,
    PRICE_UNBOUNDED, Price, ProductRecord, SearchParams, SortOrder,
};
