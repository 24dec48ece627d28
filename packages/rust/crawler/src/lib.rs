//! Marketplace crawling: result pagination and seller verification.
//!
//! This crate provides:
//! - [`engine`] — Paced, sequential crawler over search result pages
//! - [`reputation`] — Seller reputation checks against listing detail pages

pub mod engine;
pub mod reputation;

pub use engine::{PageCrawler, ResultPage};
pub use reputation::{ReputationPolicy, ReputationVerifier};
