//! Core search orchestration for garimpo.
//!
//! This crate ties category resolution, crawling, extraction, and seller
//! verification into the end-to-end [`pipeline::query`] workflow.

pub mod assembler;
pub mod pipeline;

pub use assembler::{assemble, assemble_page, sort_records};
pub use pipeline::{query, query_with_defaults};
