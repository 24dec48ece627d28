//! Listing field extraction and seller reputation parsing.
//!
//! This crate provides:
//! - [`listing`] — Splits result pages into [`ListingFragment`]s and extracts
//!   link, title, price, picture, and presence markers from each
//! - [`seller`] — Reads the seller thermometer and the multi-seller marker
//!   from listing detail pages
//!
//! Extraction degrades per field: markup a page fails to carry produces
//! `None`/`false` for that field alone, never an error for the listing.

pub mod listing;
pub mod seller;

pub use listing::{ListingFragment, ListingMarker, split_listings};
pub use seller::{SellerTier, ThermometerReading, is_aggregated_listing, read_thermometer};
