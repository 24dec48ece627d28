//! Listing assembly: result pages in, finished records out.
//!
//! Each listing fragment becomes one [`ProductRecord`]. Fields the markup
//! fails to yield degrade per-field (empty strings, `None` price) rather
//! than dropping the record, so a page of fifty broken listings still
//! produces fifty records.

use std::cmp::Ordering;

use scraper::Html;
use tracing::{debug, instrument};

use garimpo_crawler::{ReputationVerifier, ResultPage};
use garimpo_extract::{ListingFragment, ListingMarker, split_listings};
use garimpo_shared::{MinReputation, ProductRecord, SortOrder};

// ---------------------------------------------------------------------------
// Per-page extraction
// ---------------------------------------------------------------------------

fn record_from(fragment: &ListingFragment<'_>) -> ProductRecord {
    ProductRecord {
        link: fragment.link().unwrap_or_default(),
        title: fragment.title().unwrap_or_default(),
        price: fragment.price(),
        picture: fragment.picture().unwrap_or_default(),
        no_interest: fragment.has_marker(ListingMarker::InterestFreeInstallments),
        free_shipping: fragment.has_marker(ListingMarker::FreeShipping),
        in_sale: fragment.has_marker(ListingMarker::Discount),
        reputable: true,
    }
}

/// Extract every listing on one result page, reputation not yet checked.
///
/// The `reputable` flag starts `true`; [`assemble`] overwrites it per
/// record. Non-listing bodies (error pages, layout drift) yield no records.
pub fn assemble_page(html: &str) -> Vec<ProductRecord> {
    let page = Html::parse_document(html);
    split_listings(&page).iter().map(record_from).collect()
}

// ---------------------------------------------------------------------------
// Assembly across pages
// ---------------------------------------------------------------------------

/// Assemble records from every fetched page, in page order, verifying each
/// seller against `min_rep`.
///
/// Verification is sequential so detail-page requests stay paced like the
/// page crawl itself.
#[instrument(skip_all, fields(pages = pages.len()))]
pub async fn assemble(
    pages: &[ResultPage],
    verifier: &ReputationVerifier,
    min_rep: MinReputation,
) -> Vec<ProductRecord> {
    let mut records: Vec<ProductRecord> = Vec::new();

    for page in pages {
        let mut page_records = assemble_page(&page.html);
        debug!(offset = page.offset, listings = page_records.len(), "page assembled");

        for record in &mut page_records {
            record.reputable = verifier.verify(&record.link, min_rep).await;
        }
        records.append(&mut page_records);
    }

    records
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

fn cmp_by_price(a: &ProductRecord, b: &ProductRecord, descending: bool) -> Ordering {
    match (a.price, b.price) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            if descending {
                y.cmp(&x)
            } else {
                x.cmp(&y)
            }
        }
    }
}

/// Sort records in place. The sort is stable: listings with equal prices
/// keep their page order, and unpriced listings sort last in both price
/// directions. [`SortOrder::Relevance`] leaves the marketplace order alone.
pub fn sort_records(records: &mut [ProductRecord], ordering: SortOrder) {
    match ordering {
        SortOrder::Relevance => {}
        SortOrder::PriceAscending => records.sort_by(|a, b| cmp_by_price(a, b, false)),
        SortOrder::PriceDescending => records.sort_by(|a, b| cmp_by_price(a, b, true)),
    }
}
