//! Seller reputation signals parsed from listing detail pages.
//!
//! Detail pages carry a "thermometer" widget grading the seller from
//! newcomer up to green. Catalog listings that pool offers from several
//! sellers show no thermometer at all; those are flagged separately so the
//! verifier can apply its own policy to them.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

// ---------------------------------------------------------------------------
// Selectors (compiled once)
// ---------------------------------------------------------------------------

static THERMOMETER_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".card-section.seller-thermometer").expect("thermometer selector")
});

static OTHER_SELLERS_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ui-pdp-other-sellers__title").expect("other-sellers selector")
});

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Seller reputation tiers, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SellerTier {
    Newcomer,
    Red,
    Orange,
    Yellow,
    LightGreen,
    Green,
}

impl SellerTier {
    /// Thermometer order, worst first.
    pub const LADDER: [SellerTier; 6] = [
        SellerTier::Newcomer,
        SellerTier::Red,
        SellerTier::Orange,
        SellerTier::Yellow,
        SellerTier::LightGreen,
        SellerTier::Green,
    ];

    /// Position on the ladder, 0 = worst.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// The class fragment the thermometer markup carries for this tier.
    fn class_marker(self) -> &'static str {
        match self {
            SellerTier::Newcomer => "newbie",
            SellerTier::Red => "red",
            SellerTier::Orange => "orange",
            SellerTier::Yellow => "yellow",
            SellerTier::LightGreen => "light_green",
            SellerTier::Green => "green",
        }
    }
}

/// What the seller thermometer on a detail page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermometerReading {
    /// No thermometer element on the page.
    Missing,
    /// Thermometer present but carrying no recognizable tier.
    Unrated,
    /// Thermometer showing a tier.
    Tier(SellerTier),
}

// ---------------------------------------------------------------------------
// Page readers
// ---------------------------------------------------------------------------

/// Read the seller thermometer from a listing detail page.
///
/// The tier rides on modifier classes somewhere in the thermometer subtree.
/// The ladder is scanned worst-first, which also resolves the `light_green`
/// vs `green` substring overlap in the right order.
pub fn read_thermometer(page: &Html) -> ThermometerReading {
    let Some(thermometer) = page.select(&THERMOMETER_SEL).next() else {
        return ThermometerReading::Missing;
    };

    let classes: Vec<&str> = thermometer
        .descendants()
        .filter_map(ElementRef::wrap)
        .flat_map(|el| el.value().classes())
        .collect();

    for tier in SellerTier::LADDER {
        if classes.iter().any(|class| class.contains(tier.class_marker())) {
            return ThermometerReading::Tier(tier);
        }
    }

    ThermometerReading::Unrated
}

/// Whether the page is a multi-seller catalog listing.
///
/// Catalog pages pool offers from several sellers and show no single
/// thermometer; the marketplace already filters who gets into the pool.
pub fn is_aggregated_listing(page: &Html) -> bool {
    page.select(&OTHER_SELLERS_SEL).next().is_some()
}
