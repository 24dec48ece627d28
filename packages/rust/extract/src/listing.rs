//! Listing fragment splitting and per-field extraction.
//!
//! A result page is split into [`ListingFragment`]s, one per listing
//! container. Each field extractor works independently: a field the markup
//! fails to yield comes back as `None` (or `false` for presence markers)
//! and never disturbs the other fields.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use garimpo_shared::Price;

// ---------------------------------------------------------------------------
// Selectors and patterns (compiled once)
// ---------------------------------------------------------------------------

/// Class set carried by every listing container on a stack-layout result page.
static LISTING_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".results-item.highlighted.article.stack.product").expect("listing selector")
});

static LINK_ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".item__info-title").expect("link anchor selector"));

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".main-title").expect("title selector"));

static PRICE_CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price__container").expect("price container selector"));

static PRICE_FRACTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price__fraction").expect("price fraction selector"));

static PRICE_DECIMALS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price__decimals").expect("price decimals selector"));

static IMAGE_BOX_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".item__image.item__image--stack").expect("image box selector")
});

static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").expect("img selector"));

static INSTALLMENTS_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".item-installments.free-interest").expect("installments selector")
});

static SHIPPING_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".stack_column_item.shipping.highlighted").expect("shipping selector")
});

static DISCOUNT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".item__discount").expect("discount selector"));

/// Both permalink shapes: catalog links end in `MLB<digits>?`, standard
/// listings in `-_JM`. Greedy so tracking parameters after the id are cut.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://.+(?:MLB\d+\?|-_JM))").expect("link regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Presence-flag markers a listing may carry.
///
/// Each maps to a class set on some element inside the listing; absence of
/// the element is the legitimate negative signal, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMarker {
    /// Interest-free installment plan.
    InterestFreeInstallments,
    /// Free shipping badge.
    FreeShipping,
    /// Current price is discounted from a previous one.
    Discount,
}

impl ListingMarker {
    fn selector(self) -> &'static Selector {
        match self {
            ListingMarker::InterestFreeInstallments => &INSTALLMENTS_SEL,
            ListingMarker::FreeShipping => &SHIPPING_SEL,
            ListingMarker::Discount => &DISCOUNT_SEL,
        }
    }
}

/// One listing subtree from a result page.
///
/// Only [`split_listings`] constructs these, so holding one witnesses that
/// the wrapped element is a listing container rather than arbitrary markup.
#[derive(Debug, Clone, Copy)]
pub struct ListingFragment<'a> {
    element: ElementRef<'a>,
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Split a result page into its listing fragments.
///
/// Pages without listing containers (error bodies, layout drift) yield an
/// empty vec.
pub fn split_listings(page: &Html) -> Vec<ListingFragment<'_>> {
    page.select(&LISTING_SEL)
        .map(|element| ListingFragment { element })
        .collect()
}

// ---------------------------------------------------------------------------
// Field extractors
// ---------------------------------------------------------------------------

impl<'a> ListingFragment<'a> {
    /// The listing's permalink, cut down to its stable form.
    ///
    /// The raw href carries tracking parameters; only the part up to the
    /// `MLB<digits>` catalog id or the `-_JM` permalink suffix is kept.
    pub fn link(&self) -> Option<String> {
        let anchor = self.element.select(&LINK_ANCHOR_SEL).next()?;
        let href = anchor.value().attr("href")?.trim();
        let matched = LINK_RE.find(href)?.as_str();
        Some(matched.strip_suffix('?').unwrap_or(matched).to_string())
    }

    /// The listing title, whitespace-trimmed.
    pub fn title(&self) -> Option<String> {
        let el = self.element.select(&TITLE_SEL).next()?;
        let title = el.text().collect::<String>().trim().to_string();
        (!title.is_empty()).then_some(title)
    }

    /// The exact price, when the fragment carries a readable one.
    ///
    /// The fraction node shows whole reais with `.` as a thousands separator
    /// (`4.629` is 4629 reais); the decimals node is absent on whole prices.
    pub fn price(&self) -> Option<Price> {
        let container = self.element.select(&PRICE_CONTAINER_SEL).next()?;
        let fraction = container.select(&PRICE_FRACTION_SEL).next()?;
        let units = fraction
            .text()
            .collect::<String>()
            .trim()
            .replace('.', "")
            .parse()
            .ok()?;

        let cents = container
            .select(&PRICE_DECIMALS_SEL)
            .next()
            .and_then(|el| el.text().collect::<String>().trim().parse().ok())
            .unwrap_or(0);

        Some(Price::new(units, cents))
    }

    /// The thumbnail URL, falling back to the lazy-load attribute.
    pub fn picture(&self) -> Option<String> {
        let image_box = self.element.select(&IMAGE_BOX_SEL).next()?;
        let img = image_box.select(&IMG_SEL).next()?;
        let src = img
            .value()
            .attr("src")
            .filter(|s| !s.trim().is_empty())
            .or_else(|| img.value().attr("data-src").filter(|s| !s.trim().is_empty()))?;
        Some(src.to_string())
    }

    /// Whether some element inside the fragment carries `marker`'s class set.
    pub fn has_marker(&self, marker: ListingMarker) -> bool {
        self.element.select(marker.selector()).next().is_some()
    }
}
