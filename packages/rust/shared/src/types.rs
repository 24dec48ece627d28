//! Core domain types for garimpo searches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GarimpoError, Result};

/// Current schema version for the embedded category snapshot format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Price cap applied when the caller does not set one. The marketplace URL
/// grammar accepts it and treats it as "no upper bound".
pub const PRICE_UNBOUNDED: u64 = i32::MAX as u64;

// ---------------------------------------------------------------------------
// CategoryCode
// ---------------------------------------------------------------------------

/// A category selector in `parent.child` form, e.g. `3.14`.
///
/// `parent` indexes a department in the category directory and `child` one of
/// its searchable subcategories. `0.0` is the sentinel for the whole
/// marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryCode {
    pub parent: u32,
    pub child: u32,
}

impl CategoryCode {
    /// The sentinel code selecting all categories.
    pub const ALL: Self = Self {
        parent: 0,
        child: 0,
    };

    pub fn new(parent: u32, child: u32) -> Self {
        Self { parent, child }
    }
}

impl Default for CategoryCode {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.parent, self.child)
    }
}

impl std::str::FromStr for CategoryCode {
    type Err = GarimpoError;

    fn from_str(s: &str) -> Result<Self> {
        let (parent, child) = s.split_once('.').ok_or_else(|| {
            GarimpoError::validation(format!("category code `{s}` is not in parent.child form"))
        })?;
        let parent = parent.trim().parse().map_err(|_| {
            GarimpoError::validation(format!("category code `{s}` has a non-numeric parent"))
        })?;
        let child = child.trim().parse().map_err(|_| {
            GarimpoError::validation(format!("category code `{s}` has a non-numeric child"))
        })?;
        Ok(Self { parent, child })
    }
}

impl TryFrom<String> for CategoryCode {
    type Error = GarimpoError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CategoryCode> for String {
    fn from(code: CategoryCode) -> String {
        code.to_string()
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// An exact listing price in reais: whole units plus cents.
///
/// Kept as integers so ordering is total and exact. A listing whose price
/// could not be read carries `Option<Price>::None` rather than a sentinel
/// value, and sorts after every priced listing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Price {
    /// Whole-real part with thousands separators already stripped.
    pub units: u64,
    /// Cents, normally `0..=99`; zero when the page shows no decimals.
    pub cents: u32,
}

impl Price {
    pub fn new(units: u64, cents: u32) -> Self {
        Self { units, cents }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.units, self.cents)
    }
}

// ---------------------------------------------------------------------------
// Search knobs
// ---------------------------------------------------------------------------

/// How the final record list is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Keep the marketplace's own ranking.
    Relevance,
    /// Cheapest first; unpriced records last.
    #[default]
    PriceAscending,
    /// Most expensive first; unpriced records still last.
    PriceDescending,
}

/// Item condition filter applied through the search URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    Any,
    New,
    Used,
}

impl Condition {
    /// Fragment appended to the search URL; empty for [`Condition::Any`].
    pub fn url_fragment(self) -> &'static str {
        match self {
            Condition::Any => "",
            Condition::New => "_ITEM*CONDITION_2230284",
            Condition::Used => "_ITEM*CONDITION_2230581",
        }
    }
}

/// Minimum seller reputation bar, `0..=5`.
///
/// Zero disables reputation checks entirely; a level `n` above zero rejects
/// sellers whose thermometer sits in the worst `n` tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MinReputation(u8);

impl MinReputation {
    /// Reputation checks disabled.
    pub const OFF: Self = Self(0);

    pub fn new(level: u8) -> Result<Self> {
        if level > 5 {
            return Err(GarimpoError::validation(format!(
                "reputation level {level} out of range 0..=5"
            )));
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn is_off(self) -> bool {
        self.0 == 0
    }
}

impl Default for MinReputation {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for MinReputation {
    type Error = GarimpoError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl From<MinReputation> for u8 {
    fn from(min_rep: MinReputation) -> u8 {
        min_rep.0
    }
}

/// Crawl pacing knob, `0..=10`.
///
/// The pause before each HTTP request is `0.5^level` seconds, so level 0
/// waits a full second and each higher level halves the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Aggressiveness(u8);

impl Aggressiveness {
    pub fn new(level: u8) -> Result<Self> {
        if level > 10 {
            return Err(GarimpoError::validation(format!(
                "aggressiveness {level} out of range 0..=10"
            )));
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Pause inserted before every HTTP request.
    pub fn delay(self) -> Duration {
        Duration::from_secs_f64(0.5_f64.powi(i32::from(self.0)))
    }
}

impl Default for Aggressiveness {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u8> for Aggressiveness {
    type Error = GarimpoError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl From<Aggressiveness> for u8 {
    fn from(aggressiveness: Aggressiveness) -> u8 {
        aggressiveness.0
    }
}

// ---------------------------------------------------------------------------
// SearchParams
// ---------------------------------------------------------------------------

/// The full set of knobs for one marketplace search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Search term. Trimmed before use; terms shorter than two characters
    /// after trimming yield an empty result without any network activity.
    pub term: String,
    /// Ordering of the final record list.
    #[serde(default)]
    pub ordering: SortOrder,
    /// Minimum seller reputation (0 disables checks).
    #[serde(default)]
    pub min_reputation: MinReputation,
    /// Category to search within (`0.0` = everything).
    #[serde(default)]
    pub category: CategoryCode,
    /// Lower price bound in whole reais.
    #[serde(default)]
    pub price_min: u64,
    /// Upper price bound in whole reais.
    #[serde(default = "default_price_max")]
    pub price_max: u64,
    /// Item condition filter.
    #[serde(default)]
    pub condition: Condition,
    /// Crawl pacing.
    #[serde(default)]
    pub aggressiveness: Aggressiveness,
}

fn default_price_max() -> u64 {
    PRICE_UNBOUNDED
}

impl SearchParams {
    /// Parameters for `term` with every other knob at its default.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    /// A copy with the price bounds put in order.
    ///
    /// Inverted bounds are swapped rather than rejected; that is the one
    /// silent correction the pipeline performs. A bound above
    /// [`PRICE_UNBOUNDED`] cannot be encoded in the marketplace URL grammar
    /// and is an error.
    pub fn normalize(&self) -> Result<Self> {
        let mut params = self.clone();
        if params.price_min > params.price_max {
            std::mem::swap(&mut params.price_min, &mut params.price_max);
        }
        if params.price_max > PRICE_UNBOUNDED {
            return Err(GarimpoError::validation(format!(
                "price bound {} above the marketplace cap {PRICE_UNBOUNDED}",
                params.price_max
            )));
        }
        Ok(params)
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            term: String::new(),
            ordering: SortOrder::default(),
            min_reputation: MinReputation::default(),
            category: CategoryCode::ALL,
            price_min: 0,
            price_max: PRICE_UNBOUNDED,
            condition: Condition::default(),
            aggressiveness: Aggressiveness::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProductRecord
// ---------------------------------------------------------------------------

/// One listing extracted from a search, every field already resolved.
///
/// Fields the page failed to yield degrade per-field: string fields to `""`,
/// the price to `None`. A record is never dropped for missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Permalink to the listing detail page.
    pub link: String,
    /// Listing title.
    pub title: String,
    /// Exact price, when the page carried a readable one.
    pub price: Option<Price>,
    /// Thumbnail URL.
    pub picture: String,
    /// Interest-free installments offered.
    pub no_interest: bool,
    /// Free shipping offered.
    pub free_shipping: bool,
    /// Discounted from a previous price.
    pub in_sale: bool,
    /// Seller passed the reputation bar (always true when checks are off).
    pub reputable: bool,
}
