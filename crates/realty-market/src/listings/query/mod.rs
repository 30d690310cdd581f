//! Pure, in-memory narrowing and ordering of listing collections for display.
//!
//! Callers run search, then filters, then sort. Every stage takes a borrowed slice and
//! returns a fresh `Vec`, so the caller's collection is never reordered in place.

pub mod bands;
mod filters;
mod search;
mod sort;

pub use bands::{Band, AREA_BANDS, LAND_AREA_BANDS, PRICE_BANDS, SQFT_PER_ACRE};
pub use filters::{apply_filters, FilterSpec};
pub use search::search_by_text;
pub(crate) use search::{matches_text, TextScope};
pub use sort::{sort_by, SortOption, READY_TO_MOVE};

use super::domain::Property;

/// Complete browse request: free text, filters and ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingQuery {
    pub text: String,
    pub filters: FilterSpec,
    pub sort: SortOption,
}

impl ListingQuery {
    pub fn apply(&self, properties: &[Property]) -> Vec<Property> {
        let searched = search_by_text(properties, &self.text);
        let filtered = apply_filters(&searched, &self.filters);
        sort_by(&filtered, self.sort)
    }
}
