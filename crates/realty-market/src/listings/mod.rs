//! Property listings: storage, review workflow, browse queries and HTTP routes.

pub mod domain;
pub mod import;
pub mod query;
pub mod repository;
pub mod router;
pub mod settings;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{
    ActivityEntry, ListingType, Property, PropertyCategory, PropertyDetails, PropertyDraft,
    PropertyExtras, PropertyId, PropertyPatch, PropertyStatus, StatusCounts, StatusFilter,
};
pub use import::{parse_drafts, ImportError};
pub use query::{apply_filters, search_by_text, sort_by, FilterSpec, ListingQuery, SortOption};
pub use repository::{ListingError, PropertyRepository};
pub use router::{listing_router, MarketplaceState};
pub use settings::{ApprovalSettings, ApprovalSettingsStore};
pub use workflow::{TransitionPolicy, MIN_REJECTION_NOTE_LEN};
