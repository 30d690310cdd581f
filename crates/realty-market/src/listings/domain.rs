use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::StoredDocument;

/// Store-assigned identifier for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl PropertyId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl PropertyStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Approved, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Narrowing applied when listing properties from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PropertyStatus),
}

impl StatusFilter {
    /// `"all"` (or blank) selects everything; otherwise a status label is expected.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        PropertyStatus::parse(trimmed).map(Self::Only)
    }

    pub fn admits(self, status: PropertyStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == status,
        }
    }
}

impl From<PropertyStatus> for StatusFilter {
    fn from(value: PropertyStatus) -> Self {
        Self::Only(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyCategory {
    Apartment,
    House,
    Commercial,
    Plot,
}

impl PropertyCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Commercial => "commercial",
            Self::Plot => "plot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apartment" => Some(Self::Apartment),
            "house" => Some(Self::House),
            "commercial" => Some(Self::Commercial),
            "plot" => Some(Self::Plot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Rent => "rent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sale" => Some(Self::Sale),
            "rent" => Some(Self::Rent),
            _ => None,
        }
    }
}

/// Project-specific attributes that only some listings carry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnishing: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
}

/// Submitter-editable description of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    /// Whole currency units.
    pub price: u64,
    pub category: PropertyCategory,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    /// Built-up area in square feet.
    #[serde(default)]
    pub area: Option<f64>,
    /// Land area in square feet.
    #[serde(default)]
    pub land_area: Option<f64>,
    #[serde(default)]
    pub extras: PropertyExtras,
}

impl PropertyDetails {
    pub fn new(price: u64, category: PropertyCategory, listing_type: ListingType) -> Self {
        Self {
            title: None,
            description: None,
            location: None,
            developer: None,
            price,
            category,
            listing_type,
            bedrooms: None,
            bathrooms: None,
            area: None,
            land_area: None,
            extras: PropertyExtras::default(),
        }
    }
}

/// Submission payload: the editable details plus the external image URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    #[serde(flatten)]
    pub details: PropertyDetails,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Listing as held in the `properties` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    #[serde(flatten)]
    pub details: PropertyDetails,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: PropertyStatus,
    #[serde(default)]
    pub admin_note: String,
    pub submitted_by: String,
    pub submitted_on: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Document body without the key, which the store owns.
    pub(crate) fn to_document(&self) -> Result<Value, serde_json::Error> {
        let mut document = serde_json::to_value(self)?;
        if let Some(object) = document.as_object_mut() {
            object.remove("id");
        }
        Ok(document)
    }

    pub(crate) fn from_document(stored: StoredDocument) -> Result<Self, serde_json::Error> {
        let StoredDocument { id, mut data } = stored;
        if let Some(object) = data.as_object_mut() {
            object.insert("id".to_string(), Value::String(id));
        }
        serde_json::from_value(data)
    }

    pub fn title_or_placeholder(&self) -> &str {
        self.details
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or("Untitled listing")
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PropertyCategory>,
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub listing_type: Option<ListingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<PropertyExtras>,
}

impl PropertyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn into_fields(self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Ok(Map::new()),
        }
    }

    /// Mirror the merge the store performs so callers can return the new record.
    pub(crate) fn apply_to(&self, property: &mut Property) {
        let details = &mut property.details;
        if let Some(title) = &self.title {
            details.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            details.description = Some(description.clone());
        }
        if let Some(location) = &self.location {
            details.location = Some(location.clone());
        }
        if let Some(developer) = &self.developer {
            details.developer = Some(developer.clone());
        }
        if let Some(price) = self.price {
            details.price = price;
        }
        if let Some(category) = self.category {
            details.category = category;
        }
        if let Some(listing_type) = self.listing_type {
            details.listing_type = listing_type;
        }
        if let Some(bedrooms) = self.bedrooms {
            details.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = self.bathrooms {
            details.bathrooms = Some(bathrooms);
        }
        if let Some(area) = self.area {
            details.area = Some(area);
        }
        if let Some(land_area) = self.land_area {
            details.land_area = Some(land_area);
        }
        if let Some(extras) = &self.extras {
            details.extras = extras.clone();
        }
        if let Some(images) = &self.images {
            property.images = images.clone();
        }
    }
}

/// Aggregate counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

/// Recently touched listing, newest first on the dashboard feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub property_id: PropertyId,
    pub title: String,
    pub status: PropertyStatus,
    pub at: DateTime<Utc>,
}
