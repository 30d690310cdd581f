use serde::{Deserialize, Serialize};
use tracing::debug;

use super::super::domain::Property;
use super::bands::{area_band, land_area_band, price_band, Band, SQFT_PER_ACRE};

/// Browse filters as chosen in the UI. Every key is optional; each may hold its
/// "Any …" sentinel, which leaves the dimension unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub bhk: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub land_area: Option<String>,
    #[serde(default, rename = "type")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    /// Construction status, e.g. "Ready to Move".
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub furnishing: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BedroomRule {
    Exactly(u32),
    AtLeast(u32),
}

impl BedroomRule {
    /// "3 BHK" means exactly three bedrooms, "4+ BHK" (or "4+") four or more.
    fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        let digits_end = trimmed
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let count = trimmed[..digits_end].parse::<u32>().ok()?;

        if trimmed[digits_end..].trim_start().starts_with('+') {
            Some(Self::AtLeast(count))
        } else {
            Some(Self::Exactly(count))
        }
    }

    fn admits(self, bedrooms: u32) -> bool {
        match self {
            Self::Exactly(count) => bedrooms == count,
            Self::AtLeast(count) => bedrooms >= count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Price(Band),
    Bedrooms(BedroomRule),
    City(String),
    Area(Band),
    LandAcres(Band),
    Kind(String),
    Developer(String),
    ConstructionStatus(String),
    Furnishing(String),
}

impl Predicate {
    fn admits(&self, property: &Property) -> bool {
        let details = &property.details;
        match self {
            Predicate::Price(band) => band.contains(details.price as f64),
            Predicate::Bedrooms(rule) => details.bedrooms.is_some_and(|count| rule.admits(count)),
            Predicate::City(city) => details
                .location
                .as_deref()
                .is_some_and(|location| location.contains(city.as_str())),
            Predicate::Area(band) => details.area.is_some_and(|area| band.contains(area)),
            Predicate::LandAcres(band) => details
                .land_area
                .is_some_and(|sqft| band.contains(sqft / SQFT_PER_ACRE)),
            Predicate::Kind(kind) => {
                details.category.label() == kind.as_str()
                    || details.listing_type.label() == kind.as_str()
            }
            Predicate::Developer(developer) => {
                details.developer.as_deref() == Some(developer.as_str())
            }
            Predicate::ConstructionStatus(status) => {
                details.extras.construction_status.as_deref() == Some(status.as_str())
            }
            Predicate::Furnishing(furnishing) => {
                details.extras.furnishing.as_deref() == Some(furnishing.as_str())
            }
        }
    }
}

/// Returns the trimmed value unless it is blank or one of the pass-through sentinels.
fn active<'a>(value: &'a Option<String>, sentinels: &[&str]) -> Option<&'a str> {
    let trimmed = value.as_deref()?.trim();
    if trimmed.is_empty()
        || sentinels
            .iter()
            .any(|sentinel| sentinel.eq_ignore_ascii_case(trimmed))
    {
        return None;
    }
    Some(trimmed)
}

fn band_or_skip(key: &str, label: &str, band: Option<Band>) -> Option<Band> {
    if band.is_none() {
        debug!(key, label, "ignoring unrecognised band label");
    }
    band
}

impl FilterSpec {
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(label) = active(&self.price, &["Any Price"]) {
            if let Some(band) = band_or_skip("price", label, price_band(label)) {
                predicates.push(Predicate::Price(band));
            }
        }

        if let Some(label) = active(&self.bhk, &["Any BHK", "BHK Type"]) {
            match BedroomRule::parse(label) {
                Some(rule) => predicates.push(Predicate::Bedrooms(rule)),
                None => debug!(label, "ignoring unrecognised bhk label"),
            }
        }

        if let Some(city) = active(&self.city, &["Any City"]) {
            predicates.push(Predicate::City(city.to_string()));
        }

        if let Some(label) = active(&self.area, &["Any Area"]) {
            if let Some(band) = band_or_skip("area", label, area_band(label)) {
                predicates.push(Predicate::Area(band));
            }
        }

        if let Some(label) = active(&self.land_area, &["Any Land Area"]) {
            if let Some(band) = band_or_skip("landArea", label, land_area_band(label)) {
                predicates.push(Predicate::LandAcres(band));
            }
        }

        if let Some(kind) = active(&self.property_type, &["all", "Any Type"]) {
            predicates.push(Predicate::Kind(kind.to_lowercase()));
        }

        if let Some(developer) = active(&self.developer, &["Any Developer"]) {
            predicates.push(Predicate::Developer(developer.to_string()));
        }

        if let Some(status) = active(&self.status, &["Any Status"]) {
            predicates.push(Predicate::ConstructionStatus(status.to_string()));
        }

        if let Some(furnishing) = active(&self.furnishing, &["Any Furnishing"]) {
            predicates.push(Predicate::Furnishing(furnishing.to_string()));
        }

        predicates
    }
}

/// Keep the properties that satisfy every active filter, preserving input order.
pub fn apply_filters(properties: &[Property], spec: &FilterSpec) -> Vec<Property> {
    let predicates = spec.predicates();
    properties
        .iter()
        .filter(|property| predicates.iter().all(|predicate| predicate.admits(property)))
        .cloned()
        .collect()
}
