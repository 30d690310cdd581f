//! Bulk listing intake from spreadsheet exports.

use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::{ListingType, PropertyCategory, PropertyDetails, PropertyDraft};

/// Separator between image URLs inside the `images` column.
const IMAGE_SEPARATOR: char = '|';

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read listing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown category '{value}'")]
    UnknownCategory { row: usize, value: String },
    #[error("row {row}: unknown listing type '{value}'")]
    UnknownListingType { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    developer: Option<String>,
    price: u64,
    category: String,
    #[serde(rename = "type")]
    listing_type: String,
    #[serde(default)]
    bedrooms: Option<u32>,
    #[serde(default)]
    bathrooms: Option<u32>,
    #[serde(default)]
    area: Option<f64>,
    #[serde(rename = "landArea", default)]
    land_area: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    images: Option<String>,
}

impl ListingRow {
    fn into_draft(self, row: usize) -> Result<PropertyDraft, ImportError> {
        let category =
            PropertyCategory::parse(&self.category).ok_or_else(|| ImportError::UnknownCategory {
                row,
                value: self.category.clone(),
            })?;
        let listing_type = ListingType::parse(&self.listing_type).ok_or_else(|| {
            ImportError::UnknownListingType {
                row,
                value: self.listing_type.clone(),
            }
        })?;

        let mut details = PropertyDetails::new(self.price, category, listing_type);
        details.title = self.title;
        details.description = self.description;
        details.location = self.location;
        details.developer = self.developer;
        details.bedrooms = self.bedrooms;
        details.bathrooms = self.bathrooms;
        details.area = self.area;
        details.land_area = self.land_area;

        let images = self
            .images
            .map(|raw| {
                raw.split(IMAGE_SEPARATOR)
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(PropertyDraft { details, images })
    }
}

/// Parse every data row into a draft. Rows are numbered from 1, excluding the header.
pub fn parse_drafts<R: Read>(reader: R) -> Result<Vec<PropertyDraft>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<ListingRow>()
        .enumerate()
        .map(|(index, record)| record?.into_draft(index + 1))
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
