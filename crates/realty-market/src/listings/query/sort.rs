use std::cmp::Ordering;

use super::super::domain::Property;

/// Completion value that floats a listing to the top of "Completion Date".
pub const READY_TO_MOVE: &str = "Ready to Move";

/// Orderings offered by the browse page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    PriceLowToHigh,
    PriceHighToLow,
    NewestFirst,
    LandAreaLargeToSmall,
    CompletionDate,
    /// There is no popularity metric; keeps the incoming order.
    MostPopular,
    /// Any label we do not recognise; keeps the incoming order.
    #[default]
    Unrecognized,
}

impl SortOption {
    /// Named options in the order the browse page lists them.
    pub const fn ordered() -> [Self; 6] {
        [
            Self::PriceLowToHigh,
            Self::PriceHighToLow,
            Self::NewestFirst,
            Self::LandAreaLargeToSmall,
            Self::CompletionDate,
            Self::MostPopular,
        ]
    }

    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "Price: Low to High" => Self::PriceLowToHigh,
            "Price: High to Low" => Self::PriceHighToLow,
            "Newest First" => Self::NewestFirst,
            "Land Area: Large to Small" => Self::LandAreaLargeToSmall,
            "Completion Date" => Self::CompletionDate,
            "Most Popular" => Self::MostPopular,
            _ => Self::Unrecognized,
        }
    }

    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::PriceLowToHigh => Some("Price: Low to High"),
            Self::PriceHighToLow => Some("Price: High to Low"),
            Self::NewestFirst => Some("Newest First"),
            Self::LandAreaLargeToSmall => Some("Land Area: Large to Small"),
            Self::CompletionDate => Some("Completion Date"),
            Self::MostPopular => Some("Most Popular"),
            Self::Unrecognized => None,
        }
    }

    fn compare(self, left: &Property, right: &Property) -> Ordering {
        match self {
            Self::PriceLowToHigh => left.details.price.cmp(&right.details.price),
            Self::PriceHighToLow => right.details.price.cmp(&left.details.price),
            Self::NewestFirst => right.created_at.cmp(&left.created_at),
            Self::LandAreaLargeToSmall => land_area(right).total_cmp(&land_area(left)),
            Self::CompletionDate => ready_to_move(right).cmp(&ready_to_move(left)),
            Self::MostPopular | Self::Unrecognized => Ordering::Equal,
        }
    }
}

fn land_area(property: &Property) -> f64 {
    property.details.land_area.unwrap_or(0.0)
}

fn ready_to_move(property: &Property) -> bool {
    property.details.extras.completion_date.as_deref() == Some(READY_TO_MOVE)
}

/// Stable sort into a new sequence; the input slice is left untouched.
pub fn sort_by(properties: &[Property], option: SortOption) -> Vec<Property> {
    let mut sorted = properties.to_vec();
    sorted.sort_by(|left, right| option.compare(left, right));
    sorted
}
