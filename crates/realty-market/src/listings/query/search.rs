use super::super::domain::Property;

/// Which identifying fields take part in a free-text match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextScope {
    Descriptive,
    DescriptiveAndId,
}

/// `needle` must already be trimmed and lowercased.
pub(crate) fn matches_text(property: &Property, needle: &str, scope: TextScope) -> bool {
    let details = &property.details;
    let descriptive = [
        details.title.as_deref(),
        details.location.as_deref(),
        details.description.as_deref(),
        details.developer.as_deref(),
    ];

    let id = match scope {
        TextScope::Descriptive => None,
        TextScope::DescriptiveAndId => Some(property.id.as_str()),
    };

    descriptive
        .into_iter()
        .chain(std::iter::once(id))
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Case-insensitive substring search over title, location, description, developer and id.
///
/// A blank query returns the input unchanged.
pub fn search_by_text(properties: &[Property], query: &str) -> Vec<Property> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return properties.to_vec();
    }

    properties
        .iter()
        .filter(|property| matches_text(property, &needle, TextScope::DescriptiveAndId))
        .cloned()
        .collect()
}
