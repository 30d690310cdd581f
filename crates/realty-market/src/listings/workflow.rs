//! Review lifecycle: `pending` listings are approved or rejected by an admin.

use super::domain::PropertyStatus;
use super::repository::ListingError;

/// Shortest rejection note accepted, counted after trimming.
pub const MIN_REJECTION_NOTE_LEN: usize = 5;

/// How strictly the repository guards status transitions.
///
/// `Permissive` accepts any target status regardless of the current one, so an approved
/// listing can be sent back for re-review. `Strict` only lets `pending` listings move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permissive" => Some(Self::Permissive),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn permits(self, from: PropertyStatus, to: PropertyStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => matches!(
                (from, to),
                (
                    PropertyStatus::Pending,
                    PropertyStatus::Approved | PropertyStatus::Rejected
                )
            ),
        }
    }

    pub(crate) fn check(self, from: PropertyStatus, to: PropertyStatus) -> Result<(), ListingError> {
        if self.permits(from, to) {
            Ok(())
        } else {
            Err(ListingError::InvalidTransition { from, to })
        }
    }
}

/// Normalise the reviewer note for `target`, enforcing the rejection minimum.
pub(crate) fn review_note(target: PropertyStatus, notes: &str) -> Result<String, ListingError> {
    let trimmed = notes.trim();
    if target == PropertyStatus::Rejected && trimmed.chars().count() < MIN_REJECTION_NOTE_LEN {
        return Err(ListingError::Validation(format!(
            "rejection notes must be at least {MIN_REJECTION_NOTE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
