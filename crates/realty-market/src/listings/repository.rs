use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::domain::{
    ActivityEntry, Property, PropertyDetails, PropertyId, PropertyPatch, PropertyStatus,
    StatusCounts, StatusFilter,
};
use super::query::{matches_text, TextScope};
use super::workflow::{review_note, TransitionPolicy};
use crate::store::{Collection, DocumentStore, FieldFilter, StoreError, StoredDocument};

/// Error enumeration for listing operations.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("sign in to continue")]
    NotAuthenticated,
    #[error("property {0} not found")]
    NotFound(PropertyId),
    #[error("{0}")]
    Validation(String),
    #[error("cannot move a {from} listing to {to}")]
    InvalidTransition {
        from: PropertyStatus,
        to: PropertyStatus,
    },
    #[error("property store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("stored property is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ListingError {
    fn from_store(error: StoreError, id: Option<&PropertyId>) -> Self {
        match (error, id) {
            (StoreError::NotFound, Some(id)) => Self::NotFound(id.clone()),
            (StoreError::NotFound, None) => {
                Self::StoreUnavailable("document vanished during write".to_string())
            }
            (StoreError::Unavailable(reason), _) => Self::StoreUnavailable(reason),
            (StoreError::Serialization(source), _) => Self::Malformed(source),
        }
    }
}

/// Durable access to listings plus their review lifecycle.
pub struct PropertyRepository<S> {
    store: Arc<S>,
    policy: TransitionPolicy,
}

impl<S> Clone for PropertyRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S> PropertyRepository<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, TransitionPolicy::default())
    }

    pub fn with_policy(store: Arc<S>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Persist a new `pending` listing owned by `owner`.
    pub async fn create(
        &self,
        details: PropertyDetails,
        images: Vec<String>,
        owner: Option<&str>,
    ) -> Result<PropertyId, ListingError> {
        let owner = owner
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .ok_or(ListingError::NotAuthenticated)?;

        let now = Utc::now();
        let property = Property {
            id: PropertyId::new(String::new()),
            details,
            images,
            status: PropertyStatus::Pending,
            admin_note: String::new(),
            submitted_by: owner.to_string(),
            submitted_on: now,
            created_at: now,
            updated_at: now,
        };

        let document = property.to_document()?;
        let id = self
            .store
            .create(Collection::Properties, document)
            .await
            .map_err(|error| ListingError::from_store(error, None))?;

        let id = PropertyId(id);
        info!(property_id = %id, owner, "property submitted for review");
        Ok(id)
    }

    /// `Ok(None)` when no listing has this id.
    pub async fn get_by_id(&self, id: &PropertyId) -> Result<Option<Property>, ListingError> {
        let document = self
            .store
            .get(Collection::Properties, id.as_str())
            .await
            .map_err(|error| ListingError::from_store(error, Some(id)))?;

        document
            .map(|data| {
                Property::from_document(StoredDocument {
                    id: id.0.clone(),
                    data,
                })
            })
            .transpose()
            .map_err(ListingError::from)
    }

    /// All listings, or only those in one status, in store order.
    pub async fn list(&self, filter: StatusFilter) -> Result<Vec<Property>, ListingError> {
        let filters = match filter {
            StatusFilter::All => Vec::new(),
            StatusFilter::Only(status) => vec![FieldFilter::equals("status", status.label())],
        };

        let documents = self
            .store
            .list(Collection::Properties, &filters)
            .await
            .map_err(|error| ListingError::from_store(error, None))?;

        debug!(count = documents.len(), ?filter, "listed properties");
        documents
            .into_iter()
            .map(|document| Property::from_document(document).map_err(ListingError::from))
            .collect()
    }

    /// Move a listing to `status`, recording `notes` as the admin note.
    ///
    /// Rejections need at least five characters of notes. Under the permissive policy the
    /// current status is not consulted.
    pub async fn update_status(
        &self,
        id: &PropertyId,
        status: PropertyStatus,
        notes: &str,
    ) -> Result<Property, ListingError> {
        let mut property = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| ListingError::NotFound(id.clone()))?;

        self.policy.check(property.status, status)?;
        let admin_note = review_note(status, notes)?;
        let now = Utc::now();

        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::from(status.label()));
        fields.insert("adminNote".to_string(), Value::from(admin_note.clone()));
        fields.insert("updatedAt".to_string(), serde_json::to_value(now)?);

        self.store
            .update(Collection::Properties, id.as_str(), fields)
            .await
            .map_err(|error| ListingError::from_store(error, Some(id)))?;

        info!(
            property_id = %id,
            from = %property.status,
            to = %status,
            "property status updated"
        );

        property.status = status;
        property.admin_note = admin_note;
        property.updated_at = now;
        Ok(property)
    }

    /// Merge `patch` into the listing and refresh `updatedAt`.
    pub async fn update(
        &self,
        id: &PropertyId,
        patch: PropertyPatch,
    ) -> Result<Property, ListingError> {
        let mut property = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| ListingError::NotFound(id.clone()))?;

        let now = Utc::now();
        patch.apply_to(&mut property);
        property.updated_at = now;

        let mut fields = patch.into_fields()?;
        fields.insert("updatedAt".to_string(), serde_json::to_value(now)?);

        self.store
            .update(Collection::Properties, id.as_str(), fields)
            .await
            .map_err(|error| ListingError::from_store(error, Some(id)))?;

        info!(property_id = %id, "property details updated");
        Ok(property)
    }

    /// Remove the listing permanently. Image URLs are external and left alone.
    pub async fn delete(&self, id: &PropertyId) -> Result<(), ListingError> {
        self.store
            .delete(Collection::Properties, id.as_str())
            .await
            .map_err(|error| ListingError::from_store(error, Some(id)))?;

        info!(property_id = %id, "property deleted");
        Ok(())
    }

    /// Case-insensitive substring search over title, description, location and developer.
    pub async fn search(
        &self,
        query: &str,
        filter: StatusFilter,
    ) -> Result<Vec<Property>, ListingError> {
        let properties = self.list(filter).await?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(properties);
        }

        Ok(properties
            .into_iter()
            .filter(|property| matches_text(property, &needle, TextScope::Descriptive))
            .collect())
    }

    /// Counts per status; zeroed when the store cannot be reached.
    pub async fn statistics(&self) -> StatusCounts {
        match self.count_by_status().await {
            Ok(counts) => counts,
            Err(error) => {
                warn!(%error, "property statistics unavailable; reporting zero counts");
                StatusCounts::default()
            }
        }
    }

    async fn count_by_status(&self) -> Result<StatusCounts, StoreError> {
        let mut counts = StatusCounts::default();
        for status in PropertyStatus::ordered() {
            let matching = self
                .store
                .list(
                    Collection::Properties,
                    &[FieldFilter::equals("status", status.label())],
                )
                .await?
                .len();

            match status {
                PropertyStatus::Pending => counts.pending = matching,
                PropertyStatus::Approved => counts.approved = matching,
                PropertyStatus::Rejected => counts.rejected = matching,
            }
        }
        counts.total = counts.pending + counts.approved + counts.rejected;
        Ok(counts)
    }

    /// Most recently updated listings, newest first; empty when the store is unreachable.
    pub async fn recent_activities(&self, limit: usize) -> Vec<ActivityEntry> {
        let mut properties = match self.list(StatusFilter::All).await {
            Ok(properties) => properties,
            Err(error) => {
                warn!(%error, "recent activity unavailable; reporting an empty feed");
                return Vec::new();
            }
        };

        properties.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
        properties
            .into_iter()
            .take(limit)
            .map(|property| ActivityEntry {
                title: property.title_or_placeholder().to_string(),
                property_id: property.id,
                status: property.status,
                at: property.updated_at,
            })
            .collect()
    }
}
