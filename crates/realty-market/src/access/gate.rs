use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::cache::RoleCache;
use super::identity::{AuthProvider, AuthSubscription, Identity, Role};
use crate::listings::{
    ActivityEntry, ApprovalSettings, ApprovalSettingsStore, ListingError, ListingQuery, Property,
    PropertyDraft, PropertyId, PropertyPatch, PropertyRepository, PropertyStatus, StatusCounts,
    StatusFilter,
};
use crate::store::{Collection, DocumentStore, StoreError};

/// Refusals raised before a request reaches the repository, plus what the repository raised.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("sign in to continue")]
    NotAuthenticated,
    #[error("not permitted: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error("settings unavailable: {0}")]
    Settings(#[from] StoreError),
}

/// Identity together with the role and admin flag derived for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub identity: Identity,
    pub role: Role,
    pub is_admin: bool,
}

impl Principal {
    pub fn uid(&self) -> &str {
        &self.identity.uid
    }

    pub fn may_manage(&self, property: &Property) -> bool {
        self.is_admin || property.submitted_by == self.identity.uid
    }
}

/// Resolves the current principal and guards mutating listing operations.
pub struct AccessGate<S, A> {
    repository: PropertyRepository<S>,
    settings: ApprovalSettingsStore<S>,
    auth: Arc<A>,
    cache: Arc<dyn RoleCache>,
}

impl<S, A> AccessGate<S, A>
where
    S: DocumentStore + 'static,
    A: AuthProvider + 'static,
{
    pub fn new(repository: PropertyRepository<S>, auth: Arc<A>, cache: Arc<dyn RoleCache>) -> Self {
        let settings = ApprovalSettingsStore::new(Arc::clone(repository.store()));
        Self {
            repository,
            settings,
            auth,
            cache,
        }
    }

    pub fn repository(&self) -> &PropertyRepository<S> {
        &self.repository
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.auth.current_identity()
    }

    /// True iff `admins/{uid}` exists. Store failures deny.
    pub async fn is_admin(&self, uid: &str) -> bool {
        match self.repository.store().get(Collection::Admins, uid).await {
            Ok(marker) => marker.is_some(),
            Err(error) => {
                warn!(uid, %error, "admin lookup failed; treating user as non-admin");
                false
            }
        }
    }

    /// Role from `users/{uid}`, falling back to the cached role when the store is down and
    /// to buyer when nothing is known.
    pub async fn role_of(&self, uid: &str) -> Role {
        match self.repository.store().get(Collection::Users, uid).await {
            Ok(Some(profile)) => {
                let role = profile
                    .get("userType")
                    .and_then(|value| value.as_str())
                    .and_then(Role::parse)
                    .unwrap_or_default();
                self.cache.set(uid, role);
                role
            }
            Ok(None) => {
                debug!(uid, "no user profile; defaulting to buyer");
                Role::default()
            }
            Err(error) => {
                self.cache.mark_stale(uid);
                let cached = self.cache.get(uid);
                warn!(
                    uid,
                    %error,
                    cached = cached.is_some(),
                    "role lookup failed; using last known role"
                );
                cached.map(|entry| entry.role).unwrap_or_default()
            }
        }
    }

    async fn resolve(&self, identity: Identity) -> Principal {
        let role = self.role_of(&identity.uid).await;
        let is_admin = self.is_admin(&identity.uid).await;
        Principal {
            identity,
            role,
            is_admin,
        }
    }

    /// `None` when nobody is signed in.
    pub async fn principal(&self) -> Option<Principal> {
        match self.current_identity() {
            Some(identity) => Some(self.resolve(identity).await),
            None => None,
        }
    }

    /// Wait for the next sign-in/sign-out and re-derive role and admin status.
    ///
    /// Returns `None` once the subscription has closed, `Some(None)` on sign-out.
    pub async fn watch(&self, subscription: &mut AuthSubscription) -> Option<Option<Principal>> {
        let change = subscription.changed().await?;
        Some(match change {
            Some(identity) => Some(self.resolve(identity).await),
            None => None,
        })
    }

    async fn require_principal(&self) -> Result<Principal, AccessError> {
        self.principal().await.ok_or(AccessError::NotAuthenticated)
    }

    async fn require_admin(&self) -> Result<Principal, AccessError> {
        let principal = self.require_principal().await?;
        if principal.is_admin {
            Ok(principal)
        } else {
            Err(AccessError::Forbidden("admin rights required".to_string()))
        }
    }

    async fn require_manager(&self, id: &PropertyId) -> Result<Principal, AccessError> {
        let principal = self.require_principal().await?;
        let property = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ListingError::NotFound(id.clone()))?;

        if principal.may_manage(&property) {
            Ok(principal)
        } else if property.status != PropertyStatus::Approved {
            Err(ListingError::NotFound(id.clone()).into())
        } else {
            Err(AccessError::Forbidden(
                "only the owner or an admin may change this listing".to_string(),
            ))
        }
    }

    /// Submit a listing owned by the signed-in user.
    pub async fn submit(&self, draft: PropertyDraft) -> Result<PropertyId, AccessError> {
        let identity = self.current_identity();
        let owner = identity.as_ref().map(|identity| identity.uid.as_str());
        let PropertyDraft { details, images } = draft;
        Ok(self.repository.create(details, images, owner).await?)
    }

    pub async fn approve(&self, id: &PropertyId, notes: &str) -> Result<Property, AccessError> {
        self.review(id, PropertyStatus::Approved, notes).await
    }

    pub async fn reject(&self, id: &PropertyId, notes: &str) -> Result<Property, AccessError> {
        self.review(id, PropertyStatus::Rejected, notes).await
    }

    /// Admin-only status change to any target.
    pub async fn review(
        &self,
        id: &PropertyId,
        status: PropertyStatus,
        notes: &str,
    ) -> Result<Property, AccessError> {
        let principal = self.require_admin().await?;
        debug!(reviewer = principal.uid(), property_id = %id, %status, "review requested");
        Ok(self.repository.update_status(id, status, notes).await?)
    }

    pub async fn edit(&self, id: &PropertyId, patch: PropertyPatch) -> Result<Property, AccessError> {
        self.require_manager(id).await?;
        Ok(self.repository.update(id, patch).await?)
    }

    pub async fn remove(&self, id: &PropertyId) -> Result<(), AccessError> {
        self.require_manager(id).await?;
        Ok(self.repository.delete(id).await?)
    }

    /// A single listing. Unapproved listings are only visible to their owner and admins.
    pub async fn view(&self, id: &PropertyId) -> Result<Property, AccessError> {
        let property = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ListingError::NotFound(id.clone()))?;

        if property.status == PropertyStatus::Approved {
            return Ok(property);
        }

        match self.principal().await {
            Some(principal) if principal.may_manage(&property) => Ok(property),
            _ => Err(ListingError::NotFound(id.clone()).into()),
        }
    }

    /// Browse listings. Only admins may look beyond approved listings.
    pub async fn browse(
        &self,
        status: StatusFilter,
        query: &ListingQuery,
    ) -> Result<Vec<Property>, AccessError> {
        let is_admin = match self.current_identity() {
            Some(identity) => self.is_admin(&identity.uid).await,
            None => false,
        };
        let status = if is_admin {
            status
        } else {
            StatusFilter::Only(PropertyStatus::Approved)
        };

        let properties = self.repository.list(status).await?;
        Ok(query.apply(&properties))
    }

    /// Listings submitted by the signed-in user, in any status.
    pub async fn my_listings(&self) -> Result<Vec<Property>, AccessError> {
        let identity = self.current_identity().ok_or(AccessError::NotAuthenticated)?;
        let properties = self.repository.list(StatusFilter::All).await?;
        Ok(properties
            .into_iter()
            .filter(|property| property.submitted_by == identity.uid)
            .collect())
    }

    pub async fn statistics(&self) -> Result<StatusCounts, AccessError> {
        self.require_admin().await?;
        Ok(self.repository.statistics().await)
    }

    pub async fn recent_activities(&self, limit: usize) -> Result<Vec<ActivityEntry>, AccessError> {
        self.require_admin().await?;
        Ok(self.repository.recent_activities(limit).await)
    }

    pub async fn approval_settings(&self) -> Result<ApprovalSettings, AccessError> {
        self.require_admin().await?;
        Ok(self.settings.load().await?)
    }

    pub async fn save_approval_settings(
        &self,
        settings: ApprovalSettings,
    ) -> Result<ApprovalSettings, AccessError> {
        let principal = self.require_admin().await?;
        Ok(self.settings.save(settings, principal.uid()).await?)
    }
}
