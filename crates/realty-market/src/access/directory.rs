use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::identity::Role;
use crate::store::{Collection, DocumentStore, StoreError};

/// Profile stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub user_type: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>, user_type: Role) -> Self {
        let now = Utc::now();
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            user_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Marker stored at `admins/{uid}`; its presence, not its content, grants admin rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMembership {
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Read/write access to user profiles and admin membership.
pub struct UserDirectory<S> {
    store: Arc<S>,
}

impl<S> Clone for UserDirectory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> UserDirectory<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn register(&self, uid: &str, profile: UserProfile) -> Result<(), StoreError> {
        self.store
            .put(Collection::Users, uid, serde_json::to_value(&profile)?)
            .await?;
        info!(uid, role = profile.user_type.label(), "user profile registered");
        Ok(())
    }

    pub async fn profile(&self, uid: &str) -> Result<Option<UserProfile>, StoreError> {
        match self.store.get(Collection::Users, uid).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    pub async fn grant_admin(&self, uid: &str, email: &str) -> Result<AdminMembership, StoreError> {
        let membership = AdminMembership {
            email: email.to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
        };
        self.store
            .put(Collection::Admins, uid, serde_json::to_value(&membership)?)
            .await?;
        info!(uid, "admin membership granted");
        Ok(membership)
    }

    pub async fn revoke_admin(&self, uid: &str) -> Result<(), StoreError> {
        self.store.delete(Collection::Admins, uid).await?;
        info!(uid, "admin membership revoked");
        Ok(())
    }
}
