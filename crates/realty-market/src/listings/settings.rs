use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::{Collection, DocumentStore, StoreError};

/// Key of the approval settings document inside the `settings` collection.
pub const APPROVAL_SETTINGS_KEY: &str = "propertyApproval";

/// Global review configuration stored at `settings/propertyApproval`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalSettings {
    #[serde(default)]
    pub auto_approve: bool,
    #[serde(default)]
    pub notify_email: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

pub struct ApprovalSettingsStore<S> {
    store: Arc<S>,
}

impl<S> Clone for ApprovalSettingsStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ApprovalSettingsStore<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stored settings, or defaults when nothing has been saved yet.
    pub async fn load(&self) -> Result<ApprovalSettings, StoreError> {
        match self
            .store
            .get(Collection::Settings, APPROVAL_SETTINGS_KEY)
            .await?
        {
            Some(document) => Ok(serde_json::from_value(document)?),
            None => Ok(ApprovalSettings::default()),
        }
    }

    pub async fn save(
        &self,
        mut settings: ApprovalSettings,
        updated_by: &str,
    ) -> Result<ApprovalSettings, StoreError> {
        settings.updated_at = Some(Utc::now());
        settings.updated_by = Some(updated_by.to_string());

        self.store
            .put(
                Collection::Settings,
                APPROVAL_SETTINGS_KEY,
                serde_json::to_value(&settings)?,
            )
            .await?;

        info!(
            auto_approve = settings.auto_approve,
            updated_by, "approval settings saved"
        );
        Ok(settings)
    }
}
