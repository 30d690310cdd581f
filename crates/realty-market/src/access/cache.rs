use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use super::identity::Role;

/// Last role successfully read for a user.
///
/// `stale` is set once a later lookup failed and the entry was served as a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRole {
    pub role: Role,
    pub stale: bool,
    pub cached_at: DateTime<Utc>,
}

/// Side channel remembering roles so the UI keeps working while the store is unreachable.
pub trait RoleCache: Send + Sync {
    fn get(&self, uid: &str) -> Option<CachedRole>;
    fn set(&self, uid: &str, role: Role);
    fn mark_stale(&self, uid: &str);
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleCache {
    entries: Arc<Mutex<HashMap<String, CachedRole>>>,
}

impl InMemoryRoleCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleCache for InMemoryRoleCache {
    fn get(&self, uid: &str) -> Option<CachedRole> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid)
            .cloned()
    }

    fn set(&self, uid: &str, role: Role) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                uid.to_string(),
                CachedRole {
                    role,
                    stale: false,
                    cached_at: Utc::now(),
                },
            );
    }

    fn mark_stale(&self, uid: &str) {
        if let Some(entry) = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(uid)
        {
            entry.stale = true;
        }
    }
}
