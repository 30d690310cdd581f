use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Authenticated principal as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Marketplace role recorded on the user profile. Admin rights are tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Buyer,
    Seller,
    Agent,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Agent => "agent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buyer" => Some(Self::Buyer),
            "seller" => Some(Self::Seller),
            "agent" => Some(Self::Agent),
            _ => None,
        }
    }
}

/// Session state exposed by the external auth provider.
pub trait AuthProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;

    /// Register for sign-in/sign-out notifications.
    fn subscribe(&self) -> AuthSubscription;
}

type CancelFn = Box<dyn FnOnce() + Send + Sync>;

/// Handle receiving identity changes until cancelled or dropped.
pub struct AuthSubscription {
    receiver: mpsc::UnboundedReceiver<Option<Identity>>,
    cancel: Option<CancelFn>,
}

impl AuthSubscription {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<Option<Identity>>,
        cancel: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            receiver,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription whose provider never changes identity.
    pub fn inert() -> Self {
        let (_sender, receiver) = mpsc::unbounded_channel();
        Self {
            receiver,
            cancel: None,
        }
    }

    /// Next identity change; `None` once the provider has gone away.
    pub async fn changed(&mut self) -> Option<Option<Identity>> {
        self.receiver.recv().await
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
        self.receiver.close();
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct SessionState {
    current: Option<Identity>,
    listeners: Vec<(u64, mpsc::UnboundedSender<Option<Identity>>)>,
    next_listener: u64,
}

impl SessionState {
    fn broadcast(&mut self) {
        let current = self.current.clone();
        self.listeners
            .retain(|(_, sender)| sender.send(current.clone()).is_ok());
    }
}

/// Process-local session used by the CLI demo and tests.
#[derive(Clone, Default)]
pub struct InMemoryAuthProvider {
    state: Arc<Mutex<SessionState>>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity) -> Self {
        let provider = Self::default();
        provider.sign_in(identity);
        provider
    }

    pub fn sign_in(&self, identity: Identity) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.current = Some(identity);
        state.broadcast();
    }

    pub fn sign_out(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.current = None;
        state.broadcast();
    }

    pub fn listener_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

impl AuthProvider for InMemoryAuthProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    fn subscribe(&self) -> AuthSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let listener_id = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.push((id, sender));
            id
        };

        let weak: Weak<Mutex<SessionState>> = Arc::downgrade(&self.state);
        AuthSubscription::new(receiver, move || {
            if let Some(state) = weak.upgrade() {
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .retain(|(id, _)| *id != listener_id);
            }
        })
    }
}

/// Fixed identity resolved once per request, e.g. from a session header.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<Identity>);

impl StaticIdentity {
    pub fn new(identity: Option<Identity>) -> Self {
        Self(identity)
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl AuthProvider for StaticIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.0.clone()
    }

    fn subscribe(&self) -> AuthSubscription {
        AuthSubscription::inert()
    }
}
