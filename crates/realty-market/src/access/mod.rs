//! Who is calling, what role they hold, and whether they may change a listing.

mod cache;
mod directory;
mod gate;
mod identity;

pub use cache::{CachedRole, InMemoryRoleCache, RoleCache};
pub use directory::{AdminMembership, UserDirectory, UserProfile};
pub use gate::{AccessError, AccessGate, Principal};
pub use identity::{
    AuthProvider, AuthSubscription, Identity, InMemoryAuthProvider, Role, StaticIdentity,
};
