use std::sync::Arc;

use realty_market::access::{
    AccessError, AccessGate, Identity, InMemoryAuthProvider, InMemoryRoleCache, Role,
    UserDirectory, UserProfile,
};
use realty_market::listings::{
    ListingError, ListingType, PropertyCategory, PropertyDetails, PropertyDraft,
    PropertyRepository, PropertyStatus, StatusFilter, TransitionPolicy,
};
use realty_market::store::InMemoryDocumentStore;

const SELLER: &str = "uid-seller";
const ADMIN: &str = "uid-admin";

fn draft(title: &str, price: u64) -> PropertyDraft {
    let mut details = PropertyDetails::new(price, PropertyCategory::House, ListingType::Sale);
    details.title = Some(title.to_string());
    details.location = Some("Jubilee Hills, Hyderabad".to_string());
    PropertyDraft {
        details,
        images: vec!["https://img.example/front.jpg".to_string()],
    }
}

async fn marketplace(
    policy: TransitionPolicy,
) -> (
    AccessGate<InMemoryDocumentStore, InMemoryAuthProvider>,
    InMemoryAuthProvider,
) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let directory = UserDirectory::new(Arc::clone(&store));
    directory
        .register(SELLER, UserProfile::new("Asha Rao", "asha@example.com", Role::Seller))
        .await
        .expect("seller registered");
    directory
        .grant_admin(ADMIN, "meera@example.com")
        .await
        .expect("admin granted");

    let auth = InMemoryAuthProvider::new();
    let gate = AccessGate::new(
        PropertyRepository::with_policy(store, policy),
        Arc::new(auth.clone()),
        Arc::new(InMemoryRoleCache::new()),
    );
    (gate, auth)
}

#[tokio::test]
async fn listing_moves_from_submission_through_review() {
    let (gate, auth) = marketplace(TransitionPolicy::Permissive).await;

    auth.sign_in(Identity::new(SELLER));
    let principal = gate.principal().await.expect("signed in");
    assert_eq!(principal.role, Role::Seller);
    assert!(!principal.is_admin);

    let accepted = gate
        .submit(draft("Palm Grove Villa", 61_000_000))
        .await
        .expect("submitted");
    let declined = gate
        .submit(draft("Hillside Cottage", 12_500_000))
        .await
        .expect("submitted");

    auth.sign_in(Identity::new(ADMIN));
    let pending = gate
        .repository()
        .list(StatusFilter::Only(PropertyStatus::Pending))
        .await
        .expect("pending queue");
    assert_eq!(pending.len(), 2);

    gate.approve(&accepted, "Title deed verified")
        .await
        .expect("approved");
    let error = gate
        .reject(&declined, "   ")
        .await
        .expect_err("blank rejection refused");
    assert!(matches!(
        error,
        AccessError::Listing(ListingError::Validation(_))
    ));
    gate.reject(&declined, "Photos do not match the address")
        .await
        .expect("rejected");

    let stats = gate.statistics().await.expect("admin dashboard");
    assert_eq!(
        (stats.pending, stats.approved, stats.rejected, stats.total),
        (0, 1, 1, 2)
    );

    let activity = gate.recent_activities(10).await.expect("activity feed");
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0].property_id, declined);
    assert_eq!(activity[0].status, PropertyStatus::Rejected);

    auth.sign_in(Identity::new(SELLER));
    let mine = gate.my_listings().await.expect("own listings");
    let rejected = mine
        .iter()
        .find(|property| property.id == declined)
        .expect("rejected listing visible to owner");
    assert_eq!(rejected.admin_note, "Photos do not match the address");
}

#[tokio::test]
async fn strict_policy_keeps_decisions_final() {
    let (gate, auth) = marketplace(TransitionPolicy::Strict).await;

    auth.sign_in(Identity::new(SELLER));
    let id = gate
        .submit(draft("Palm Grove Villa", 61_000_000))
        .await
        .expect("submitted");

    auth.sign_in(Identity::new(ADMIN));
    gate.approve(&id, "").await.expect("approved");

    let error = gate
        .review(&id, PropertyStatus::Pending, "")
        .await
        .expect_err("decided listings stay decided");
    assert!(matches!(
        error,
        AccessError::Listing(ListingError::InvalidTransition { .. })
    ));
}
