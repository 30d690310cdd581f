use std::sync::Arc;

use super::common::*;

use crate::access::{AccessError, AuthProvider, Identity, Role, RoleCache, UserDirectory};
use crate::listings::domain::{PropertyDraft, PropertyPatch, PropertyStatus, StatusFilter};
use crate::listings::query::{FilterSpec, ListingQuery};
use crate::listings::repository::ListingError;
use crate::listings::settings::ApprovalSettings;

fn draft(title: &str, price: u64) -> PropertyDraft {
    PropertyDraft {
        details: details(title, price),
        images: vec![format!("https://img.example/{}.jpg", title.to_lowercase())],
    }
}

#[tokio::test]
async fn admin_membership_comes_from_admins_collection() {
    let fixture = build_gate(None).await;
    assert!(fixture.gate.is_admin(ADMIN).await);
    assert!(!fixture.gate.is_admin(SELLER).await);
}

#[tokio::test]
async fn admin_lookup_denies_when_store_is_unreachable() {
    let fixture = build_gate(None).await;
    fixture.store.set_available(false);
    assert!(!fixture.gate.is_admin(ADMIN).await);
}

#[tokio::test]
async fn role_lookup_defaults_to_buyer_and_caches_known_roles() {
    let fixture = build_gate(None).await;

    assert_eq!(fixture.gate.role_of("uid-unregistered").await, Role::Buyer);
    assert_eq!(fixture.gate.role_of(SELLER).await, Role::Seller);

    let cached = fixture.cache.get(SELLER).expect("role cached");
    assert_eq!(cached.role, Role::Seller);
    assert!(!cached.stale);
}

#[tokio::test]
async fn role_lookup_falls_back_to_stale_cache_when_offline() {
    let fixture = build_gate(None).await;
    assert_eq!(fixture.gate.role_of(SELLER).await, Role::Seller);

    fixture.store.set_available(false);
    assert_eq!(fixture.gate.role_of(SELLER).await, Role::Seller);
    assert!(fixture.cache.get(SELLER).expect("still cached").stale);

    assert_eq!(fixture.gate.role_of(BUYER).await, Role::Buyer);
    assert!(fixture.cache.get(BUYER).is_none());
}

#[tokio::test]
async fn submit_requires_sign_in() {
    let fixture = build_gate(None).await;
    let error = fixture
        .gate
        .submit(draft("Orphan", 1_000_000))
        .await
        .expect_err("anonymous submit refused");
    assert!(matches!(
        error,
        AccessError::Listing(ListingError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn review_is_reserved_for_admins() {
    let fixture = build_gate(Some(SELLER)).await;
    let id = fixture
        .gate
        .submit(draft("Lakeview", 8_500_000))
        .await
        .expect("seller submits");

    let error = fixture
        .gate
        .approve(&id, "looks fine")
        .await
        .expect_err("seller cannot approve");
    assert!(matches!(error, AccessError::Forbidden(_)));

    fixture.auth.sign_in(Identity::new(ADMIN));
    let approved = fixture
        .gate
        .approve(&id, "")
        .await
        .expect("admin approves");
    assert_eq!(approved.status, PropertyStatus::Approved);

    let error = fixture
        .gate
        .reject(&id, "no")
        .await
        .expect_err("short rejection note");
    assert!(matches!(
        error,
        AccessError::Listing(ListingError::Validation(_))
    ));
}

#[tokio::test]
async fn owners_and_admins_may_edit_but_others_may_not() {
    let fixture = build_gate(Some(SELLER)).await;
    let id = fixture
        .gate
        .submit(draft("Skyline", 24_000_000))
        .await
        .expect("seller submits");

    let patch = PropertyPatch {
        price: Some(23_500_000),
        ..PropertyPatch::default()
    };
    let edited = fixture
        .gate
        .edit(&id, patch.clone())
        .await
        .expect("owner edits");
    assert_eq!(edited.details.price, 23_500_000);

    fixture.auth.sign_in(Identity::new(ADMIN));
    fixture.gate.approve(&id, "").await.expect("admin approves");

    fixture.auth.sign_in(Identity::new(BUYER));
    let error = fixture
        .gate
        .edit(&id, patch.clone())
        .await
        .expect_err("buyer cannot edit");
    assert!(matches!(error, AccessError::Forbidden(_)));
    let error = fixture.gate.remove(&id).await.expect_err("buyer cannot delete");
    assert!(matches!(error, AccessError::Forbidden(_)));

    fixture.auth.sign_in(Identity::new(ADMIN));
    fixture.gate.remove(&id).await.expect("admin deletes");
    let error = fixture.gate.edit(&id, patch).await.expect_err("gone");
    assert!(matches!(error, AccessError::Listing(ListingError::NotFound(_))));
}

#[tokio::test]
async fn unapproved_listings_are_hidden_from_strangers() {
    let fixture = build_gate(Some(SELLER)).await;
    let id = fixture
        .gate
        .submit(draft("Villa", 61_000_000))
        .await
        .expect("seller submits");

    fixture.gate.view(&id).await.expect("owner sees own listing");

    fixture.auth.sign_in(Identity::new(BUYER));
    let error = fixture.gate.view(&id).await.expect_err("hidden from buyer");
    assert!(matches!(error, AccessError::Listing(ListingError::NotFound(_))));
    let error = fixture
        .gate
        .edit(&id, PropertyPatch::default())
        .await
        .expect_err("buyer cannot edit a hidden listing");
    assert!(matches!(error, AccessError::Listing(ListingError::NotFound(_))));
    let error = fixture.gate.remove(&id).await.expect_err("buyer cannot delete");
    assert!(matches!(error, AccessError::Listing(ListingError::NotFound(_))));

    fixture.auth.sign_in(Identity::new(ADMIN));
    fixture.gate.approve(&id, "").await.expect("admin approves");

    fixture.auth.sign_out();
    let visible = fixture.gate.view(&id).await.expect("approved is public");
    assert_eq!(visible.status, PropertyStatus::Approved);
}

#[tokio::test]
async fn browse_limits_non_admins_to_approved_listings() {
    let fixture = build_gate(Some(SELLER)).await;
    let first = fixture
        .gate
        .submit(draft("Lakeview", 8_500_000))
        .await
        .expect("submit");
    fixture
        .gate
        .submit(draft("Skyline", 24_000_000))
        .await
        .expect("submit");

    fixture.auth.sign_in(Identity::new(ADMIN));
    fixture.gate.approve(&first, "").await.expect("approve");

    let query = ListingQuery::default();
    let admin_view = fixture
        .gate
        .browse(StatusFilter::All, &query)
        .await
        .expect("admin browse");
    assert_eq!(admin_view.len(), 2);

    let pending = fixture
        .gate
        .browse(StatusFilter::Only(PropertyStatus::Pending), &query)
        .await
        .expect("admin browse pending");
    assert_eq!(pending.len(), 1);

    fixture.auth.sign_out();
    let public = fixture
        .gate
        .browse(StatusFilter::Only(PropertyStatus::Pending), &query)
        .await
        .expect("public browse");
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, first);

    let filtered = fixture
        .gate
        .browse(
            StatusFilter::All,
            &ListingQuery {
                filters: FilterSpec {
                    price: Some("Above ₹5Cr".to_string()),
                    ..FilterSpec::default()
                },
                ..ListingQuery::default()
            },
        )
        .await
        .expect("public browse");
    assert!(filtered.is_empty());
}

#[tokio::test]
async fn my_listings_cover_every_status() {
    let fixture = build_gate(Some(SELLER)).await;
    let id = fixture
        .gate
        .submit(draft("Lakeview", 8_500_000))
        .await
        .expect("submit");

    fixture.auth.sign_in(Identity::new(ADMIN));
    fixture
        .gate
        .reject(&id, "Missing floor plan")
        .await
        .expect("reject");
    fixture
        .gate
        .submit(draft("Admin listing", 9_000_000))
        .await
        .expect("admin submits too");

    fixture.auth.sign_in(Identity::new(SELLER));
    let mine = fixture.gate.my_listings().await.expect("own listings");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, PropertyStatus::Rejected);
    assert_eq!(mine[0].admin_note, "Missing floor plan");
}

#[tokio::test]
async fn dashboard_and_settings_require_admin() {
    let fixture = build_gate(Some(BUYER)).await;
    assert!(matches!(
        fixture.gate.statistics().await,
        Err(AccessError::Forbidden(_))
    ));
    assert!(matches!(
        fixture.gate.approval_settings().await,
        Err(AccessError::Forbidden(_))
    ));

    fixture.auth.sign_out();
    assert!(matches!(
        fixture.gate.recent_activities(5).await,
        Err(AccessError::NotAuthenticated)
    ));

    fixture.auth.sign_in(Identity::new(ADMIN));
    let defaults = fixture
        .gate
        .approval_settings()
        .await
        .expect("admin reads settings");
    assert_eq!(defaults, ApprovalSettings::default());

    let saved = fixture
        .gate
        .save_approval_settings(ApprovalSettings {
            auto_approve: true,
            notify_email: "listings@example.com".to_string(),
            ..ApprovalSettings::default()
        })
        .await
        .expect("admin saves settings");
    assert_eq!(saved.updated_by.as_deref(), Some(ADMIN));
    assert!(saved.updated_at.is_some());
    assert_eq!(
        fixture.gate.approval_settings().await.expect("reload"),
        saved
    );
}

#[tokio::test]
async fn watch_rederives_principal_on_auth_changes() {
    let fixture = build_gate(None).await;
    let mut subscription = fixture.auth.subscribe();

    fixture.auth.sign_in(Identity::new(SELLER));
    let principal = fixture
        .gate
        .watch(&mut subscription)
        .await
        .expect("subscription open")
        .expect("signed in");
    assert_eq!(principal.role, Role::Seller);
    assert!(!principal.is_admin);

    let directory = UserDirectory::new(Arc::clone(&fixture.store));
    directory
        .grant_admin(SELLER, "asha@example.com")
        .await
        .expect("grant admin");
    fixture.auth.sign_in(Identity::new(SELLER));
    let promoted = fixture
        .gate
        .watch(&mut subscription)
        .await
        .expect("subscription open")
        .expect("signed in");
    assert!(promoted.is_admin);

    fixture.auth.sign_out();
    let signed_out = fixture
        .gate
        .watch(&mut subscription)
        .await
        .expect("subscription open");
    assert!(signed_out.is_none());

    subscription.cancel();
    assert_eq!(fixture.auth.listener_count(), 0);
}
