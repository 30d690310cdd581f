use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::access::{
    AccessGate, InMemoryAuthProvider, InMemoryRoleCache, Identity, Role, RoleCache,
    UserDirectory, UserProfile,
};
use crate::listings::domain::{
    ListingType, Property, PropertyCategory, PropertyDetails, PropertyId, PropertyStatus,
};
use crate::listings::repository::PropertyRepository;
use crate::listings::workflow::TransitionPolicy;
use crate::store::{Collection, DocumentStore, InMemoryDocumentStore};

pub(super) const SELLER: &str = "uid-seller";
pub(super) const BUYER: &str = "uid-buyer";
pub(super) const ADMIN: &str = "uid-admin";

pub(super) fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn details(title: &str, price: u64) -> PropertyDetails {
    let mut details = PropertyDetails::new(price, PropertyCategory::Apartment, ListingType::Sale);
    details.title = Some(title.to_string());
    details
}

pub(super) fn property(id: &str, details: PropertyDetails, created: DateTime<Utc>) -> Property {
    Property {
        id: PropertyId::new(id),
        details,
        images: Vec::new(),
        status: PropertyStatus::Approved,
        admin_note: String::new(),
        submitted_by: SELLER.to_string(),
        submitted_on: created,
        created_at: created,
        updated_at: created,
    }
}

/// Six listings spread over categories, prices and optional attributes.
pub(super) fn catalogue() -> Vec<Property> {
    let mut lakeview = details("Lakeview Residency", 8_500_000);
    lakeview.location = Some("Whitefield, Bangalore".to_string());
    lakeview.developer = Some("Prestige Group".to_string());
    lakeview.description = Some("Corner unit with a lake-facing balcony".to_string());
    lakeview.bedrooms = Some(3);
    lakeview.area = Some(1_450.0);
    lakeview.extras.construction_status = Some("Ready to Move".to_string());
    lakeview.extras.completion_date = Some("Ready to Move".to_string());
    lakeview.extras.furnishing = Some("Semi-Furnished".to_string());

    let mut skyline = details("Skyline Towers", 24_000_000);
    skyline.location = Some("Bandra West, Mumbai".to_string());
    skyline.developer = Some("Lodha".to_string());
    skyline.bedrooms = Some(4);
    skyline.area = Some(2_600.0);
    skyline.extras.construction_status = Some("Under Construction".to_string());
    skyline.extras.completion_date = Some("Dec 2027".to_string());

    let mut farm = details("Green Acres Farm Plot", 4_200_000);
    farm.category = PropertyCategory::Plot;
    farm.location = Some("Nandi Hills, Bangalore".to_string());
    farm.land_area = Some(3.0 * 43_560.0);

    let mut studio = details("Compact Studio", 22_000);
    studio.listing_type = ListingType::Rent;
    studio.location = Some("Koramangala, Bangalore".to_string());
    studio.bedrooms = Some(1);
    studio.area = Some(480.0);
    studio.extras.furnishing = Some("Furnished".to_string());

    let mut villa = details("Palm Grove Villa", 61_000_000);
    villa.category = PropertyCategory::House;
    villa.location = Some("Jubilee Hills, Hyderabad".to_string());
    villa.developer = Some("Prestige Group".to_string());
    villa.bedrooms = Some(5);
    villa.area = Some(5_200.0);
    villa.land_area = Some(21_780.0);
    villa.extras.completion_date = Some("Ready to Move".to_string());

    let mut office = details("Tech Park Office Floor", 15_000_000);
    office.category = PropertyCategory::Commercial;
    office.location = Some("Hinjewadi, Pune".to_string());
    office.area = Some(1_000.0);

    vec![
        property("prop-000001", lakeview, day(1)),
        property("prop-000002", skyline, day(4)),
        property("prop-000003", farm, day(2)),
        property("prop-000004", studio, day(6)),
        property("prop-000005", villa, day(3)),
        property("prop-000006", office, day(5)),
    ]
}

pub(super) fn ids(properties: &[Property]) -> Vec<&str> {
    properties.iter().map(|property| property.id.as_str()).collect()
}

pub(super) fn build_repository(
    policy: TransitionPolicy,
) -> (PropertyRepository<InMemoryDocumentStore>, Arc<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = PropertyRepository::with_policy(Arc::clone(&store), policy);
    (repository, store)
}

/// Write a listing as-is, bypassing `create` so timestamps and status stay fixed.
pub(super) async fn seed(store: &InMemoryDocumentStore, property: &Property) -> PropertyId {
    let document = property.to_document().expect("serialises");
    let id = store
        .create(Collection::Properties, document)
        .await
        .expect("seed succeeds");
    PropertyId::new(id)
}

pub(super) async fn seed_users(store: &Arc<InMemoryDocumentStore>) {
    let directory = UserDirectory::new(Arc::clone(store));
    directory
        .register(SELLER, UserProfile::new("Asha Rao", "asha@example.com", Role::Seller))
        .await
        .expect("seller registered");
    directory
        .register(BUYER, UserProfile::new("Vikram Shah", "vikram@example.com", Role::Buyer))
        .await
        .expect("buyer registered");
    directory
        .register(ADMIN, UserProfile::new("Meera Iyer", "meera@example.com", Role::Agent))
        .await
        .expect("admin registered");
    directory
        .grant_admin(ADMIN, "meera@example.com")
        .await
        .expect("admin granted");
}

pub(super) struct GateFixture {
    pub(super) gate: AccessGate<InMemoryDocumentStore, InMemoryAuthProvider>,
    pub(super) auth: InMemoryAuthProvider,
    pub(super) store: Arc<InMemoryDocumentStore>,
    pub(super) cache: Arc<InMemoryRoleCache>,
}

pub(super) async fn build_gate(signed_in: Option<&str>) -> GateFixture {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_users(&store).await;

    let auth = InMemoryAuthProvider::new();
    if let Some(uid) = signed_in {
        auth.sign_in(Identity::new(uid));
    }

    let cache = Arc::new(InMemoryRoleCache::new());
    let gate = AccessGate::new(
        PropertyRepository::new(Arc::clone(&store)),
        Arc::new(auth.clone()),
        Arc::clone(&cache) as Arc<dyn RoleCache>,
    );

    GateFixture {
        gate,
        auth,
        store,
        cache,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
