use std::sync::Arc;

use realty_market::access::{
    AccessGate, Identity, InMemoryRoleCache, StaticIdentity, UserDirectory,
};
use realty_market::listings::{
    parse_drafts, FilterSpec, ListingQuery, PropertyRepository, SortOption, StatusFilter,
};
use realty_market::store::InMemoryDocumentStore;

const CATALOGUE: &str = "\
title,description,location,developer,price,category,type,bedrooms,bathrooms,area,landArea,images
Lakeview Residency,Lake-facing balcony,\"Whitefield, Bangalore\",Prestige Group,8500000,apartment,sale,3,2,1450,,https://img.example/lake.jpg
Skyline Towers,,\"Bandra West, Mumbai\",Lodha,24000000,apartment,sale,4,4,2600,,
Green Acres,Farm land,\"Nandi Hills, Bangalore\",,4200000,plot,sale,,,,130680,https://img.example/farm1.jpg|https://img.example/farm2.jpg
Compact Studio,,\"Koramangala, Bangalore\",,22000,apartment,rent,1,1,480,,
";

async fn published_catalogue() -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    UserDirectory::new(Arc::clone(&store))
        .grant_admin("uid-admin", "ops@example.com")
        .await
        .expect("admin granted");

    let repository = PropertyRepository::new(Arc::clone(&store));
    let drafts = parse_drafts(CATALOGUE.as_bytes()).expect("catalogue parses");
    assert_eq!(drafts.len(), 4);

    for draft in drafts {
        let id = repository
            .create(draft.details, draft.images, Some("uid-seller"))
            .await
            .expect("imported");
        repository
            .update_status(&id, realty_market::listings::PropertyStatus::Approved, "")
            .await
            .expect("approved");
    }
    store
}

fn visitor(store: &Arc<InMemoryDocumentStore>) -> AccessGate<InMemoryDocumentStore, StaticIdentity> {
    AccessGate::new(
        PropertyRepository::new(Arc::clone(store)),
        Arc::new(StaticIdentity::anonymous()),
        Arc::new(InMemoryRoleCache::new()),
    )
}

fn titles(properties: &[realty_market::listings::Property]) -> Vec<&str> {
    properties
        .iter()
        .map(|property| property.title_or_placeholder())
        .collect()
}

#[tokio::test]
async fn visitors_search_filter_and_sort_published_listings() {
    let store = published_catalogue().await;
    let gate = visitor(&store);

    let query = ListingQuery {
        text: "bangalore".to_string(),
        filters: FilterSpec {
            property_type: Some("sale".to_string()),
            ..FilterSpec::default()
        },
        sort: SortOption::PriceLowToHigh,
    };
    let results = gate
        .browse(StatusFilter::All, &query)
        .await
        .expect("browse succeeds");
    assert_eq!(titles(&results), vec!["Green Acres", "Lakeview Residency"]);
    assert_eq!(results[0].images.len(), 2);
}

#[tokio::test]
async fn land_and_rent_bands_narrow_results() {
    let store = published_catalogue().await;
    let gate = visitor(&store);

    let land = ListingQuery {
        filters: FilterSpec {
            land_area: Some("1 - 5 Acres".to_string()),
            ..FilterSpec::default()
        },
        ..ListingQuery::default()
    };
    let results = gate.browse(StatusFilter::All, &land).await.expect("browse");
    assert_eq!(titles(&results), vec!["Green Acres"]);

    let rent = ListingQuery {
        filters: FilterSpec {
            price: Some("₹15k - ₹30k/mo".to_string()),
            bhk: Some("1 BHK".to_string()),
            ..FilterSpec::default()
        },
        ..ListingQuery::default()
    };
    let results = gate.browse(StatusFilter::All, &rent).await.expect("browse");
    assert_eq!(titles(&results), vec!["Compact Studio"]);
}

#[tokio::test]
async fn admins_see_every_review_state() {
    let store = published_catalogue().await;
    let admin = AccessGate::new(
        PropertyRepository::new(Arc::clone(&store)),
        Arc::new(StaticIdentity::new(Some(Identity::new("uid-admin")))),
        Arc::new(InMemoryRoleCache::new()),
    );

    let id = admin
        .submit(realty_market::listings::PropertyDraft {
            details: realty_market::listings::PropertyDetails::new(
                9_000_000,
                realty_market::listings::PropertyCategory::Commercial,
                realty_market::listings::ListingType::Sale,
            ),
            images: Vec::new(),
        })
        .await
        .expect("admin submits");

    let everything = admin
        .browse(StatusFilter::All, &ListingQuery::default())
        .await
        .expect("admin browse");
    assert_eq!(everything.len(), 5);
    assert!(everything.iter().any(|property| property.id == id));

    let public = visitor(&store)
        .browse(StatusFilter::All, &ListingQuery::default())
        .await
        .expect("public browse");
    assert_eq!(public.len(), 4);
}
