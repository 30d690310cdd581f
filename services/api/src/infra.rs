use metrics_exporter_prometheus::PrometheusHandle;
use realty_market::access::{AccessError, Role, UserDirectory, UserProfile};
use realty_market::error::AppError;
use realty_market::listings::{parse_drafts, PropertyId, PropertyRepository, PropertyStatus};
use realty_market::store::DocumentStore;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Accounts the demo and seeded servers start with.
pub(crate) const DEMO_SELLER: &str = "uid-seller";
pub(crate) const DEMO_BUYER: &str = "uid-buyer";
pub(crate) const DEMO_ADMIN: &str = "uid-admin";

pub(crate) async fn seed_demo_accounts<S>(store: Arc<S>) -> Result<(), AppError>
where
    S: DocumentStore + 'static,
{
    let directory = UserDirectory::new(store);
    let accounts = [
        (DEMO_SELLER, "Asha Rao", "asha@example.com", Role::Seller),
        (DEMO_BUYER, "Vikram Shah", "vikram@example.com", Role::Buyer),
        (DEMO_ADMIN, "Meera Iyer", "meera@example.com", Role::Agent),
    ];

    for (uid, name, email, role) in accounts {
        directory
            .register(uid, UserProfile::new(name, email, role))
            .await
            .map_err(AccessError::from)?;
    }
    directory
        .grant_admin(DEMO_ADMIN, "meera@example.com")
        .await
        .map_err(AccessError::from)?;
    Ok(())
}

/// Submit every row of a listing CSV under `owner`, optionally approving each one.
pub(crate) async fn import_listings<S, R>(
    repository: &PropertyRepository<S>,
    reader: R,
    owner: &str,
    approve: bool,
) -> Result<Vec<PropertyId>, AppError>
where
    S: DocumentStore + 'static,
    R: std::io::Read,
{
    let drafts = parse_drafts(reader)?;
    let mut ids = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let id = repository
            .create(draft.details, draft.images, Some(owner))
            .await?;
        if approve {
            repository
                .update_status(&id, PropertyStatus::Approved, "Imported from CSV")
                .await?;
        }
        ids.push(id);
    }

    info!(count = ids.len(), owner, approve, "listings imported");
    Ok(ids)
}

pub(crate) async fn import_listings_from_path<S>(
    repository: &PropertyRepository<S>,
    path: &Path,
    owner: &str,
    approve: bool,
) -> Result<Vec<PropertyId>, AppError>
where
    S: DocumentStore + 'static,
{
    let file = File::open(path)?;
    import_listings(repository, file, owner, approve).await
}

/// Listings used by the demo and the `/api/v1` smoke tests.
pub(crate) const SAMPLE_LISTINGS: &str = "\
title,description,location,developer,price,category,type,bedrooms,bathrooms,area,landArea,images
Lakeview Residency,Corner unit with a lake-facing balcony,\"Whitefield, Bangalore\",Prestige Group,8500000,apartment,sale,3,2,1450,,https://img.example/lakeview.jpg
Skyline Towers,Sea-view high floor,\"Bandra West, Mumbai\",Lodha,24000000,apartment,sale,4,4,2600,,https://img.example/skyline.jpg
Green Acres Farm Plot,Fenced farmland with borewell,\"Nandi Hills, Bangalore\",,4200000,plot,sale,,,,130680,https://img.example/farm.jpg
Compact Studio,Walk to the metro,\"Koramangala, Bangalore\",,22000,apartment,rent,1,1,480,,
Palm Grove Villa,Private garden and pool,\"Jubilee Hills, Hyderabad\",Prestige Group,61000000,house,sale,5,5,5200,21780,https://img.example/villa.jpg
";
