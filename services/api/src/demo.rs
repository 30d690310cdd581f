use crate::infra::{
    import_listings, import_listings_from_path, seed_demo_accounts, DEMO_ADMIN, DEMO_BUYER,
    DEMO_SELLER, SAMPLE_LISTINGS,
};
use chrono::Local;
use clap::Args;
use realty_market::access::{
    AccessGate, AuthProvider, Identity, InMemoryAuthProvider, InMemoryRoleCache, Principal,
};
use realty_market::error::AppError;
use realty_market::listings::{
    ActivityEntry, FilterSpec, ListingQuery, Property, PropertyRepository, PropertyStatus,
    SortOption, StatusCounts, StatusFilter, TransitionPolicy,
};
use realty_market::store::InMemoryDocumentStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Free-text query used for the browse step
    #[arg(long, default_value = "bangalore")]
    pub(crate) query: String,
    /// Price band label for the browse step, e.g. "₹50L - ₹1Cr"
    #[arg(long)]
    pub(crate) price: Option<String>,
    /// Sort label for the browse step, e.g. "Price: Low to High"
    #[arg(long, default_value = "Price: Low to High")]
    pub(crate) sort: String,
    /// Refuse re-review of decided listings
    #[arg(long)]
    pub(crate) strict: bool,
    /// Print the final snapshot as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Listing CSV export to import
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Uid recorded as submitter of every imported listing
    #[arg(long)]
    pub(crate) owner: String,
    /// Approve each listing right after submission
    #[arg(long)]
    pub(crate) approve: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoSnapshot {
    generated_at: String,
    statistics: StatusCounts,
    recent_activity: Vec<ActivityEntry>,
    browse_results: Vec<Property>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        query,
        price,
        sort,
        strict,
        json,
    } = args;

    let policy = if strict {
        TransitionPolicy::Strict
    } else {
        TransitionPolicy::Permissive
    };

    let store = Arc::new(InMemoryDocumentStore::new());
    seed_demo_accounts(Arc::clone(&store)).await?;

    let auth = InMemoryAuthProvider::new();
    let gate = AccessGate::new(
        PropertyRepository::with_policy(Arc::clone(&store), policy),
        Arc::new(auth.clone()),
        Arc::new(InMemoryRoleCache::new()),
    );
    let mut subscription = auth.subscribe();

    if !json {
        println!("Property marketplace demo ({policy:?} review policy)");
    }

    auth.sign_in(Identity::new(DEMO_SELLER).with_email("asha@example.com"));
    if let Some(Some(principal)) = gate.watch(&mut subscription).await {
        print_principal(&principal, json);
    }

    let submitted =
        import_listings(gate.repository(), SAMPLE_LISTINGS.as_bytes(), DEMO_SELLER, false).await?;
    if !json {
        println!("\nSubmitted {} listings for review", submitted.len());
    }

    auth.sign_in(Identity::new(DEMO_ADMIN).with_email("meera@example.com"));
    if let Some(Some(principal)) = gate.watch(&mut subscription).await {
        print_principal(&principal, json);
    }

    let pending = gate
        .browse(
            StatusFilter::Only(PropertyStatus::Pending),
            &ListingQuery::default(),
        )
        .await?;
    for property in pending {
        let decision = if property.images.is_empty() {
            gate.reject(&property.id, "Please add at least one photo").await?
        } else {
            gate.approve(&property.id, "Details verified").await?
        };
        if !json {
            println!(
                "  {:<24} {:>12} -> {}",
                decision.title_or_placeholder(),
                format_price(decision.details.price),
                decision.status
            );
        }
    }

    let statistics = gate.statistics().await?;
    let recent_activity = gate.recent_activities(3).await?;

    auth.sign_in(Identity::new(DEMO_BUYER));
    if let Some(Some(principal)) = gate.watch(&mut subscription).await {
        print_principal(&principal, json);
    }

    let browse = ListingQuery {
        text: query,
        filters: FilterSpec {
            price,
            ..FilterSpec::default()
        },
        sort: SortOption::parse(&sort),
    };
    let browse_results = gate.browse(StatusFilter::All, &browse).await?;

    auth.sign_out();
    subscription.cancel();

    if json {
        let snapshot = DemoSnapshot {
            generated_at: Local::now().to_rfc3339(),
            statistics,
            recent_activity,
            browse_results,
        };
        let rendered = serde_json::to_string_pretty(&snapshot).map_err(std::io::Error::other)?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "\nDashboard: {} pending, {} approved, {} rejected ({} total)",
        statistics.pending, statistics.approved, statistics.rejected, statistics.total
    );
    println!("Recent activity:");
    for entry in &recent_activity {
        println!(
            "  {} {:<24} {}",
            entry.at.format("%Y-%m-%d %H:%M:%S"),
            entry.title,
            entry.status
        );
    }

    println!(
        "\nBrowse '{}' sorted by {}:",
        browse.text,
        browse.sort.label().unwrap_or("store order")
    );
    if browse_results.is_empty() {
        println!("  no listings match");
    }
    for property in &browse_results {
        println!(
            "  {:<24} {:>12}  {}",
            property.title_or_placeholder(),
            format_price(property.details.price),
            property.details.location.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

pub(crate) async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        csv,
        owner,
        approve,
    } = args;

    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = PropertyRepository::new(Arc::clone(&store));
    let imported = import_listings_from_path(&repository, &csv, &owner, approve).await?;

    println!("Imported {} listings from {}", imported.len(), csv.display());
    for id in &imported {
        if let Some(property) = repository.get_by_id(id).await? {
            println!(
                "  {}  {:<24} {:>12}  {}",
                property.id,
                property.title_or_placeholder(),
                format_price(property.details.price),
                property.status
            );
        }
    }

    let counts = repository.statistics().await;
    println!(
        "Status: {} pending, {} approved",
        counts.pending, counts.approved
    );
    Ok(())
}

fn print_principal(principal: &Principal, json: bool) {
    if json {
        return;
    }
    println!(
        "\nSigned in as {} ({}{})",
        principal.uid(),
        principal.role.label(),
        if principal.is_admin { ", admin" } else { "" }
    );
}

/// Indian grouping shorthand: crores, lakhs, then plain rupees.
fn format_price(price: u64) -> String {
    const CRORE: u64 = 10_000_000;
    const LAKH: u64 = 100_000;
    if price >= CRORE {
        format!("₹{:.2}Cr", price as f64 / CRORE as f64)
    } else if price >= LAKH {
        format!("₹{:.2}L", price as f64 / LAKH as f64)
    } else {
        format!("₹{price}")
    }
}
