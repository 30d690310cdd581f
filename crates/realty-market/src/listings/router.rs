use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{PropertyDraft, PropertyId, PropertyPatch, StatusFilter};
use super::query::{FilterSpec, ListingQuery, SortOption};
use super::repository::{ListingError, PropertyRepository};
use super::settings::ApprovalSettings;
use crate::access::{AccessError, AccessGate, Identity, RoleCache, StaticIdentity};
use crate::store::{DocumentStore, StoreError};

/// Header carrying the caller's uid, standing in for the provider's session token.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Shared handles the listing routes build a per-request gate from.
pub struct MarketplaceState<S> {
    pub repository: PropertyRepository<S>,
    pub cache: Arc<dyn RoleCache>,
    pub activity_limit: usize,
}

impl<S> MarketplaceState<S>
where
    S: DocumentStore + 'static,
{
    fn gate(&self, headers: &HeaderMap) -> AccessGate<S, StaticIdentity> {
        AccessGate::new(
            self.repository.clone(),
            Arc::new(StaticIdentity::new(identity_from_headers(headers))),
            Arc::clone(&self.cache),
        )
    }
}

fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let uid = header(USER_ID_HEADER)?;
    let identity = Identity::new(uid);
    Some(match header(USER_EMAIL_HEADER) {
        Some(email) => identity.with_email(email),
        None => identity,
    })
}

/// Router builder exposing browse, submission, review and dashboard endpoints.
pub fn listing_router<S>(state: MarketplaceState<S>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            get(browse_handler::<S>).post(submit_handler::<S>),
        )
        .route("/api/v1/properties/mine", get(mine_handler::<S>))
        .route(
            "/api/v1/properties/:property_id",
            get(detail_handler::<S>)
                .patch(edit_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/properties/:property_id/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/properties/:property_id/reject",
            post(reject_handler::<S>),
        )
        .route(
            "/api/v1/dashboard/statistics",
            get(statistics_handler::<S>),
        )
        .route("/api/v1/dashboard/activity", get(activity_handler::<S>))
        .route(
            "/api/v1/settings/approval",
            get(settings_handler::<S>).put(save_settings_handler::<S>),
        )
        .with_state(Arc::new(state))
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = match &self {
            AccessError::NotAuthenticated | AccessError::Listing(ListingError::NotAuthenticated) => {
                StatusCode::UNAUTHORIZED
            }
            AccessError::Forbidden(_) => StatusCode::FORBIDDEN,
            AccessError::Listing(ListingError::NotFound(_)) => StatusCode::NOT_FOUND,
            AccessError::Listing(
                ListingError::Validation(_) | ListingError::InvalidTransition { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            AccessError::Listing(ListingError::StoreUnavailable(_))
            | AccessError::Settings(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AccessError::Listing(ListingError::Malformed(_)) | AccessError::Settings(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BrowseParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default, rename = "reviewStatus")]
    review_status: Option<String>,
    #[serde(default)]
    sort: Option<String>,
    #[serde(flatten)]
    filters: FilterSpec,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewRequest {
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivityParams {
    #[serde(default)]
    limit: Option<usize>,
}

pub(crate) async fn browse_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Query(params): Query<BrowseParams>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let BrowseParams {
        q,
        review_status,
        sort,
        filters,
    } = params;

    let status = match review_status.as_deref().map(StatusFilter::parse) {
        None => StatusFilter::All,
        Some(Some(status)) => status,
        Some(None) => {
            let payload = json!({
                "error": "reviewStatus must be all, pending, approved or rejected",
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    let query = ListingQuery {
        text: q.unwrap_or_default(),
        filters,
        sort: sort.as_deref().map(SortOption::parse).unwrap_or_default(),
    };

    match state.gate(&headers).browse(status, &query).await {
        Ok(properties) => (StatusCode::OK, Json(properties)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn mine_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.gate(&headers).my_listings().await {
        Ok(properties) => (StatusCode::OK, Json(properties)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn submit_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Json(draft): Json<PropertyDraft>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.gate(&headers).submit(draft).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn detail_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.gate(&headers).view(&PropertyId(property_id)).await {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn edit_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    Json(patch): Json<PropertyPatch>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state
        .gate(&headers)
        .edit(&PropertyId(property_id), patch)
        .await
    {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn delete_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.gate(&headers).remove(&PropertyId(property_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

/// Review notes are optional, so a request without a JSON body counts as empty notes.
fn review_notes(request: Result<Json<ReviewRequest>, JsonRejection>) -> Result<String, Response> {
    match request {
        Ok(Json(review)) => Ok(review.notes),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(String::new()),
        Err(rejection) => Err(rejection.into_response()),
    }
}

pub(crate) async fn approve_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    request: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let notes = match review_notes(request) {
        Ok(notes) => notes,
        Err(rejection) => return rejection,
    };

    match state
        .gate(&headers)
        .approve(&PropertyId(property_id), &notes)
        .await
    {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn reject_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    request: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let notes = match review_notes(request) {
        Ok(notes) => notes,
        Err(rejection) => return rejection,
    };

    match state
        .gate(&headers)
        .reject(&PropertyId(property_id), &notes)
        .await
    {
        Ok(property) => (StatusCode::OK, Json(property)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn statistics_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.gate(&headers).statistics().await {
        Ok(counts) => (StatusCode::OK, Json(counts)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn activity_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Query(params): Query<ActivityParams>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let limit = params.limit.unwrap_or(state.activity_limit);
    match state.gate(&headers).recent_activities(limit).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn settings_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state.gate(&headers).approval_settings().await {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn save_settings_handler<S>(
    State(state): State<Arc<MarketplaceState<S>>>,
    headers: HeaderMap,
    Json(settings): Json<ApprovalSettings>,
) -> Response
where
    S: DocumentStore + 'static,
{
    match state
        .gate(&headers)
        .save_approval_settings(settings)
        .await
    {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(error) => error.into_response(),
    }
}
