use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Claim, ClaimId, CollectionId, Creation, NewClaim, UserId};
use super::presentation;
use super::query::{order_by_claiming_byline, order_by_date, order_by_requesting_byline, ClaimStore, SortDirection, StoreError};
use super::reference::ReferenceData;
use super::service::{ClaimService, ClaimServiceError};

/// Router builder exposing HTTP endpoints for claim lifecycle and listings.
pub fn claim_router<S, D>(service: Arc<ClaimService<S, D>>) -> Router
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    Router::new()
        .route("/api/v1/claims", post(create_handler::<S, D>))
        .route(
            "/api/v1/claims/:claim_id",
            get(show_handler::<S, D>).delete(destroy_handler::<S, D>),
        )
        .route(
            "/api/v1/claims/:claim_id/creation",
            post(attach_handler::<S, D>).delete(detach_handler::<S, D>),
        )
        .route(
            "/api/v1/collections/:collection_id/claims",
            get(listing_handler::<S, D>),
        )
        .with_state(service)
}

/// Sanitized representation of a claim for API responses. Byline and title
/// derivations degrade to `null` when their reference data is gone.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimView {
    pub id: ClaimId,
    pub collection_id: CollectionId,
    pub progress: &'static str,
    pub approval: &'static str,
    pub publication: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claiming_byline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_byline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

fn claim_view<S, D>(
    service: &ClaimService<S, D>,
    claim: &Claim,
) -> Result<ClaimView, ClaimServiceError>
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    let classification = service.classification(claim)?;
    let refs = service.references();
    Ok(ClaimView {
        id: claim.id,
        collection_id: claim.collection_id,
        progress: classification.progress.label(),
        approval: classification.approval.label(),
        publication: classification.publication.label(),
        claiming_byline: presentation::claiming_byline(claim, refs).ok(),
        request_byline: presentation::request_byline(claim, refs).ok(),
        title: presentation::claim_title(claim, refs).ok(),
    })
}

fn error_response(error: ClaimServiceError) -> Response {
    let status = match &error {
        ClaimServiceError::Forbidden => StatusCode::FORBIDDEN,
        ClaimServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        ClaimServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        ClaimServiceError::Reference(_) => StatusCode::NOT_FOUND,
        ClaimServiceError::Integrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ClaimServiceError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn acting_user(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get("x-acting-user")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(UserId)
}

pub(crate) async fn create_handler<S, D>(
    State(service): State<Arc<ClaimService<S, D>>>,
    axum::Json(new_claim): axum::Json<NewClaim>,
) -> Response
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    match service
        .claim(new_claim)
        .and_then(|claim| claim_view(&service, &claim))
    {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn show_handler<S, D>(
    State(service): State<Arc<ClaimService<S, D>>>,
    Path(claim_id): Path<u64>,
) -> Response
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    match service
        .get(ClaimId(claim_id))
        .and_then(|claim| claim_view(&service, &claim))
    {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn destroy_handler<S, D>(
    State(service): State<Arc<ClaimService<S, D>>>,
    Path(claim_id): Path<u64>,
    headers: HeaderMap,
) -> Response
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    let Some(user) = acting_user(&headers) else {
        let payload = json!({ "error": "x-acting-user header required" });
        return (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response();
    };
    match service.destroy(ClaimId(claim_id), user) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn attach_handler<S, D>(
    State(service): State<Arc<ClaimService<S, D>>>,
    Path(claim_id): Path<u64>,
    axum::Json(creation): axum::Json<Creation>,
) -> Response
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    match service
        .attach_creation(ClaimId(claim_id), creation)
        .and_then(|claim| claim_view(&service, &claim))
    {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detach_handler<S, D>(
    State(service): State<Arc<ClaimService<S, D>>>,
    Path(claim_id): Path<u64>,
) -> Response
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    match service
        .detach_creation(ClaimId(claim_id))
        .and_then(|claim| claim_view(&service, &claim))
    {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingState {
    All,
    Unstarted,
    Fulfilled,
    Unfulfilled,
    Posted,
    Unposted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingOrder {
    RequestingByline,
    ClaimingByline,
    Date,
}

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub state: Option<ListingState>,
    #[serde(default)]
    pub order: Option<ListingOrder>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

pub(crate) async fn listing_handler<S, D>(
    State(service): State<Arc<ClaimService<S, D>>>,
    Path(collection_id): Path<u64>,
    Query(params): Query<ListingParams>,
) -> Response
where
    S: ClaimStore + 'static,
    D: ReferenceData + 'static,
{
    let collection = CollectionId(collection_id);
    let queries = service.queries();

    let selected = match params.state.unwrap_or(ListingState::All) {
        ListingState::All => queries.in_collection(collection),
        ListingState::Unstarted => queries.unstarted_in(collection),
        ListingState::Fulfilled => queries.fulfilled_in(collection),
        ListingState::Unfulfilled => queries.unfulfilled_in(collection),
        ListingState::Posted => queries.posted_in(collection),
        ListingState::Unposted => queries.unposted_in(collection),
    };

    let claims = match selected {
        Ok(claims) => claims,
        Err(error) => return error_response(ClaimServiceError::Store(error)),
    };

    let direction = params.direction.unwrap_or(SortDirection::Ascending);
    let claims = match params.order {
        Some(ListingOrder::RequestingByline) => {
            order_by_requesting_byline(claims, direction, service.references())
        }
        Some(ListingOrder::ClaimingByline) => {
            order_by_claiming_byline(claims, direction, service.references())
        }
        Some(ListingOrder::Date) => order_by_date(claims),
        None => claims,
    };

    let mut views = Vec::with_capacity(claims.len());
    for claim in &claims {
        match claim_view(&service, claim) {
            Ok(view) => views.push(view),
            Err(error) => return error_response(error),
        }
    }

    (StatusCode::OK, axum::Json(views)).into_response()
}
