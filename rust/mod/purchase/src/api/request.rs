use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use openerp_core::{ListParams, ListResult, ServiceError};

use super::AppState;
use crate::model::{CreateRequest, LineFeedback, PurchaseRequest, RequestStatus, Rfq};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/lines/{line_id}/feedback", post(set_line_feedback))
        .route("/requests/{id}/submit", post(submit_request))
        .route("/requests/{id}/approve", post(approve_request))
        .route("/requests/{id}/rfq", post(create_rfq_from_request))
        .route("/requests/{id}/done", post(done_request))
        .route("/requests/{id}/cancel", post(cancel_request))
}

#[derive(Deserialize)]
struct RequestQuery {
    status: Option<RequestStatus>,
}

#[derive(Deserialize)]
struct FeedbackBody {
    feedback: LineFeedback,
}

async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateRequest>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(state.service.create_request(&actor, body)?))
}

async fn get_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.get_request(&id)?))
}

async fn list_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
    Query(q): Query<RequestQuery>,
) -> Result<Json<ListResult<PurchaseRequest>>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.list_requests(q.status, &params)?))
}

async fn set_line_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, line_id)): Path<(String, String)>,
    Json(body): Json<FeedbackBody>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(
        state
            .service
            .set_line_feedback(&actor, &id, &line_id, body.feedback)?,
    ))
}

async fn submit_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(state.service.submit_request(&actor, &id)?))
}

async fn approve_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(state.service.approve_request(&actor, &id)?))
}

async fn create_rfq_from_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Rfq>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(state.service.create_rfq_from_request(&actor, &id)?))
}

async fn done_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(state.service.done_request(&actor, &id)?))
}

async fn cancel_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PurchaseRequest>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.cancel_request(&id)?))
}
