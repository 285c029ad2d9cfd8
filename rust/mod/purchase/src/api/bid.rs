use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use openerp_core::ServiceError;

use super::{ok_empty, AppState};
use crate::model::{Bid, BidStatus};
use crate::service::bid::CreateBid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bids", post(create_bid))
        .route("/bids/{id}", get(get_bid).patch(update_bid).delete(delete_bid))
        .route("/bids/{id}/status", post(update_bid_status))
}

#[derive(Deserialize)]
struct StatusBody {
    status: BidStatus,
}

async fn create_bid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateBid>,
) -> Result<Json<Bid>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.create_bid(body)?))
}

async fn get_bid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Bid>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.get_bid(&id)?))
}

async fn update_bid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<Bid>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.update_bid(&id, patch)?))
}

async fn delete_bid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.actor(&headers)?;
    state.service.delete_bid(&id)?;
    Ok(ok_empty())
}

async fn update_bid_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Bid>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(state.service.update_bid_status(&actor, &id, body.status)?))
}
