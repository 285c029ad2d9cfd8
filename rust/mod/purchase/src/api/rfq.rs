use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use openerp_core::{ListParams, ListResult, ServiceError};

use super::commands::normalize_vendor_ids;
use super::{ok_empty, AppState};
use crate::model::{Bid, CreateRfq, PurchaseOrder, Rfq, RfqLine, RfqStatus};
use crate::service::rfq::RfqFilter;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rfqs", post(create_rfq).get(list_rfqs))
        .route("/rfqs/split", post(split_rfq))
        .route("/rfqs/{id}", get(get_rfq).delete(delete_rfq))
        .route("/rfqs/{id}/bids", get(list_rfq_bids))
        .route("/rfqs/{id}/confirm", post(confirm_rfq))
        .route("/purchase-orders", get(list_purchase_orders))
        .route("/purchase-orders/{id}", get(get_purchase_order))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRfqBody {
    /// Plain ids or relation commands, see `commands`.
    #[serde(default)]
    vendor_ids: serde_json::Value,
    origin: Option<String>,
    #[serde(default)]
    lines: Vec<RfqLine>,
    notes: Option<String>,
}

impl CreateRfqBody {
    fn into_input(self) -> Result<CreateRfq, ServiceError> {
        Ok(CreateRfq {
            vendor_ids: normalize_vendor_ids(&self.vendor_ids)?,
            origin: self.origin,
            lines: self.lines,
            notes: self.notes,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RfqQuery {
    status: Option<RfqStatus>,
    vendor_id: Option<String>,
}

#[derive(Deserialize)]
struct OrderQuery {
    origin: Option<String>,
}

async fn create_rfq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateRfqBody>,
) -> Result<Json<Rfq>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.create_rfq(body.into_input()?)?))
}

async fn split_rfq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateRfqBody>,
) -> Result<Json<Vec<Rfq>>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.split_rfq_per_vendor(body.into_input()?)?))
}

async fn get_rfq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Rfq>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.get_rfq(&id)?))
}

async fn list_rfqs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
    Query(q): Query<RfqQuery>,
) -> Result<Json<ListResult<Rfq>>, ServiceError> {
    state.actor(&headers)?;
    let filter = RfqFilter {
        status: q.status,
        vendor_id: q.vendor_id,
    };
    Ok(Json(state.service.list_rfqs(&filter, &params)?))
}

async fn delete_rfq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.actor(&headers)?;
    state.service.delete_rfq(&id)?;
    Ok(ok_empty())
}

async fn list_rfq_bids(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<Bid>>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.rfq_bids(&id)?))
}

async fn confirm_rfq(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PurchaseOrder>, ServiceError> {
    let actor = state.actor(&headers)?;
    Ok(Json(state.service.confirm_rfq(&actor, &id)?))
}

async fn get_purchase_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PurchaseOrder>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.get_purchase_order(&id)?))
}

async fn list_purchase_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
    Query(q): Query<OrderQuery>,
) -> Result<Json<ListResult<PurchaseOrder>>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(
        state
            .service
            .list_purchase_orders(q.origin.as_deref(), &params)?,
    ))
}
