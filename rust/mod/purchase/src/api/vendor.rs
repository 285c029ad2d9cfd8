use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use openerp_core::{ListParams, ListResult, ServiceError};

use super::AppState;
use crate::model::Vendor;
use crate::service::vendor::CreateVendor;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vendors", post(create_vendor).get(list_vendors))
        .route("/vendors/{id}", get(get_vendor))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVendorBody {
    name: String,
    email: Option<String>,
    supplier_rank: Option<u32>,
}

async fn create_vendor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateVendorBody>,
) -> Result<Json<Vendor>, ServiceError> {
    state.actor(&headers)?;
    let vendor = state.service.create_vendor(CreateVendor {
        name: body.name,
        email: body.email,
        supplier_rank: body.supplier_rank,
    })?;
    Ok(Json(vendor))
}

async fn get_vendor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vendor>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.get_vendor(&id)?))
}

async fn list_vendors(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResult<Vendor>>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.list_vendors(&params)?))
}
