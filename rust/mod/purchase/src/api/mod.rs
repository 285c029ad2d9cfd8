pub mod bid;
pub mod commands;
pub mod request;
pub mod rfq;
pub mod vendor;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use openerp_core::{Actor, Authenticator, ServiceError};

use crate::model::Message;
use crate::service::PurchaseService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PurchaseService>,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    /// Resolve the calling actor from the request headers.
    pub(crate) fn actor(&self, headers: &HeaderMap) -> Result<Actor, ServiceError> {
        self.auth.authenticate(headers)
    }
}

/// Build the purchase API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/purchase/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(vendor::routes())
        .merge(rfq::routes())
        .merge(bid::routes())
        .merge(request::routes())
        .route("/messages", get(list_messages))
}

/// Body of endpoints that return nothing.
pub(crate) fn ok_empty() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageQuery {
    model: String,
    res_id: String,
}

async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<MessageQuery>,
) -> Result<Json<Vec<Message>>, ServiceError> {
    state.actor(&headers)?;
    Ok(Json(state.service.list_messages(&q.model, &q.res_id)?))
}
