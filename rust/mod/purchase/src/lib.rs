pub mod api;
pub mod model;
pub mod roles;
pub mod service;
mod store_impls;

use std::sync::Arc;

use axum::Router;
use openerp_core::{Authenticator, Module};

use api::AppState;
use service::PurchaseService;

/// Purchase module: vendor bidding on RFQs, purchase order generation and
/// the employee purchase-request workflow.
pub struct PurchaseModule {
    state: AppState,
}

impl PurchaseModule {
    pub fn new(service: PurchaseService, auth: Arc<dyn Authenticator>) -> Self {
        Self {
            state: AppState {
                service: Arc::new(service),
                auth,
            },
        }
    }

    pub fn service(&self) -> &Arc<PurchaseService> {
        &self.state.service
    }
}

impl Module for PurchaseModule {
    fn name(&self) -> &str {
        "purchase"
    }

    fn routes(&self) -> Router {
        api::router(self.state.clone())
    }
}
