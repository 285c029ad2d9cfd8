use tracing::info;

use openerp_core::{new_id, now_rfc3339, ListParams, ListResult, ServiceError};

use super::PurchaseService;
use crate::model::Vendor;

pub struct CreateVendor {
    pub name: String,
    pub email: Option<String>,
    pub supplier_rank: Option<u32>,
}

impl PurchaseService {
    pub fn create_vendor(&self, input: CreateVendor) -> Result<Vendor, ServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("vendor name is required".into()));
        }

        let now = now_rfc3339();
        let vendor = Vendor {
            id: new_id(),
            name: name.to_string(),
            email: input.email.filter(|e| !e.trim().is_empty()),
            supplier_rank: input.supplier_rank.unwrap_or(1),
            create_at: Some(now.clone()),
            update_at: Some(now),
        };

        self.commit(&[Self::insert_stmt(&vendor)?])?;
        info!(vendor = %vendor.id, name = %vendor.name, "vendor created");
        Ok(vendor)
    }

    pub fn get_vendor(&self, id: &str) -> Result<Vendor, ServiceError> {
        self.get(id)
    }

    /// Resolve a vendor reference that must point at a supplier.
    pub(crate) fn require_supplier(&self, id: &str) -> Result<Vendor, ServiceError> {
        let vendor: Vendor = self.require_ref(id, "vendor")?;
        if vendor.supplier_rank == 0 {
            return Err(ServiceError::Validation(format!(
                "partner '{}' is not a supplier",
                vendor.name
            )));
        }
        Ok(vendor)
    }

    pub fn list_vendors(&self, params: &ListParams) -> Result<ListResult<Vendor>, ServiceError> {
        self.list(&[], params)
    }
}
