//! Record implementations for purchase models: table name, key and
//! indexed columns.

use openerp_sql::Value;

use crate::model::*;
use crate::service::Record;

impl Record for Vendor {
    const TABLE: &'static str = "vendors";
    fn id(&self) -> &str { &self.id }
    fn indexes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.clone().into()),
            ("create_at", self.create_at.clone().into()),
        ]
    }
}

impl Record for Rfq {
    const TABLE: &'static str = "rfqs";
    fn id(&self) -> &str { &self.id }
    fn indexes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.clone().into()),
            ("status", self.status.as_str().into()),
            ("vendor_id", self.vendor_id.clone().into()),
            ("origin", self.origin.clone().into()),
            ("create_at", self.create_at.clone().into()),
        ]
    }
}

impl Record for Bid {
    const TABLE: &'static str = "bids";
    fn id(&self) -> &str { &self.id }
    fn indexes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("rfq_id", self.rfq_id.clone().into()),
            ("vendor_id", self.vendor_id.clone().into()),
            ("status", self.status.as_str().into()),
            ("create_at", self.create_at.clone().into()),
        ]
    }
}

impl Record for PurchaseOrder {
    const TABLE: &'static str = "purchase_orders";
    fn id(&self) -> &str { &self.id }
    fn indexes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.clone().into()),
            ("vendor_id", self.vendor_id.clone().into()),
            ("origin", self.origin.clone().into()),
            ("create_at", self.create_at.clone().into()),
        ]
    }
}

impl Record for PurchaseRequest {
    const TABLE: &'static str = "purchase_requests";
    fn id(&self) -> &str { &self.id }
    fn indexes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.clone().into()),
            ("status", self.status.as_str().into()),
            ("employee_id", self.employee_id.clone().into()),
            ("create_at", self.create_at.clone().into()),
        ]
    }
}

impl Record for Message {
    const TABLE: &'static str = "messages";
    fn id(&self) -> &str { &self.id }
    fn indexes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("model", self.model.clone().into()),
            ("res_id", self.res_id.clone().into()),
            ("create_at", self.create_at.clone().into()),
        ]
    }
}
