use serde::{Deserialize, Serialize};

/// A purchase order line, priced at the winning bid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub product_qty: f64,
    pub product_uom: String,
    pub price_unit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_planned: Option<String>,
    pub price_subtotal: f64,
}

/// Purchase order generated when an RFQ is confirmed. Never modified
/// afterwards by this module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(default)]
    pub id: String,

    /// Sequence reference, e.g. "PO00001".
    pub name: String,

    pub vendor_id: String,

    /// Reference of the RFQ the order came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default)]
    pub lines: Vec<OrderLine>,

    #[serde(default)]
    pub amount_total: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}
