use serde::{Deserialize, Serialize};

fn default_supplier_rank() -> u32 {
    1
}

/// A supplier that can be invited to RFQs and submit bids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Greater than zero for partners that act as suppliers.
    #[serde(default = "default_supplier_rank")]
    pub supplier_rank: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}
