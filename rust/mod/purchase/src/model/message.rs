use serde::{Deserialize, Serialize};

/// A note posted on a record's message log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,

    /// Record kind, e.g. "purchase.order".
    pub model: String,

    pub res_id: String,

    /// HTML body.
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,
}
