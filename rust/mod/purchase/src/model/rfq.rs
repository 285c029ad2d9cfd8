use serde::{Deserialize, Serialize};

/// RFQ status. A confirmed RFQ is DONE and accepts no further bid changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfqStatus {
    #[default]
    Draft,
    Done,
}

impl RfqStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Done => "DONE",
        }
    }
}

fn default_uom() -> String {
    "Units".to_string()
}

/// A product line requested in an RFQ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RfqLine {
    pub product_id: String,

    /// Line description; defaults to the product id.
    #[serde(default)]
    pub name: String,

    pub product_qty: f64,

    #[serde(default = "default_uom")]
    pub product_uom: String,

    /// Reference price, used when the winning bid quotes none.
    #[serde(default)]
    pub price_unit: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_planned: Option<String>,
}

/// Request for quotation sent to one or more candidate vendors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rfq {
    #[serde(default)]
    pub id: String,

    /// Sequence reference, e.g. "RFQ00001".
    #[serde(default)]
    pub name: String,

    /// Primary vendor. Follows the approved bid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,

    /// Candidate vendors invited to bid.
    #[serde(default)]
    pub vendor_ids: Vec<String>,

    /// Source document (a purchase request reference, for instance).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default)]
    pub lines: Vec<RfqLine>,

    #[serde(default)]
    pub status: RfqStatus,

    /// Derived from the bids; see `service::winner`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_vendor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Creation payload for RFQs. `vendor_ids` is already normalized to a
/// flat, ordered list of ids.
#[derive(Debug, Clone, Default)]
pub struct CreateRfq {
    pub vendor_ids: Vec<String>,
    pub origin: Option<String>,
    pub lines: Vec<RfqLine>,
    pub notes: Option<String>,
}
