use serde::{Deserialize, Serialize};

/// Purchase request status.
///
/// ```text
/// DRAFT → SUBMITTED → APPROVED → TO_RFQ → DONE
///   └──────────┴──────────┴─────────┴──→ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    ToRfq,
    Done,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::ToRfq => "TO_RFQ",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Procurement officer's verdict on a requested product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineFeedback {
    #[default]
    Draft,
    Approved,
    Instock,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestLine {
    #[serde(default)]
    pub id: String,

    pub product_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub quantity: f64,

    #[serde(default)]
    pub feedback: LineFeedback,
}

/// An employee's internal request to buy products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default)]
    pub id: String,

    /// Unique reference, e.g. "PR00001".
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,

    /// `YYYY-MM-DD`.
    pub request_date: String,

    /// Vendors to invite once the request turns into an RFQ.
    #[serde(default)]
    pub vendor_ids: Vec<String>,

    #[serde(default)]
    pub lines: Vec<RequestLine>,

    #[serde(default)]
    pub status: RequestStatus,

    /// RFQ generated from this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfq_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

impl PurchaseRequest {
    pub fn approved_lines(&self) -> impl Iterator<Item = &RequestLine> {
        self.lines
            .iter()
            .filter(|l| l.feedback == LineFeedback::Approved)
    }
}

/// Line payload for a new purchase request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLineInput {
    pub product_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: f64,
    /// Kept only when the creator is a procurement officer.
    #[serde(default)]
    pub feedback: Option<LineFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Explicit reference; drawn from the sequence when absent or "New".
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub request_date: Option<String>,
    #[serde(default)]
    pub vendor_ids: Vec<String>,
    #[serde(default)]
    pub lines: Vec<RequestLineInput>,
}
