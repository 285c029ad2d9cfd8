use serde::{Deserialize, Serialize};

/// Bid status.
///
/// ```text
/// DRAFT → SUBMITTED → APPROVED → REJECTED
///       ↘           ↘ REJECTED
///         APPROVED / REJECTED
/// ```
///
/// Nothing leaves APPROVED except rejection, nothing leaves REJECTED.
/// At most one bid per RFQ is APPROVED at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether a caller may move a bid from `self` to `next`.
    /// Rewriting the current status is allowed and idempotent.
    pub fn can_transition_to(&self, next: BidStatus) -> bool {
        use BidStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Draft, Submitted | Approved | Rejected)
                | (Submitted, Approved | Rejected)
                | (Approved, Rejected)
        )
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One vendor's quotation against one RFQ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    #[serde(default)]
    pub id: String,

    /// "Bid for RFQ00001 - Acme". Set once at creation.
    #[serde(default)]
    pub name: String,

    pub rfq_id: String,

    pub vendor_id: String,

    /// Quoted unit price.
    pub price_unit: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_days: Option<u32>,

    /// Last day the bid is valid (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_deadline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub status: BidStatus,

    /// Only the approval transition sets this.
    #[serde(default)]
    pub is_winner: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_at: Option<String>,
}

/// Bid name derived from the RFQ reference and vendor name.
pub fn bid_name(rfq_name: &str, vendor_name: &str) -> String {
    format!("Bid for {rfq_name} - {vendor_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        use BidStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Approved));

        assert!(!Approved.can_transition_to(Draft));
        assert!(!Approved.can_transition_to(Submitted));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Draft));
        assert!(!Submitted.can_transition_to(Draft));
    }

    #[test]
    fn status_wire_format() {
        assert_eq!(serde_json::to_string(&BidStatus::Approved).unwrap(), "\"APPROVED\"");
        let s: BidStatus = serde_json::from_str("\"SUBMITTED\"").unwrap();
        assert_eq!(s, BidStatus::Submitted);
    }

    #[test]
    fn name_format() {
        assert_eq!(bid_name("RFQ00007", "Acme Corp"), "Bid for RFQ00007 - Acme Corp");
    }

    #[test]
    fn is_winner_defaults_false() {
        let json = r#"{"rfqId":"r1","vendorId":"v1","priceUnit":12.5}"#;
        let bid: Bid = serde_json::from_str(json).unwrap();
        assert!(!bid.is_winner);
        assert_eq!(bid.status, BidStatus::Draft);
    }
}
