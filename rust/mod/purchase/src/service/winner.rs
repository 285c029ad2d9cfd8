use crate::model::{Bid, BidStatus};

/// Vendor of the unique approved winning bid, `None` when there is no such
/// bid or more than one.
pub fn winning_vendor(bids: &[Bid]) -> Option<String> {
    let mut winners = bids
        .iter()
        .filter(|b| b.status == BidStatus::Approved && b.is_winner);
    match (winners.next(), winners.next()) {
        (Some(bid), None) => Some(bid.vendor_id.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(vendor: &str, status: BidStatus, is_winner: bool) -> Bid {
        Bid {
            id: vendor.into(),
            name: String::new(),
            rfq_id: "r1".into(),
            vendor_id: vendor.into(),
            price_unit: 1.0,
            delivery_days: None,
            date_deadline: None,
            remarks: None,
            notes: None,
            status,
            is_winner,
            create_at: None,
            update_at: None,
        }
    }

    #[test]
    fn single_winner() {
        let bids = [
            bid("acme", BidStatus::Approved, true),
            bid("globex", BidStatus::Rejected, false),
        ];
        assert_eq!(winning_vendor(&bids).as_deref(), Some("acme"));
    }

    #[test]
    fn no_winner() {
        assert_eq!(winning_vendor(&[]), None);
        // approved but not flagged
        assert_eq!(winning_vendor(&[bid("acme", BidStatus::Approved, false)]), None);
        // flagged but not approved
        assert_eq!(winning_vendor(&[bid("acme", BidStatus::Submitted, true)]), None);
    }

    #[test]
    fn ambiguous_winner() {
        let bids = [
            bid("acme", BidStatus::Approved, true),
            bid("globex", BidStatus::Approved, true),
        ];
        assert_eq!(winning_vendor(&bids), None);
    }
}
