use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use openerp_core::{merge_patch, new_id, now_rfc3339, strip_fields, RoleChecker, ServiceError};
use openerp_sql::Statement;

use super::lifecycle::{plan_status_change, WriteMode};
use super::winner::winning_vendor;
use super::PurchaseService;
use crate::model::{bid_name, Bid, BidStatus, Rfq, RfqStatus};
use crate::roles;

/// Fields a bid patch can never change.
const PROTECTED_FIELDS: &[&str] = &["id", "name", "rfqId", "vendorId", "status", "isWinner", "createAt"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBid {
    #[serde(default)]
    pub rfq_id: String,
    #[serde(default)]
    pub vendor_id: String,
    #[serde(default)]
    pub price_unit: f64,
    #[serde(default)]
    pub delivery_days: Option<u32>,
    #[serde(default)]
    pub date_deadline: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn validate_terms(bid: &Bid) -> Result<(), ServiceError> {
    if !bid.price_unit.is_finite() || bid.price_unit < 0.0 {
        return Err(ServiceError::Validation(
            "bid price must be a non-negative number".into(),
        ));
    }
    if let Some(deadline) = &bid.date_deadline {
        NaiveDate::parse_from_str(deadline, "%Y-%m-%d").map_err(|_| {
            ServiceError::Validation(format!("invalid deadline '{deadline}', expected YYYY-MM-DD"))
        })?;
    }
    Ok(())
}

fn ensure_open(rfq: &Rfq) -> Result<(), ServiceError> {
    if rfq.status == RfqStatus::Done {
        return Err(ServiceError::Validation(format!(
            "RFQ {} is confirmed, its bids can no longer change",
            rfq.name
        )));
    }
    Ok(())
}

impl PurchaseService {
    /// Record a vendor's quotation. The bid starts in DRAFT.
    pub fn create_bid(&self, input: CreateBid) -> Result<Bid, ServiceError> {
        let _guard = self.write_guard()?;

        let rfq: Rfq = self.require_ref(&input.rfq_id, "RFQ")?;
        let vendor = self.require_supplier(&input.vendor_id)?;
        ensure_open(&rfq)?;

        let now = now_rfc3339();
        let bid = Bid {
            id: new_id(),
            name: bid_name(&rfq.name, &vendor.name),
            rfq_id: rfq.id,
            vendor_id: vendor.id,
            price_unit: input.price_unit,
            delivery_days: input.delivery_days,
            date_deadline: input.date_deadline.filter(|d| !d.is_empty()),
            remarks: input.remarks,
            notes: input.notes,
            status: BidStatus::Draft,
            is_winner: false,
            create_at: Some(now.clone()),
            update_at: Some(now),
        };
        validate_terms(&bid)?;

        self.commit(&[Self::insert_stmt(&bid)?])?;
        info!(bid = %bid.id, name = %bid.name, price = bid.price_unit, "bid created");
        Ok(bid)
    }

    pub fn get_bid(&self, id: &str) -> Result<Bid, ServiceError> {
        self.get(id)
    }

    /// Move a bid to `status`.
    ///
    /// Approving needs the procurement officer role, fails with `Conflict`
    /// while another bid of the RFQ is approved, and otherwise rejects all
    /// siblings, flags the bid as winner and makes its vendor the RFQ's
    /// primary vendor. The RFQ's winning vendor is recomputed after every
    /// change. Returns the updated bid.
    pub fn update_bid_status(
        &self,
        actor: &dyn RoleChecker,
        id: &str,
        status: BidStatus,
    ) -> Result<Bid, ServiceError> {
        if status == BidStatus::Approved {
            actor.require_role(roles::PROCUREMENT_OFFICER, "approving a bid")?;
        }
        let _guard = self.write_guard()?;

        let bid: Bid = self.get(id)?;
        let mut rfq: Rfq = self.get(&bid.rfq_id)?;
        ensure_open(&rfq)?;

        let siblings = self.bids_of(&rfq.id)?;
        let mut plan = plan_status_change(&bid, &siblings, status, WriteMode::Normal)?;

        let now = now_rfc3339();
        for planned in plan.bids.iter_mut() {
            planned.update_at = Some(now.clone());
        }
        rfq.winning_vendor_id = winning_vendor(&plan.project(&siblings));
        if let Some(vendor_id) = plan.primary_vendor.take() {
            rfq.vendor_id = Some(vendor_id);
        }
        rfq.update_at = Some(now);

        let mut stmts = plan
            .bids
            .iter()
            .map(Self::update_stmt)
            .collect::<Result<Vec<Statement>, _>>()?;
        stmts.push(Self::update_stmt(&rfq)?);
        self.commit(&stmts)?;

        info!(bid = %bid.id, rfq = %rfq.name, from = %bid.status, to = %status, "bid status changed");
        if plan.bids.len() > 1 {
            debug!(rfq = %rfq.name, rejected = plan.bids.len() - 1, "sibling bids rejected");
        }

        plan.bids
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Internal("empty status plan".into()))
    }

    /// Merge-patch the commercial terms of a bid. Identity, status and the
    /// winner flag are ignored if present in the patch.
    pub fn update_bid(&self, id: &str, mut patch: serde_json::Value) -> Result<Bid, ServiceError> {
        if !patch.is_object() {
            return Err(ServiceError::Validation("patch must be a JSON object".into()));
        }
        let _guard = self.write_guard()?;

        let bid: Bid = self.get(id)?;
        let rfq: Rfq = self.get(&bid.rfq_id)?;
        ensure_open(&rfq)?;

        strip_fields(&mut patch, PROTECTED_FIELDS);
        let mut doc =
            serde_json::to_value(&bid).map_err(|e| ServiceError::Internal(e.to_string()))?;
        merge_patch(&mut doc, &patch);
        let mut updated: Bid = serde_json::from_value(doc)
            .map_err(|e| ServiceError::Validation(format!("invalid bid patch: {e}")))?;
        updated.date_deadline = updated.date_deadline.filter(|d| !d.is_empty());
        updated.update_at = Some(now_rfc3339());
        validate_terms(&updated)?;

        self.commit(&[Self::update_stmt(&updated)?])?;
        debug!(bid = %updated.id, "bid updated");
        Ok(updated)
    }

    /// Delete a bid of an open RFQ and recompute the RFQ's winning vendor.
    pub fn delete_bid(&self, id: &str) -> Result<(), ServiceError> {
        let _guard = self.write_guard()?;

        let bid: Bid = self.get(id)?;
        let mut rfq: Rfq = self.get(&bid.rfq_id)?;
        ensure_open(&rfq)?;

        let remaining: Vec<Bid> = self
            .bids_of(&rfq.id)?
            .into_iter()
            .filter(|b| b.id != bid.id)
            .collect();
        rfq.winning_vendor_id = winning_vendor(&remaining);
        rfq.update_at = Some(now_rfc3339());

        self.commit(&[Self::delete_stmt::<Bid>(&bid.id), Self::update_stmt(&rfq)?])?;
        info!(bid = %bid.id, rfq = %rfq.name, "bid deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vendor;
    use crate::service::test_support::*;
    use serde_json::json;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn quote(svc: &PurchaseService, rfq: &Rfq, vendor: &Vendor, price: f64) -> Bid {
        svc.create_bid(CreateBid {
            rfq_id: rfq.id.clone(),
            vendor_id: vendor.id.clone(),
            price_unit: price,
            delivery_days: Some(7),
            ..Default::default()
        })
        .unwrap()
    }

    fn approved_count(svc: &PurchaseService, rfq: &Rfq) -> usize {
        svc.rfq_bids(&rfq.id)
            .unwrap()
            .iter()
            .filter(|b| b.status == BidStatus::Approved)
            .count()
    }

    #[test]
    fn create_names_bid_and_starts_draft() {
        let svc = service();
        let acme = vendor(&svc, "Acme Corp");
        let rfq = rfq(&svc, &[&acme]);
        let bid = quote(&svc, &rfq, &acme, 99.5);

        assert_eq!(bid.name, format!("Bid for {} - Acme Corp", rfq.name));
        assert_eq!(bid.status, BidStatus::Draft);
        assert!(!bid.is_winner);
        assert_eq!(svc.get_bid(&bid.id).unwrap(), bid);
    }

    #[test]
    fn create_requires_rfq_and_vendor() {
        let svc = service();
        let acme = vendor(&svc, "Acme");
        let rfq = rfq(&svc, &[&acme]);

        let missing_rfq = svc.create_bid(CreateBid {
            vendor_id: acme.id.clone(),
            ..Default::default()
        });
        assert!(matches!(missing_rfq, Err(ServiceError::Validation(_))));

        let unknown_vendor = svc.create_bid(CreateBid {
            rfq_id: rfq.id.clone(),
            vendor_id: "ghost".into(),
            ..Default::default()
        });
        assert!(matches!(unknown_vendor, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn create_validates_terms() {
        let svc = service();
        let acme = vendor(&svc, "Acme");
        let rfq = rfq(&svc, &[&acme]);
        let err = svc
            .create_bid(CreateBid {
                rfq_id: rfq.id.clone(),
                vendor_id: acme.id.clone(),
                price_unit: 10.0,
                date_deadline: Some("next friday".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("invalid deadline"));

        let err = svc
            .create_bid(CreateBid {
                rfq_id: rfq.id.clone(),
                vendor_id: acme.id.clone(),
                price_unit: -1.0,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn approval_selects_winner_and_rejects_siblings() {
        let svc = service();
        let (a, b, c) = (vendor(&svc, "A"), vendor(&svc, "B"), vendor(&svc, "C"));
        let rfq = rfq(&svc, &[&a, &b, &c]);
        let bid_a = quote(&svc, &rfq, &a, 110.0);
        let bid_b = quote(&svc, &rfq, &b, 100.0);
        let bid_c = quote(&svc, &rfq, &c, 120.0);
        svc.update_bid_status(&officer(), &bid_a.id, BidStatus::Submitted).unwrap();

        let approved = svc
            .update_bid_status(&officer(), &bid_b.id, BidStatus::Approved)
            .unwrap();
        assert!(approved.is_winner);
        assert_eq!(approved.status, BidStatus::Approved);

        for id in [&bid_a.id, &bid_c.id] {
            let sibling = svc.get_bid(id).unwrap();
            assert_eq!(sibling.status, BidStatus::Rejected);
            assert!(!sibling.is_winner);
        }
        assert_eq!(approved_count(&svc, &rfq), 1);

        let rfq = svc.get_rfq(&rfq.id).unwrap();
        assert_eq!(rfq.vendor_id.as_deref(), Some(b.id.as_str()));
        assert_eq!(rfq.winning_vendor_id.as_deref(), Some(b.id.as_str()));
    }

    #[test]
    fn second_approval_conflicts_and_changes_nothing() {
        let svc = service();
        let (a, b) = (vendor(&svc, "A"), vendor(&svc, "B"));
        let rfq = rfq(&svc, &[&a, &b]);
        let bid_a = quote(&svc, &rfq, &a, 110.0);
        svc.update_bid_status(&officer(), &bid_a.id, BidStatus::Approved).unwrap();

        // a late bid arrives after the approval
        let late = quote(&svc, &rfq, &b, 90.0);
        let before = svc.rfq_bids(&rfq.id).unwrap();

        let err = svc
            .update_bid_status(&officer(), &late.id, BidStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.rfq_bids(&rfq.id).unwrap(), before);
        assert_eq!(approved_count(&svc, &rfq), 1);
    }

    #[test]
    fn approval_requires_officer() {
        let svc = service();
        let a = vendor(&svc, "A");
        let rfq = rfq(&svc, &[&a]);
        let bid = quote(&svc, &rfq, &a, 10.0);

        let err = svc
            .update_bid_status(&employee(), &bid.id, BidStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));

        // other transitions are open to everyone
        let submitted = svc
            .update_bid_status(&employee(), &bid.id, BidStatus::Submitted)
            .unwrap();
        assert_eq!(submitted.status, BidStatus::Submitted);
    }

    #[test]
    fn rejecting_winner_clears_winning_vendor() {
        let svc = service();
        let a = vendor(&svc, "A");
        let rfq = rfq(&svc, &[&a]);
        let bid = quote(&svc, &rfq, &a, 10.0);

        svc.update_bid_status(&officer(), &bid.id, BidStatus::Approved).unwrap();
        assert!(svc.get_rfq(&rfq.id).unwrap().winning_vendor_id.is_some());

        let rejected = svc
            .update_bid_status(&officer(), &bid.id, BidStatus::Rejected)
            .unwrap();
        assert!(!rejected.is_winner);
        assert!(svc.get_rfq(&rfq.id).unwrap().winning_vendor_id.is_none());
    }

    #[test]
    fn no_way_back_to_draft() {
        let svc = service();
        let a = vendor(&svc, "A");
        let rfq = rfq(&svc, &[&a]);
        let bid = quote(&svc, &rfq, &a, 10.0);
        svc.update_bid_status(&officer(), &bid.id, BidStatus::Rejected).unwrap();

        let err = svc
            .update_bid_status(&officer(), &bid.id, BidStatus::Draft)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn patch_ignores_protected_fields() {
        let svc = service();
        let a = vendor(&svc, "A");
        let rfq = rfq(&svc, &[&a]);
        let bid = quote(&svc, &rfq, &a, 10.0);

        let updated = svc
            .update_bid(
                &bid.id,
                json!({
                    "priceUnit": 8.75,
                    "remarks": "free shipping",
                    "status": "APPROVED",
                    "isWinner": true,
                    "name": "renamed",
                }),
            )
            .unwrap();
        assert_eq!(updated.price_unit, 8.75);
        assert_eq!(updated.remarks.as_deref(), Some("free shipping"));
        assert_eq!(updated.status, BidStatus::Draft);
        assert!(!updated.is_winner);
        assert_eq!(updated.name, bid.name);
    }

    #[test]
    fn patch_with_blank_deadline_clears_it() {
        let svc = service();
        let a = vendor(&svc, "A");
        let rfq = rfq(&svc, &[&a]);
        let bid = svc
            .create_bid(CreateBid {
                rfq_id: rfq.id.clone(),
                vendor_id: a.id.clone(),
                price_unit: 10.0,
                date_deadline: Some("2026-12-01".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(bid.date_deadline.as_deref(), Some("2026-12-01"));

        let updated = svc.update_bid(&bid.id, json!({"dateDeadline": ""})).unwrap();
        assert!(updated.date_deadline.is_none());
        assert!(svc.get_bid(&bid.id).unwrap().date_deadline.is_none());
    }

    #[test]
    fn bid_vendor_must_be_supplier() {
        let svc = service();
        let a = vendor(&svc, "A");
        let walk_in = customer(&svc, "Walk-in");
        let rfq = rfq(&svc, &[&a]);

        let err = svc
            .create_bid(CreateBid {
                rfq_id: rfq.id.clone(),
                vendor_id: walk_in.id.clone(),
                price_unit: 10.0,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(err.to_string().contains("is not a supplier"));
        assert!(svc.rfq_bids(&rfq.id).unwrap().is_empty());
    }

    #[test]
    fn concurrent_approvals_leave_one_winner() {
        let svc = Arc::new(service());
        let (a, b) = (vendor(&svc, "A"), vendor(&svc, "B"));
        let rfq = rfq(&svc, &[&a, &b]);
        let bids = [quote(&svc, &rfq, &a, 100.0), quote(&svc, &rfq, &b, 95.0)];
        let barrier = Barrier::new(bids.len());

        let results: Vec<Result<Bid, ServiceError>> = thread::scope(|s| {
            let handles: Vec<_> = bids
                .iter()
                .map(|bid| {
                    let svc = Arc::clone(&svc);
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        svc.update_bid_status(&officer(), &bid.id, BidStatus::Approved)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // the loser either saw the approval or had already been rejected by it
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(approved_count(&svc, &rfq), 1);

        let winner = results.into_iter().find_map(Result::ok).unwrap();
        let loser = bids.iter().find(|b| b.id != winner.id).unwrap();
        assert_eq!(svc.get_bid(&loser.id).unwrap().status, BidStatus::Rejected);
        let rfq = svc.get_rfq(&rfq.id).unwrap();
        assert_eq!(rfq.winning_vendor_id.as_deref(), Some(winner.vendor_id.as_str()));
        let order = svc.confirm_rfq(&officer(), &rfq.id).unwrap();
        assert_eq!(order.vendor_id, winner.vendor_id);
    }

    #[test]
    fn bids_frozen_after_confirmation() {
        let svc = service();
        let a = vendor(&svc, "A");
        let rfq = rfq(&svc, &[&a]);
        let bid = quote(&svc, &rfq, &a, 10.0);
        svc.update_bid_status(&officer(), &bid.id, BidStatus::Approved).unwrap();
        svc.confirm_rfq(&officer(), &rfq.id).unwrap();

        assert!(svc.update_bid(&bid.id, json!({"priceUnit": 1.0})).is_err());
        assert!(svc
            .update_bid_status(&officer(), &bid.id, BidStatus::Rejected)
            .is_err());
        assert!(svc.delete_bid(&bid.id).is_err());
        let late = svc.create_bid(CreateBid {
            rfq_id: rfq.id.clone(),
            vendor_id: a.id.clone(),
            price_unit: 5.0,
            ..Default::default()
        });
        assert!(matches!(late, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn deleting_winner_recomputes() {
        let svc = service();
        let a = vendor(&svc, "A");
        let rfq = rfq(&svc, &[&a]);
        let bid = quote(&svc, &rfq, &a, 10.0);
        svc.update_bid_status(&officer(), &bid.id, BidStatus::Approved).unwrap();

        svc.delete_bid(&bid.id).unwrap();
        assert!(svc.get_rfq(&rfq.id).unwrap().winning_vendor_id.is_none());
        assert!(svc.rfq_bids(&rfq.id).unwrap().is_empty());
    }
}
