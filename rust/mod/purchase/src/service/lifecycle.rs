//! Bid status transitions and the single-approved-bid rule.
//!
//! Planning is pure: it takes the bid, its siblings on the same RFQ and the
//! requested status, and returns every bid that must be rewritten. The
//! caller persists the plan in one transaction.

use openerp_core::ServiceError;

use crate::model::{Bid, BidStatus};

/// How a status write is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Caller-initiated. Transition rules, the single-approved check and
    /// the winner side effect all apply.
    Normal,
    /// Sibling rejection triggered by an approval. No checks, no side
    /// effects.
    CascadingRejection,
}

/// Outcome of a status change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusPlan {
    /// Bids to rewrite, the target bid first.
    pub bids: Vec<Bid>,
    /// New primary vendor of the RFQ, set when a bid was approved.
    pub primary_vendor: Option<String>,
}

impl StatusPlan {
    /// `current` with the planned rewrites applied, in the same order.
    pub fn project(&self, current: &[Bid]) -> Vec<Bid> {
        current
            .iter()
            .map(|b| {
                self.bids
                    .iter()
                    .find(|p| p.id == b.id)
                    .unwrap_or(b)
                    .clone()
            })
            .collect()
    }
}

/// Plan moving `bid` to `status`. `siblings` are all bids of the same RFQ
/// and may include `bid` itself.
pub fn plan_status_change(
    bid: &Bid,
    siblings: &[Bid],
    status: BidStatus,
    mode: WriteMode,
) -> Result<StatusPlan, ServiceError> {
    let mut plan = StatusPlan::default();
    apply(&mut plan, bid, siblings, status, mode)?;
    Ok(plan)
}

fn apply(
    plan: &mut StatusPlan,
    bid: &Bid,
    siblings: &[Bid],
    status: BidStatus,
    mode: WriteMode,
) -> Result<(), ServiceError> {
    if mode == WriteMode::Normal {
        if !bid.status.can_transition_to(status) {
            return Err(ServiceError::Validation(format!(
                "bid '{}' cannot move from {} to {}",
                bid.name, bid.status, status
            )));
        }
        if status == BidStatus::Approved {
            if let Some(other) = siblings
                .iter()
                .find(|b| b.id != bid.id && b.status == BidStatus::Approved)
            {
                return Err(ServiceError::Conflict(format!(
                    "only one bid may be approved per RFQ: '{}' is already approved",
                    other.name
                )));
            }
        }
    }

    let mut updated = bid.clone();
    updated.status = status;

    if status == BidStatus::Approved && mode == WriteMode::Normal {
        updated.is_winner = true;
        plan.primary_vendor = Some(updated.vendor_id.clone());
        plan.bids.push(updated);

        for sibling in siblings.iter().filter(|b| b.id != bid.id) {
            if sibling.status == BidStatus::Rejected && !sibling.is_winner {
                continue;
            }
            apply(
                plan,
                sibling,
                siblings,
                BidStatus::Rejected,
                WriteMode::CascadingRejection,
            )?;
        }
    } else {
        if status != BidStatus::Approved {
            updated.is_winner = false;
        }
        plan.bids.push(updated);
    }
    Ok(())
}
