use tracing::{debug, info};

use openerp_core::{new_id, now_rfc3339, ListParams, ListResult, RoleChecker, ServiceError};
use openerp_sql::{Statement, Value};

use super::sequence::{PURCHASE_ORDER, PURCHASE_RFQ};
use super::PurchaseService;
use crate::model::{
    Bid, BidStatus, CreateRfq, OrderLine, PurchaseOrder, Rfq, RfqLine, RfqStatus, Vendor,
};
use crate::roles;

/// Model name of purchase orders in the message log.
pub const PURCHASE_ORDER_MODEL: &str = "purchase.order";

/// Filters for [`PurchaseService::list_rfqs`].
#[derive(Debug, Clone, Default)]
pub struct RfqFilter {
    pub status: Option<RfqStatus>,
    pub vendor_id: Option<String>,
}

/// Flat, ordered vendor list without duplicates or blanks.
pub(crate) fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if !id.is_empty() && !out.iter().any(|o| o == id) {
            out.push(id.to_string());
        }
    }
    out
}

fn validate_lines(lines: &mut [RfqLine]) -> Result<(), ServiceError> {
    for line in lines.iter_mut() {
        if line.product_id.trim().is_empty() {
            return Err(ServiceError::Validation("RFQ line product is required".into()));
        }
        if line.product_qty <= 0.0 {
            return Err(ServiceError::Validation(format!(
                "quantity of '{}' must be positive",
                line.product_id
            )));
        }
        if line.price_unit < 0.0 {
            return Err(ServiceError::Validation(format!(
                "price of '{}' cannot be negative",
                line.product_id
            )));
        }
        if line.name.trim().is_empty() {
            line.name = line.product_id.clone();
        }
    }
    Ok(())
}

impl PurchaseService {
    /// Validate a creation payload and build the RFQ. Draws a reference
    /// from the sequence but writes nothing else.
    pub(crate) fn prepare_rfq(&self, input: CreateRfq) -> Result<Rfq, ServiceError> {
        let vendor_ids = dedup_ids(&input.vendor_ids);
        let origin = input.origin.filter(|o| !o.trim().is_empty());
        if vendor_ids.is_empty() && origin.is_none() {
            return Err(ServiceError::Validation(
                "You must select at least one vendor before saving this RFQ".into(),
            ));
        }
        for id in &vendor_ids {
            self.require_supplier(id)?;
        }

        let mut lines = input.lines;
        validate_lines(&mut lines)?;

        let now = now_rfc3339();
        Ok(Rfq {
            id: new_id(),
            name: self.sequence.next_value(PURCHASE_RFQ)?,
            vendor_id: vendor_ids.first().cloned(),
            vendor_ids,
            origin,
            lines,
            status: RfqStatus::Draft,
            winning_vendor_id: None,
            notes: input.notes,
            create_at: Some(now.clone()),
            update_at: Some(now),
        })
    }

    /// Create one RFQ inviting every listed vendor. The first vendor is
    /// the primary one.
    pub fn create_rfq(&self, input: CreateRfq) -> Result<Rfq, ServiceError> {
        let _guard = self.write_guard()?;
        let rfq = self.prepare_rfq(input)?;
        self.commit(&[Self::insert_stmt(&rfq)?])?;
        info!(rfq = %rfq.name, vendors = rfq.vendor_ids.len(), "RFQ created");
        Ok(rfq)
    }

    /// Create one RFQ per listed vendor, each with that vendor as its only
    /// vendor and no candidate list. All RFQs are committed together.
    ///
    /// With no vendors, or with an origin document, this behaves like
    /// [`create_rfq`](Self::create_rfq) and keeps the candidate list.
    pub fn split_rfq_per_vendor(&self, input: CreateRfq) -> Result<Vec<Rfq>, ServiceError> {
        let _guard = self.write_guard()?;

        let vendor_ids = dedup_ids(&input.vendor_ids);
        let has_origin = input.origin.as_deref().is_some_and(|o| !o.trim().is_empty());
        let rfqs = if vendor_ids.is_empty() || has_origin {
            vec![self.prepare_rfq(input)?]
        } else {
            vendor_ids
                .into_iter()
                .map(|vendor_id| {
                    let mut rfq = self.prepare_rfq(CreateRfq {
                        vendor_ids: vec![vendor_id],
                        ..input.clone()
                    })?;
                    rfq.vendor_ids.clear();
                    Ok(rfq)
                })
                .collect::<Result<Vec<_>, ServiceError>>()?
        };

        let stmts = rfqs
            .iter()
            .map(Self::insert_stmt)
            .collect::<Result<Vec<_>, _>>()?;
        self.commit(&stmts)?;
        info!(count = rfqs.len(), "RFQs created per vendor");
        Ok(rfqs)
    }

    pub fn get_rfq(&self, id: &str) -> Result<Rfq, ServiceError> {
        self.get(id)
    }

    pub fn list_rfqs(
        &self,
        filter: &RfqFilter,
        params: &ListParams,
    ) -> Result<ListResult<Rfq>, ServiceError> {
        let mut filters: Vec<(&str, Value)> = Vec::new();
        if let Some(status) = filter.status {
            filters.push(("status", status.as_str().into()));
        }
        if let Some(vendor_id) = &filter.vendor_id {
            filters.push(("vendor_id", vendor_id.clone().into()));
        }
        self.list(&filters, params)
    }

    /// Bids received for an RFQ, oldest first.
    pub fn rfq_bids(&self, rfq_id: &str) -> Result<Vec<Bid>, ServiceError> {
        self.get::<Rfq>(rfq_id)?;
        self.bids_of(rfq_id)
    }

    pub(crate) fn bids_of(&self, rfq_id: &str) -> Result<Vec<Bid>, ServiceError> {
        self.find(&[("rfq_id", rfq_id.into())])
    }

    /// Delete a draft RFQ together with its bids.
    pub fn delete_rfq(&self, id: &str) -> Result<(), ServiceError> {
        let _guard = self.write_guard()?;
        let rfq: Rfq = self.get(id)?;
        if rfq.status == RfqStatus::Done {
            return Err(ServiceError::Validation(format!(
                "RFQ {} is confirmed and cannot be deleted",
                rfq.name
            )));
        }
        self.commit(&[Self::delete_stmt::<Rfq>(id)])?;
        info!(rfq = %rfq.name, "RFQ deleted");
        Ok(())
    }

    /// Confirm an RFQ: check that exactly one bid is approved, generate the
    /// purchase order at the winning price and mark the RFQ done.
    ///
    /// An RFQ raised from an origin document needs candidate vendors.
    /// Nothing is written unless every check passes.
    pub fn confirm_rfq(
        &self,
        actor: &dyn RoleChecker,
        id: &str,
    ) -> Result<PurchaseOrder, ServiceError> {
        actor.require_role(roles::PROCUREMENT_OFFICER, "confirming an RFQ")?;
        let _guard = self.write_guard()?;

        let mut rfq: Rfq = self.get(id)?;
        if rfq.status == RfqStatus::Done {
            return Err(ServiceError::Validation(format!(
                "RFQ {} is already confirmed",
                rfq.name
            )));
        }

        if rfq.origin.is_some() && rfq.vendor_ids.is_empty() {
            return Err(ServiceError::Validation(format!(
                "please select at least one vendor before confirming {}",
                rfq.name
            )));
        }

        let bids = self.bids_of(&rfq.id)?;
        if bids.is_empty() {
            return Err(ServiceError::Validation(format!(
                "no bids received for {}",
                rfq.name
            )));
        }

        let approved: Vec<&Bid> = bids
            .iter()
            .filter(|b| b.status == BidStatus::Approved)
            .collect();
        let mut winner = match approved.as_slice() {
            [] => {
                return Err(ServiceError::Validation(format!(
                    "must approve at least one bid before confirming {}",
                    rfq.name
                )))
            }
            [only] => (*only).clone(),
            _ => {
                return Err(ServiceError::Validation(format!(
                    "only one bid may be approved for {}, found {}",
                    rfq.name,
                    approved.len()
                )))
            }
        };
        let vendor: Vendor = self.get(&winner.vendor_id)?;

        let now = now_rfc3339();
        winner.is_winner = true;
        winner.update_at = Some(now.clone());

        let lines: Vec<OrderLine> = rfq
            .lines
            .iter()
            .map(|line| {
                let price_unit = if winner.price_unit > 0.0 {
                    winner.price_unit
                } else {
                    line.price_unit
                };
                OrderLine {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    product_qty: line.product_qty,
                    product_uom: line.product_uom.clone(),
                    price_unit,
                    date_planned: line.date_planned.clone(),
                    price_subtotal: line.product_qty * price_unit,
                }
            })
            .collect();
        let order = PurchaseOrder {
            id: new_id(),
            name: self.sequence.next_value(PURCHASE_ORDER)?,
            vendor_id: vendor.id.clone(),
            origin: Some(rfq.name.clone()),
            amount_total: lines.iter().map(|l| l.price_subtotal).sum(),
            lines,
            create_at: Some(now.clone()),
        };

        rfq.status = RfqStatus::Done;
        rfq.vendor_id = Some(vendor.id.clone());
        rfq.winning_vendor_id = Some(vendor.id.clone());
        rfq.update_at = Some(now);

        let stmts: Vec<Statement> = vec![
            Self::update_stmt(&winner)?,
            Self::insert_stmt(&order)?,
            Self::update_stmt(&rfq)?,
        ];
        self.commit(&stmts)?;

        self.messages.post_message(
            PURCHASE_ORDER_MODEL,
            &order.id,
            &format!(
                "Purchase Order automatically generated from RFQ <b>{}</b> for winning vendor <b>{}</b> at price {:.2}",
                rfq.name, vendor.name, winner.price_unit
            ),
        );
        info!(rfq = %rfq.name, order = %order.name, vendor = %vendor.name, "RFQ confirmed");
        debug!(order = %order.name, amount = order.amount_total, lines = order.lines.len(), "purchase order generated");
        Ok(order)
    }

    pub fn get_purchase_order(&self, id: &str) -> Result<PurchaseOrder, ServiceError> {
        self.get(id)
    }

    pub fn list_purchase_orders(
        &self,
        origin: Option<&str>,
        params: &ListParams,
    ) -> Result<ListResult<PurchaseOrder>, ServiceError> {
        let filters: Vec<(&str, Value)> = origin
            .map(|o| vec![("origin", o.into())])
            .unwrap_or_default();
        self.list(&filters, params)
    }
}
