use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use openerp_core::{new_id, now_rfc3339, ListParams, ListResult, RoleChecker, ServiceError};
use openerp_sql::Value;

use super::rfq::dedup_ids;
use super::sequence::PURCHASE_REQUEST;
use super::PurchaseService;
use crate::model::{
    CreateRequest, CreateRfq, LineFeedback, PurchaseRequest, RequestLine, RequestStatus, Rfq,
    RfqLine,
};
use crate::roles;

/// Model name of purchase requests in the message log.
pub const PURCHASE_REQUEST_MODEL: &str = "purchase.request";

/// Placeholder reference that asks for a sequence number.
const NEW_REFERENCE: &str = "New";

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn expect_status(
    request: &PurchaseRequest,
    expected: RequestStatus,
    action: &str,
) -> Result<(), ServiceError> {
    if request.status != expected {
        return Err(ServiceError::Validation(format!(
            "cannot {action} {}: status is {}, expected {}",
            request.name, request.status, expected
        )));
    }
    Ok(())
}

fn require_approved_lines(request: &PurchaseRequest) -> Result<(), ServiceError> {
    if request.approved_lines().next().is_none() {
        return Err(ServiceError::Validation(format!(
            "{} has no approved product lines",
            request.name
        )));
    }
    Ok(())
}

impl PurchaseService {
    /// Create a purchase request in DRAFT.
    ///
    /// Line feedback is only kept when `actor` is a procurement officer.
    pub fn create_request(
        &self,
        actor: &dyn RoleChecker,
        input: CreateRequest,
    ) -> Result<PurchaseRequest, ServiceError> {
        let _guard = self.write_guard()?;

        let officer = actor.has_role(roles::PROCUREMENT_OFFICER);
        let lines = input
            .lines
            .into_iter()
            .map(|line| {
                if line.product_id.trim().is_empty() {
                    return Err(ServiceError::Validation("request line product is required".into()));
                }
                if line.quantity <= 0.0 {
                    return Err(ServiceError::Validation(format!(
                        "quantity of '{}' must be positive",
                        line.product_id
                    )));
                }
                let feedback = match line.feedback {
                    Some(feedback) if officer => feedback,
                    _ => LineFeedback::Draft,
                };
                Ok(RequestLine {
                    id: new_id(),
                    product_id: line.product_id,
                    description: line.description,
                    quantity: line.quantity,
                    feedback,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        let request_date = match input.request_date.filter(|d| !d.is_empty()) {
            Some(date) => {
                NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
                    ServiceError::Validation(format!("invalid request date '{date}'"))
                })?;
                date
            }
            None => today(),
        };

        let vendor_ids = dedup_ids(&input.vendor_ids);
        for id in &vendor_ids {
            self.require_supplier(id)?;
        }

        let name = match input.name.map(|n| n.trim().to_string()) {
            Some(name) if !name.is_empty() && name != NEW_REFERENCE => {
                let taken = self.find::<PurchaseRequest>(&[("name", name.clone().into())])?;
                if !taken.is_empty() {
                    return Err(ServiceError::Conflict(format!(
                        "reference {name} already exists"
                    )));
                }
                name
            }
            _ => self.sequence.next_value(PURCHASE_REQUEST)?,
        };

        let now = now_rfc3339();
        let request = PurchaseRequest {
            id: new_id(),
            name,
            employee_id: input.employee_id,
            department_id: input.department_id,
            request_date,
            vendor_ids,
            lines,
            status: RequestStatus::Draft,
            rfq_id: None,
            create_at: Some(now.clone()),
            update_at: Some(now),
        };
        self.commit(&[Self::insert_stmt(&request)?])?;
        info!(request = %request.name, lines = request.lines.len(), "purchase request created");
        Ok(request)
    }

    pub fn get_request(&self, id: &str) -> Result<PurchaseRequest, ServiceError> {
        self.get(id)
    }

    pub fn list_requests(
        &self,
        status: Option<RequestStatus>,
        params: &ListParams,
    ) -> Result<ListResult<PurchaseRequest>, ServiceError> {
        let filters: Vec<(&str, Value)> = status
            .map(|s| vec![("status", s.as_str().into())])
            .unwrap_or_default();
        self.list(&filters, params)
    }

    /// Set the officer's verdict on one line. Ignored, returning the
    /// request unchanged, when `actor` is not a procurement officer.
    pub fn set_line_feedback(
        &self,
        actor: &dyn RoleChecker,
        request_id: &str,
        line_id: &str,
        feedback: LineFeedback,
    ) -> Result<PurchaseRequest, ServiceError> {
        let _guard = self.write_guard()?;
        let mut request: PurchaseRequest = self.get(request_id)?;

        if !actor.has_role(roles::PROCUREMENT_OFFICER) {
            debug!(request = %request.name, line = line_id, "line feedback ignored for non-officer");
            return Ok(request);
        }
        if request.status.is_terminal() {
            return Err(ServiceError::Validation(format!(
                "{} is {} and can no longer change",
                request.name, request.status
            )));
        }

        let line = request
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("line '{line_id}' not found in {request_id}"))
            })?;
        line.feedback = feedback;
        request.update_at = Some(now_rfc3339());

        self.commit(&[Self::update_stmt(&request)?])?;
        Ok(request)
    }

    /// DRAFT → SUBMITTED, by an employee.
    pub fn submit_request(
        &self,
        actor: &dyn RoleChecker,
        id: &str,
    ) -> Result<PurchaseRequest, ServiceError> {
        actor.require_role(roles::EMPLOYEE, "submitting a purchase request")?;
        let request = self.move_request(id, RequestStatus::Draft, RequestStatus::Submitted, "submit")?;
        self.messages.post_message(
            PURCHASE_REQUEST_MODEL,
            &request.id,
            &format!("Purchase request <b>{}</b> submitted for approval", request.name),
        );
        Ok(request)
    }

    /// SUBMITTED → APPROVED, by a procurement officer. At least one line
    /// must be approved.
    pub fn approve_request(
        &self,
        actor: &dyn RoleChecker,
        id: &str,
    ) -> Result<PurchaseRequest, ServiceError> {
        actor.require_role(roles::PROCUREMENT_OFFICER, "approving a purchase request")?;
        let _guard = self.write_guard()?;

        let mut request: PurchaseRequest = self.get(id)?;
        expect_status(&request, RequestStatus::Submitted, "approve")?;
        require_approved_lines(&request)?;

        request.status = RequestStatus::Approved;
        request.update_at = Some(now_rfc3339());
        self.commit(&[Self::update_stmt(&request)?])?;

        self.messages.post_message(
            PURCHASE_REQUEST_MODEL,
            &request.id,
            &format!("Purchase request <b>{}</b> approved", request.name),
        );
        info!(request = %request.name, "purchase request approved");
        Ok(request)
    }

    /// Turn an APPROVED request into an RFQ for its approved lines and move
    /// it to TO_RFQ. The RFQ invites the request's vendors, its origin is
    /// the request reference and its lines carry no price.
    pub fn create_rfq_from_request(
        &self,
        actor: &dyn RoleChecker,
        id: &str,
    ) -> Result<Rfq, ServiceError> {
        actor.require_role(roles::PROCUREMENT_OFFICER, "creating an RFQ from a request")?;
        let _guard = self.write_guard()?;

        let mut request: PurchaseRequest = self.get(id)?;
        expect_status(&request, RequestStatus::Approved, "create an RFQ for")?;
        require_approved_lines(&request)?;

        let planned = today();
        let lines = request
            .approved_lines()
            .map(|line| RfqLine {
                product_id: line.product_id.clone(),
                name: line
                    .description
                    .clone()
                    .unwrap_or_else(|| line.product_id.clone()),
                product_qty: line.quantity,
                product_uom: "Units".into(),
                price_unit: 0.0,
                date_planned: Some(planned.clone()),
            })
            .collect();
        let rfq = self.prepare_rfq(CreateRfq {
            vendor_ids: request.vendor_ids.clone(),
            origin: Some(request.name.clone()),
            lines,
            notes: None,
        })?;

        request.status = RequestStatus::ToRfq;
        request.rfq_id = Some(rfq.id.clone());
        request.update_at = Some(now_rfc3339());

        self.commit(&[Self::insert_stmt(&rfq)?, Self::update_stmt(&request)?])?;
        info!(request = %request.name, rfq = %rfq.name, "RFQ created from purchase request");
        Ok(rfq)
    }

    /// TO_RFQ → DONE, by a procurement officer.
    pub fn done_request(
        &self,
        actor: &dyn RoleChecker,
        id: &str,
    ) -> Result<PurchaseRequest, ServiceError> {
        actor.require_role(roles::PROCUREMENT_OFFICER, "completing a purchase request")?;
        self.move_request(id, RequestStatus::ToRfq, RequestStatus::Done, "complete")
    }

    /// Cancel a request that is neither done nor already cancelled.
    pub fn cancel_request(&self, id: &str) -> Result<PurchaseRequest, ServiceError> {
        let _guard = self.write_guard()?;

        let mut request: PurchaseRequest = self.get(id)?;
        if request.status.is_terminal() {
            return Err(ServiceError::Validation(format!(
                "cannot cancel {}: status is {}",
                request.name, request.status
            )));
        }
        request.status = RequestStatus::Cancelled;
        request.update_at = Some(now_rfc3339());
        self.commit(&[Self::update_stmt(&request)?])?;
        info!(request = %request.name, "purchase request cancelled");
        Ok(request)
    }

    fn move_request(
        &self,
        id: &str,
        from: RequestStatus,
        to: RequestStatus,
        action: &str,
    ) -> Result<PurchaseRequest, ServiceError> {
        let _guard = self.write_guard()?;

        let mut request: PurchaseRequest = self.get(id)?;
        expect_status(&request, from, action)?;
        request.status = to;
        request.update_at = Some(now_rfc3339());
        self.commit(&[Self::update_stmt(&request)?])?;
        info!(request = %request.name, %from, %to, "purchase request status changed");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BidStatus, RequestLineInput, RfqStatus, Vendor};
    use crate::service::bid::CreateBid;
    use crate::service::test_support::*;

    fn input(product: &str, qty: f64, feedback: Option<LineFeedback>) -> RequestLineInput {
        RequestLineInput {
            product_id: product.into(),
            description: Some(format!("{product} for the lab")),
            quantity: qty,
            feedback,
        }
    }

    fn draft(svc: &PurchaseService, vendors: &[&Vendor]) -> PurchaseRequest {
        svc.create_request(
            &employee(),
            CreateRequest {
                employee_id: Some("emp-1".into()),
                vendor_ids: vendors.iter().map(|v| v.id.clone()).collect(),
                lines: vec![input("p-scope", 2.0, None), input("p-probe", 10.0, None)],
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn create_assigns_reference_and_drops_employee_feedback() {
        let svc = service();
        let req = svc
            .create_request(
                &employee(),
                CreateRequest {
                    lines: vec![input("p-scope", 1.0, Some(LineFeedback::Approved))],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(req.name, "PR00001");
        assert_eq!(req.status, RequestStatus::Draft);
        assert_eq!(req.lines[0].feedback, LineFeedback::Draft);
        assert_eq!(req.request_date.len(), 10);

        let by_officer = svc
            .create_request(
                &officer(),
                CreateRequest {
                    name: Some(NEW_REFERENCE.into()),
                    lines: vec![input("p-scope", 1.0, Some(LineFeedback::Approved))],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(by_officer.name, "PR00002");
        assert_eq!(by_officer.lines[0].feedback, LineFeedback::Approved);
    }

    #[test]
    fn duplicate_reference_conflicts() {
        let svc = service();
        let make = || {
            svc.create_request(
                &employee(),
                CreateRequest {
                    name: Some("PR-LAB-7".into()),
                    ..Default::default()
                },
            )
        };
        make().unwrap();
        assert!(matches!(make(), Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let svc = service();
        let err = svc
            .create_request(
                &employee(),
                CreateRequest {
                    lines: vec![input("p-scope", 0.0, None)],
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn feedback_ignored_for_employees() {
        let svc = service();
        let req = draft(&svc, &[]);
        let line_id = req.lines[0].id.clone();

        let same = svc
            .set_line_feedback(&employee(), &req.id, &line_id, LineFeedback::Approved)
            .unwrap();
        assert_eq!(same.lines[0].feedback, LineFeedback::Draft);

        let set = svc
            .set_line_feedback(&officer(), &req.id, &line_id, LineFeedback::Instock)
            .unwrap();
        assert_eq!(set.lines[0].feedback, LineFeedback::Instock);
        assert_eq!(svc.get_request(&req.id).unwrap().lines[0].feedback, LineFeedback::Instock);
    }

    #[test]
    fn submit_requires_employee_and_draft() {
        let svc = service();
        let req = draft(&svc, &[]);

        let err = svc.submit_request(&officer(), &req.id).unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));

        let submitted = svc.submit_request(&employee(), &req.id).unwrap();
        assert_eq!(submitted.status, RequestStatus::Submitted);
        assert!(svc.submit_request(&employee(), &req.id).is_err());

        let messages = svc.list_messages(PURCHASE_REQUEST_MODEL, &req.id).unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn approve_needs_an_approved_line() {
        let svc = service();
        let req = draft(&svc, &[]);
        svc.submit_request(&employee(), &req.id).unwrap();

        let err = svc.approve_request(&officer(), &req.id).unwrap_err();
        assert!(err.to_string().contains("no approved product lines"));

        svc.set_line_feedback(&officer(), &req.id, &req.lines[1].id, LineFeedback::Approved)
            .unwrap();
        assert!(matches!(
            svc.approve_request(&employee(), &req.id),
            Err(ServiceError::PermissionDenied(_))
        ));
        let approved = svc.approve_request(&officer(), &req.id).unwrap();
        assert_eq!(approved.status, RequestStatus::Approved);
    }

    #[test]
    fn full_workflow_to_rfq_and_done() {
        let svc = service();
        let acme = vendor(&svc, "Acme");
        let globex = vendor(&svc, "Globex");
        let req = draft(&svc, &[&acme, &globex]);
        svc.set_line_feedback(&officer(), &req.id, &req.lines[0].id, LineFeedback::Approved)
            .unwrap();
        svc.set_line_feedback(&officer(), &req.id, &req.lines[1].id, LineFeedback::Instock)
            .unwrap();
        svc.submit_request(&employee(), &req.id).unwrap();
        svc.approve_request(&officer(), &req.id).unwrap();

        let rfq = svc.create_rfq_from_request(&officer(), &req.id).unwrap();
        assert_eq!(rfq.origin.as_deref(), Some(req.name.as_str()));
        assert_eq!(rfq.vendor_ids, vec![acme.id.clone(), globex.id.clone()]);
        assert_eq!(rfq.vendor_id.as_deref(), Some(acme.id.as_str()));
        assert_eq!(rfq.status, RfqStatus::Draft);
        assert_eq!(rfq.lines.len(), 1);
        assert_eq!(rfq.lines[0].product_id, "p-scope");
        assert_eq!(rfq.lines[0].price_unit, 0.0);
        assert!(rfq.lines[0].date_planned.is_some());

        let req = svc.get_request(&req.id).unwrap();
        assert_eq!(req.status, RequestStatus::ToRfq);
        assert_eq!(req.rfq_id.as_deref(), Some(rfq.id.as_str()));

        let done = svc.done_request(&officer(), &req.id).unwrap();
        assert_eq!(done.status, RequestStatus::Done);
        assert!(svc.cancel_request(&req.id).is_err());
    }

    #[test]
    fn rfq_from_request_without_vendors_uses_origin() {
        let svc = service();
        let req = svc
            .create_request(
                &officer(),
                CreateRequest {
                    lines: vec![input("p-scope", 1.0, Some(LineFeedback::Approved))],
                    ..Default::default()
                },
            )
            .unwrap();
        svc.submit_request(&employee(), &req.id).unwrap();
        svc.approve_request(&officer(), &req.id).unwrap();

        let rfq = svc.create_rfq_from_request(&officer(), &req.id).unwrap();
        assert!(rfq.vendor_id.is_none());
        assert_eq!(rfq.origin.as_deref(), Some("PR00001"));
    }

    #[test]
    fn rfq_from_request_without_vendors_cannot_be_confirmed() {
        let svc = service();
        let acme = vendor(&svc, "Acme");
        let req = svc
            .create_request(
                &officer(),
                CreateRequest {
                    lines: vec![input("p-scope", 1.0, Some(LineFeedback::Approved))],
                    ..Default::default()
                },
            )
            .unwrap();
        svc.submit_request(&employee(), &req.id).unwrap();
        svc.approve_request(&officer(), &req.id).unwrap();
        let rfq = svc.create_rfq_from_request(&officer(), &req.id).unwrap();
        assert!(rfq.vendor_ids.is_empty());

        let bid = svc
            .create_bid(CreateBid {
                rfq_id: rfq.id.clone(),
                vendor_id: acme.id.clone(),
                price_unit: 40.0,
                ..Default::default()
            })
            .unwrap();
        svc.update_bid_status(&officer(), &bid.id, BidStatus::Approved)
            .unwrap();

        let err = svc.confirm_rfq(&officer(), &rfq.id).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(err.to_string().contains("select at least one vendor"));
        assert_eq!(svc.get_rfq(&rfq.id).unwrap().status, RfqStatus::Draft);
        let orders = svc.list_purchase_orders(None, &ListParams::default()).unwrap();
        assert_eq!(orders.total, 0);
    }

    #[test]
    fn request_vendors_must_be_suppliers() {
        let svc = service();
        let walk_in = customer(&svc, "Walk-in");
        let err = svc
            .create_request(
                &employee(),
                CreateRequest {
                    vendor_ids: vec![walk_in.id.clone()],
                    lines: vec![input("p-scope", 1.0, None)],
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("is not a supplier"));
    }

    #[test]
    fn cancel_and_list_by_status() {
        let svc = service();
        let a = draft(&svc, &[]);
        draft(&svc, &[]);
        svc.cancel_request(&a.id).unwrap();
        assert!(svc.cancel_request(&a.id).is_err());

        let cancelled = svc
            .list_requests(Some(RequestStatus::Cancelled), &ListParams::default())
            .unwrap();
        assert_eq!(cancelled.total, 1);
        assert_eq!(cancelled.items[0].id, a.id);
        let all = svc.list_requests(None, &ListParams::default()).unwrap();
        assert_eq!(all.total, 2);
    }
}
