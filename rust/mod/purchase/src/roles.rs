//! Role names checked by the purchase services.

/// Employees submit purchase requests.
pub const EMPLOYEE: &str = "purchase.employee";

/// Procurement officers approve bids and requests, confirm RFQs and turn
/// requests into RFQs.
pub const PROCUREMENT_OFFICER: &str = "purchase.procurement_officer";
