use openerp_core::ServiceError;
use openerp_sql::SQLStore;

/// DDL for the purchase tables.
///
/// Each table keeps the full JSON document in `data`; the other columns are
/// copies used for filtering, ordering, uniqueness and cascades.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS vendors (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS rfqs (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL,
        vendor_id TEXT,
        origin TEXT,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS bids (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        rfq_id TEXT NOT NULL REFERENCES rfqs(id) ON DELETE CASCADE,
        vendor_id TEXT NOT NULL,
        status TEXT NOT NULL,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS purchase_orders (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL UNIQUE,
        vendor_id TEXT NOT NULL,
        origin TEXT,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS purchase_requests (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL,
        employee_id TEXT,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        model TEXT NOT NULL,
        res_id TEXT NOT NULL,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS sequences (
        code TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_rfq_status ON rfqs(status)",
    "CREATE INDEX IF NOT EXISTS idx_rfq_vendor ON rfqs(vendor_id)",
    "CREATE INDEX IF NOT EXISTS idx_bid_rfq ON bids(rfq_id)",
    "CREATE INDEX IF NOT EXISTS idx_bid_status ON bids(rfq_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_po_origin ON purchase_orders(origin)",
    "CREATE INDEX IF NOT EXISTS idx_pr_status ON purchase_requests(status)",
    "CREATE INDEX IF NOT EXISTS idx_msg_record ON messages(model, res_id)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {e}")))?;
    }
    Ok(())
}
