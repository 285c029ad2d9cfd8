//! Reference numbers for requests, RFQs and purchase orders.

use std::sync::Arc;

use openerp_core::ServiceError;
use openerp_sql::{SQLStore, Value};

pub const PURCHASE_REQUEST: &str = "purchase.request";
pub const PURCHASE_RFQ: &str = "purchase.rfq";
pub const PURCHASE_ORDER: &str = "purchase.order";

/// Mints unique references per sequence code.
pub trait SequenceGenerator: Send + Sync {
    fn next_value(&self, code: &str) -> Result<String, ServiceError>;
}

/// Prefix and zero padding of a known sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceDef {
    pub code: &'static str,
    pub prefix: &'static str,
    pub padding: usize,
}

const SEQUENCES: &[SequenceDef] = &[
    SequenceDef { code: PURCHASE_REQUEST, prefix: "PR", padding: 5 },
    SequenceDef { code: PURCHASE_RFQ, prefix: "RFQ", padding: 5 },
    SequenceDef { code: PURCHASE_ORDER, prefix: "PO", padding: 5 },
];

pub fn sequence_def(code: &str) -> Option<&'static SequenceDef> {
    SEQUENCES.iter().find(|d| d.code == code)
}

impl SequenceDef {
    pub fn format(&self, value: i64) -> String {
        format!("{}{:0width$}", self.prefix, value, width = self.padding)
    }
}

/// Counters kept in the `sequences` table.
///
/// The increment and the read are a single `UPSERT ... RETURNING`
/// statement, so concurrent callers never receive the same value.
pub struct SqlSequence {
    sql: Arc<dyn SQLStore>,
}

impl SqlSequence {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }
}

impl SequenceGenerator for SqlSequence {
    fn next_value(&self, code: &str) -> Result<String, ServiceError> {
        let def = sequence_def(code)
            .ok_or_else(|| ServiceError::Internal(format!("unknown sequence '{code}'")))?;

        let rows = self
            .sql
            .query(
                "INSERT INTO sequences (code, value) VALUES (?1, 1) \
                 ON CONFLICT(code) DO UPDATE SET value = value + 1 \
                 RETURNING value",
                &[Value::Text(code.to_string())],
            )
            .map_err(|e| ServiceError::Storage(format!("sequence {code}: {e}")))?;

        let value = rows
            .first()
            .and_then(|r| r.get_i64("value"))
            .ok_or_else(|| ServiceError::Storage(format!("sequence {code} returned no value")))?;

        Ok(def.format(value))
    }
}
