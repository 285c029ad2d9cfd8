//! Message log attached to records.

use std::sync::Arc;

use tracing::warn;

use openerp_core::{new_id, now_rfc3339, ServiceError};
use openerp_sql::{SQLStore, Value};

use super::PurchaseService;
use crate::model::Message;

/// Fire-and-forget sink for human-readable notes on a record.
pub trait MessageSink: Send + Sync {
    fn post_message(&self, model: &str, res_id: &str, body: &str);
}

/// Writes messages to the `messages` table. A failed write is logged and
/// dropped, it never fails the operation that posted it.
pub struct SqlMessageLog {
    sql: Arc<dyn SQLStore>,
}

impl SqlMessageLog {
    pub fn new(sql: Arc<dyn SQLStore>) -> Self {
        Self { sql }
    }
}

impl MessageSink for SqlMessageLog {
    fn post_message(&self, model: &str, res_id: &str, body: &str) {
        let message = Message {
            id: new_id(),
            model: model.to_string(),
            res_id: res_id.to_string(),
            body: body.to_string(),
            create_at: Some(now_rfc3339()),
        };
        let result = PurchaseService::insert_stmt(&message).and_then(|stmt| {
            self.sql
                .exec(&stmt.sql, &stmt.params)
                .map_err(PurchaseService::sql_err)
        });
        if let Err(e) = result {
            warn!(model, res_id, error = %e, "failed to post message");
        }
    }
}

impl PurchaseService {
    /// Messages posted on a record, oldest first.
    pub fn list_messages(&self, model: &str, res_id: &str) -> Result<Vec<Message>, ServiceError> {
        self.find(&[
            ("model", Value::Text(model.to_string())),
            ("res_id", Value::Text(res_id.to_string())),
        ])
    }
}
