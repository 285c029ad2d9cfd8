pub mod bid;
pub mod lifecycle;
pub mod message;
pub mod request;
pub mod rfq;
pub mod schema;
pub mod sequence;
pub mod vendor;
pub mod winner;

use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use openerp_core::{ListParams, ListResult, ServiceError};
use openerp_sql::{Row, SQLError, SQLStore, Statement, Value};

use message::{MessageSink, SqlMessageLog};
use sequence::{SequenceGenerator, SqlSequence};

/// A model stored as a JSON document plus indexed columns.
pub(crate) trait Record: Serialize + DeserializeOwned {
    const TABLE: &'static str;

    fn id(&self) -> &str;

    /// Indexed columns written next to `data`.
    fn indexes(&self) -> Vec<(&'static str, Value)>;
}

/// Purchase service: holds the store and collaborators and implements the
/// business operations.
///
/// Operations that read, validate and then write take the writer lock for
/// their whole duration and commit all their writes in one transaction.
pub struct PurchaseService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) sequence: Box<dyn SequenceGenerator>,
    pub(crate) messages: Box<dyn MessageSink>,
    writer: Mutex<()>,
}

impl PurchaseService {
    /// Service with SQL-backed sequences and message log.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        let sequence = Box::new(SqlSequence::new(Arc::clone(&sql)));
        let messages = Box::new(SqlMessageLog::new(Arc::clone(&sql)));
        Self::with_collaborators(sql, sequence, messages)
    }

    pub fn with_collaborators(
        sql: Arc<dyn SQLStore>,
        sequence: Box<dyn SequenceGenerator>,
        messages: Box<dyn MessageSink>,
    ) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self {
            sql,
            sequence,
            messages,
            writer: Mutex::new(()),
        })
    }

    pub(crate) fn write_guard(&self) -> Result<MutexGuard<'_, ()>, ServiceError> {
        self.writer
            .lock()
            .map_err(|_| ServiceError::Internal("writer lock poisoned".into()))
    }

    // ── Generic record helpers ──

    pub(crate) fn sql_err(e: SQLError) -> ServiceError {
        match e {
            SQLError::Unique(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Storage(other.to_string()),
        }
    }

    fn to_json<T: Serialize>(record: &T) -> Result<String, ServiceError> {
        serde_json::to_string(record).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    fn from_row<T: DeserializeOwned>(row: &Row) -> Result<T, ServiceError> {
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    pub(crate) fn insert_stmt<T: Record>(record: &T) -> Result<Statement, ServiceError> {
        let indexes = record.indexes();
        let mut cols = vec!["id", "data"];
        let mut params = vec![Value::Text(record.id().to_string()), Value::Text(Self::to_json(record)?)];
        for (col, val) in indexes {
            cols.push(col);
            params.push(val);
        }
        let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            cols.join(", "),
            placeholders.join(", "),
        );
        Ok(Statement::new(sql, params))
    }

    pub(crate) fn update_stmt<T: Record>(record: &T) -> Result<Statement, ServiceError> {
        let mut sets = vec!["data = ?1".to_string()];
        let mut params = vec![Value::Text(Self::to_json(record)?)];
        for (col, val) in record.indexes() {
            params.push(val);
            sets.push(format!("{} = ?{}", col, params.len()));
        }
        params.push(Value::Text(record.id().to_string()));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            T::TABLE,
            sets.join(", "),
            params.len(),
        );
        Ok(Statement::new(sql, params))
    }

    pub(crate) fn delete_stmt<T: Record>(id: &str) -> Statement {
        Statement::new(
            format!("DELETE FROM {} WHERE id = ?1", T::TABLE),
            vec![Value::Text(id.to_string())],
        )
    }

    /// Commit statements atomically.
    pub(crate) fn commit(&self, statements: &[Statement]) -> Result<(), ServiceError> {
        self.sql.transaction(statements).map_err(Self::sql_err)?;
        Ok(())
    }

    pub(crate) fn get<T: Record>(&self, id: &str) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", T::TABLE);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(Self::sql_err)?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", T::TABLE, id)))?;
        Self::from_row(row)
    }

    fn where_clause(filters: &[(&str, Value)]) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for (col, val) in filters {
            params.push(val.clone());
            clauses.push(format!("{} = ?{}", col, params.len()));
        }
        let sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (sql, params)
    }

    /// All records matching the filters, oldest first.
    pub(crate) fn find<T: Record>(&self, filters: &[(&str, Value)]) -> Result<Vec<T>, ServiceError> {
        let (where_sql, params) = Self::where_clause(filters);
        let sql = format!(
            "SELECT data FROM {}{} ORDER BY create_at ASC, rowid ASC",
            T::TABLE,
            where_sql
        );
        let rows = self.sql.query(&sql, &params).map_err(Self::sql_err)?;
        rows.iter().map(Self::from_row).collect()
    }

    /// One page of matching records, newest first, with the total count.
    pub(crate) fn list<T: Record>(
        &self,
        filters: &[(&str, Value)],
        params: &ListParams,
    ) -> Result<ListResult<T>, ServiceError> {
        let (where_sql, mut values) = Self::where_clause(filters);

        let count_sql = format!("SELECT COUNT(*) AS cnt FROM {}{}", T::TABLE, where_sql);
        let rows = self.sql.query(&count_sql, &values).map_err(Self::sql_err)?;
        let total = rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        values.push(Value::Integer(params.effective_limit() as i64));
        values.push(Value::Integer(params.offset as i64));
        let sql = format!(
            "SELECT data FROM {}{} ORDER BY create_at DESC, rowid DESC LIMIT ?{} OFFSET ?{}",
            T::TABLE,
            where_sql,
            values.len() - 1,
            values.len(),
        );
        let rows = self.sql.query(&sql, &values).map_err(Self::sql_err)?;
        let items = rows.iter().map(Self::from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(ListResult { items, total })
    }

    /// Fetch a record another record points at. A dangling or empty
    /// reference is a validation failure of the caller's input.
    pub(crate) fn require_ref<T: Record>(&self, id: &str, what: &str) -> Result<T, ServiceError> {
        if id.trim().is_empty() {
            return Err(ServiceError::Validation(format!("{what} is required")));
        }
        self.get(id).map_err(|e| match e {
            ServiceError::NotFound(_) => {
                ServiceError::Validation(format!("{what} '{id}' does not exist"))
            }
            other => other,
        })
    }
}
