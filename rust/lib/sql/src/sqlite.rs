use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, Statement, Value};

/// SQLStore backed by rusqlite (bundled SQLite).
///
/// Foreign keys are switched on for every connection, so
/// `ON DELETE CASCADE` clauses in the schema are enforced.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database file.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path).map_err(|e| SQLError::Connection(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        debug!(path = %path.display(), "opened sqlite store");
        Self::init(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn = Connection::open_in_memory().map_err(|e| SQLError::Connection(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, SQLError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn to_sql(v: &Value) -> rusqlite::types::Value {
    match v {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Real(f) => rusqlite::types::Value::Real(*f),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Blob(b) => rusqlite::types::Value::Blob(b.clone()),
    }
}

fn from_sql(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self.conn.lock().map_err(|e| SQLError::Query(e.to_string()))?;

        let bound: Vec<rusqlite::types::Value> = params.iter().map(to_sql).collect();
        let mut stmt = conn.prepare(sql).map_err(|e| SQLError::Query(e.to_string()))?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(|s| s.to_string()).collect();

        let rows = stmt
            .query_map(rusqlite::params_from_iter(bound.iter()), |row| {
                let mut columns = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), from_sql(row.get_ref(i)?)));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let result = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SQLError::Query(e.to_string()))?;
        Ok(result)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self.conn.lock().map_err(|e| SQLError::Execution(e.to_string()))?;
        let bound: Vec<rusqlite::types::Value> = params.iter().map(to_sql).collect();
        let affected = conn
            .execute(sql, rusqlite::params_from_iter(bound.iter()))
            .map_err(SQLError::from_exec)?;
        Ok(affected as u64)
    }

    fn transaction(&self, statements: &[Statement]) -> Result<Vec<u64>, SQLError> {
        let mut conn = self.conn.lock().map_err(|e| SQLError::Execution(e.to_string()))?;
        let tx = conn.transaction().map_err(|e| SQLError::Execution(e.to_string()))?;

        let mut affected = Vec::with_capacity(statements.len());
        for stmt in statements {
            let bound: Vec<rusqlite::types::Value> = stmt.params.iter().map(to_sql).collect();
            // Dropping `tx` on the error path rolls everything back.
            let n = tx
                .execute(&stmt.sql, rusqlite::params_from_iter(bound.iter()))
                .map_err(SQLError::from_exec)?;
            affected.push(n as u64);
        }

        tx.commit().map_err(|e| SQLError::Execution(e.to_string()))?;
        Ok(affected)
    }
}
