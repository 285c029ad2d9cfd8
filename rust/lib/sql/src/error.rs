use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    /// A UNIQUE constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Unique(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl SQLError {
    pub(crate) fn from_exec(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, _) = &e {
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            {
                return SQLError::Unique(e.to_string());
            }
        }
        SQLError::Execution(e.to_string())
    }
}
