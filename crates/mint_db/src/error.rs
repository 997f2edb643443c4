use mint_core::Error;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps sqlx failures onto the core taxonomy. Connection trouble and
/// serialization conflicts are transient; the whole unit rolled back, so
/// the caller may retry.
pub(crate) fn db_error(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => Error::TransientStorage(e.to_string()),
        sqlx::Error::Database(db)
            if matches!(db.code().as_deref(), Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)) =>
        {
            Error::TransientStorage(e.to_string())
        }
        _ => Error::Storage(e.to_string()),
    }
}

/// SQLSTATE of a database error, if any.
pub(crate) fn sql_state(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}
