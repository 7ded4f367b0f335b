//! Repository functions — one function per database operation.
//!
//! Functions take a `&DbPool` (or a connection inside a transaction) and
//! return a `Result<T, DbError>`.
//! No business logic, no domain types — pure SQL.

pub mod configurations;
pub mod status_checks;
