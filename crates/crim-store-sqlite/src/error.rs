//! Error type for `crim-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] crim_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("observation not found: {0}")]
  ObservationNotFound(String),

  #[error("relationship not found: {0}")]
  RelationshipNotFound(String),

  /// A caller-supplied relationship ID is already taken.
  #[error("relationship {0} already exists")]
  DuplicateRelationship(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
