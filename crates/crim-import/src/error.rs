//! Error type for `crim-import`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// `row` is the 1-based data row of the CSV input.
  #[error("row {row}: person {person_id:?} does not exist")]
  PersonNotFound { row: usize, person_id: String },

  #[error("row {row}: piece {piece_id:?} does not exist")]
  PieceNotFound { row: usize, piece_id: String },

  #[error("role type {0:?} does not exist")]
  RoleTypeNotFound(String),

  /// `record` is the 1-based position in the fixture.
  #[error("fixture record {record}: {source}")]
  Apply {
    record: usize,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
