//! Error types for `crim-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid slug {0:?}: {1}")]
  InvalidSlug(String, &'static str),

  #[error("unknown relationship type: {0:?}")]
  UnknownRelationshipType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
