//! Catalog entities that relationships and roles point at.
//!
//! Only the fields needed for lookups and referential integrity are
//! modelled here; people, pieces and observations carry much more metadata
//! in the full catalog.

use serde::{Deserialize, Serialize};

/// A person: composer, editor, analyst or curator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id: String,
  pub name:      String,
}

/// A musical work in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
  pub piece_id: String,
  pub title:    String,
}

/// A marked passage within a piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
  pub observation_id: String,
  pub piece_id:       String,
  /// Cleared if the person is removed.
  pub observer:       Option<String>,
  /// Address of the passage within the encoded score.
  pub ema:            Option<String>,
  pub remarks:        String,
}

impl Observation {
  pub fn new(
    observation_id: impl Into<String>,
    piece_id: impl Into<String>,
  ) -> Self {
    Self {
      observation_id: observation_id.into(),
      piece_id:       piece_id.into(),
      observer:       None,
      ema:            None,
      remarks:        String::new(),
    }
  }
}

/// A function a person can perform on a piece (e.g. "Composer").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleType {
  pub role_type_id: String,
  /// Unique display name; the import looks role types up by it.
  pub name:         String,
}

/// Associates a person with a piece through a role type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  /// Store-assigned.
  pub role_id:   i64,
  pub person:    String,
  pub role_type: String,
  pub piece:     Option<String>,
  /// Free-text date as given in the source (e.g. "ca. 1545").
  pub date:      Option<String>,
  /// Sortable year derived from `date`.
  pub date_sort: Option<i32>,
  pub remarks:   String,
}

/// Input to [`crate::store::CatalogStore::add_role`].
#[derive(Debug, Clone)]
pub struct NewRole {
  pub person:    String,
  pub role_type: String,
  pub piece:     Option<String>,
  pub date:      Option<String>,
  pub date_sort: Option<i32>,
  pub remarks:   String,
}
