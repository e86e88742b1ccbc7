//! Resolved lookup tables for the role import.
//!
//! Source spreadsheets refer to people, pieces and role types by
//! human-readable identifiers. [`RoleLookups`] maps those to the keys the
//! fixture must carry, so the transform never touches the store.

use std::collections::HashMap;

use crim_core::{
  catalog::{Person, Piece, RoleType},
  store::CatalogStore,
};

use crate::{Error, Result};

/// Identifier → key maps for people, pieces and role types (by name).
#[derive(Debug, Clone, Default)]
pub struct RoleLookups {
  people:     HashMap<String, String>,
  pieces:     HashMap<String, String>,
  role_types: HashMap<String, String>,
}

impl RoleLookups {
  pub fn new() -> Self { Self::default() }

  /// Build lookups from catalog records already in memory.
  pub fn from_catalog(
    people: &[Person],
    pieces: &[Piece],
    role_types: &[RoleType],
  ) -> Self {
    let mut lookups = Self::new();
    for p in people {
      lookups.insert_person(&p.person_id, &p.person_id);
    }
    for p in pieces {
      lookups.insert_piece(&p.piece_id, &p.piece_id);
    }
    for rt in role_types {
      lookups.insert_role_type(&rt.name, &rt.role_type_id);
    }
    lookups
  }

  /// Read every person, piece and role type from `store`.
  pub async fn load<S: CatalogStore>(store: &S) -> Result<Self> {
    let people = store.list_people().await.map_err(store_error)?;
    let pieces = store.list_pieces().await.map_err(store_error)?;
    let role_types = store.list_role_types().await.map_err(store_error)?;
    Ok(Self::from_catalog(&people, &pieces, &role_types))
  }

  pub fn insert_person(&mut self, person_id: &str, key: &str) {
    self.people.insert(person_id.to_owned(), key.to_owned());
  }

  pub fn insert_piece(&mut self, piece_id: &str, key: &str) {
    self.pieces.insert(piece_id.to_owned(), key.to_owned());
  }

  pub fn insert_role_type(&mut self, name: &str, role_type_id: &str) {
    self.role_types.insert(name.to_owned(), role_type_id.to_owned());
  }

  pub fn person(&self, person_id: &str) -> Option<&str> {
    self.people.get(person_id).map(String::as_str)
  }

  pub fn piece(&self, piece_id: &str) -> Option<&str> {
    self.pieces.get(piece_id).map(String::as_str)
  }

  pub fn role_type(&self, name: &str) -> Option<&str> {
    self.role_types.get(name).map(String::as_str)
  }

  pub fn people_len(&self) -> usize { self.people.len() }

  pub fn pieces_len(&self) -> usize { self.pieces.len() }
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}
