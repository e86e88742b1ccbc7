//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `crim-store-sqlite`).
//! The import tooling depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  catalog::{NewRole, Observation, Person, Piece, Role, RoleType},
  relationship::{NewRelationship, Relationship},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a CRIM catalog store backend.
///
/// Timestamps are never read from a clock inside the store: every save takes
/// the time it happens at as an explicit argument.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  fn add_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person<'a>(
    &'a self,
    person_id: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Remove a person. Observations and relationships they recorded are kept
  /// with their observer cleared. Returns `false` if no such person existed.
  fn delete_person<'a>(
    &'a self,
    person_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Pieces ────────────────────────────────────────────────────────────

  fn add_piece(
    &self,
    piece: Piece,
  ) -> impl Future<Output = Result<Piece, Self::Error>> + Send + '_;

  fn get_piece<'a>(
    &'a self,
    piece_id: &'a str,
  ) -> impl Future<Output = Result<Option<Piece>, Self::Error>> + Send + 'a;

  fn list_pieces(
    &self,
  ) -> impl Future<Output = Result<Vec<Piece>, Self::Error>> + Send + '_;

  // ── Observations ──────────────────────────────────────────────────────

  fn add_observation(
    &self,
    observation: Observation,
  ) -> impl Future<Output = Result<Observation, Self::Error>> + Send + '_;

  fn get_observation<'a>(
    &'a self,
    observation_id: &'a str,
  ) -> impl Future<Output = Result<Option<Observation>, Self::Error>> + Send + 'a;

  /// Remove an observation together with every relationship that uses it as
  /// model or derivative. Returns `false` if no such observation existed.
  fn delete_observation<'a>(
    &'a self,
    observation_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Roles ─────────────────────────────────────────────────────────────

  fn add_role_type(
    &self,
    role_type: RoleType,
  ) -> impl Future<Output = Result<RoleType, Self::Error>> + Send + '_;

  /// Look a role type up by its display name (e.g. `"Composer"`).
  fn find_role_type<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<RoleType>, Self::Error>> + Send + 'a;

  fn list_role_types(
    &self,
  ) -> impl Future<Output = Result<Vec<RoleType>, Self::Error>> + Send + '_;

  fn add_role(
    &self,
    role: NewRole,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + '_;

  /// List roles, optionally only those attached to `piece_id`.
  fn list_roles<'a>(
    &'a self,
    piece_id: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + 'a;

  // ── Relationships ─────────────────────────────────────────────────────

  /// Persist a new relationship.
  ///
  /// Category tags implied by the sub-types are added before writing. If no
  /// `relationship_id` is given one is derived from the two observations'
  /// pieces, retrying with the next numeric suffix on collision. `created`
  /// and `updated` are both set to `at`.
  fn create_relationship(
    &self,
    input: NewRelationship,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Relationship, Self::Error>> + Send + '_;

  /// Save changes to an existing relationship, identified by its
  /// `relationship_id`.
  ///
  /// Category tags are rolled up again; `updated` becomes `at` while
  /// `created` and the identifier are left as stored.
  fn update_relationship(
    &self,
    relationship: Relationship,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Relationship, Self::Error>> + Send + '_;

  fn get_relationship<'a>(
    &'a self,
    relationship_id: &'a str,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + 'a;

  fn list_relationships(
    &self,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  /// Returns `false` if no such relationship existed.
  fn delete_relationship<'a>(
    &'a self,
    relationship_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
