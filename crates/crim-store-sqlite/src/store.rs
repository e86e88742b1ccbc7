//! [`SqliteStore`]: the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use crim_core::{
  catalog::{NewRole, Observation, Person, Piece, Role, RoleType},
  relationship::{NewRelationship, Relationship},
  slug::{slug_base, slug_candidate, validate_slug},
  store::CatalogStore,
};

use crate::{
  encode::{
    decode_dt, encode_dt, encode_mutable_fields, relationship_insert,
    relationship_select_columns, relationship_update, RawRelationship,
  },
  schema::schema,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A CRIM catalog store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as the tests do.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let ddl = schema();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Slug prefix for a relationship between two observations: the IDs of
  /// the pieces they belong to, joined by a hyphen.
  async fn slug_base_for(&self, model: &str, derivative: &str) -> Result<String> {
    let model_id      = model.to_owned();
    let derivative_id = derivative.to_owned();

    let (model_piece, derivative_piece): (Option<String>, Option<String>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT piece_id FROM observations WHERE observation_id = ?1")?;
        let model_piece: Option<String> = stmt
          .query_row(rusqlite::params![model_id], |r| r.get(0))
          .optional()?;
        let derivative_piece: Option<String> = stmt
          .query_row(rusqlite::params![derivative_id], |r| r.get(0))
          .optional()?;
        Ok((model_piece, derivative_piece))
      })
      .await?;

    let model_piece =
      model_piece.ok_or_else(|| Error::ObservationNotFound(model.to_owned()))?;
    let derivative_piece = derivative_piece
      .ok_or_else(|| Error::ObservationNotFound(derivative.to_owned()))?;

    Ok(slug_base(&model_piece, &derivative_piece))
  }

  /// Insert `relationship` under the first free `base-N` slug and return
  /// that slug.
  ///
  /// Probing finds the first candidate with no existing row; the unique
  /// index still decides, and a collision on insert moves on to the next
  /// suffix.
  async fn insert_with_generated_slug(
    &self,
    base: String,
    relationship: &Relationship,
  ) -> Result<String> {
    let fields  = encode_mutable_fields(relationship);
    let created = encode_dt(relationship.created);

    let outcome: std::result::Result<String, crim_core::Error> = self
      .conn
      .call(move |conn| {
        let mut suffix = first_unused_suffix(conn, &base)?;
        loop {
          let slug = slug_candidate(&base, suffix);
          if let Err(e) = validate_slug(&slug) {
            return Ok(Err(e));
          }

          let (sql, values) = relationship_insert(&slug, &fields, &created);
          match conn.execute(&sql, rusqlite::params_from_iter(values)) {
            Ok(_) => return Ok(Ok(slug)),
            Err(e) if is_unique_violation(&e) => {
              tracing::debug!(%slug, "relationship slug taken on insert, retrying");
              suffix += 1;
            }
            Err(e) => return Err(e.into()),
          }
        }
      })
      .await?;

    Ok(outcome?)
  }

  /// Insert `relationship` under a caller-chosen slug. Returns `false` if
  /// the slug is already taken.
  async fn insert_with_slug(
    &self,
    slug: String,
    relationship: &Relationship,
  ) -> Result<bool> {
    let fields  = encode_mutable_fields(relationship);
    let created = encode_dt(relationship.created);

    let inserted = self
      .conn
      .call(move |conn| {
        let (sql, values) = relationship_insert(&slug, &fields, &created);
        match conn.execute(&sql, rusqlite::params_from_iter(values)) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;
    Ok(inserted)
  }
}

/// The lowest suffix `n >= 1` for which `base-n` is not yet a relationship
/// ID.
fn first_unused_suffix(conn: &rusqlite::Connection, base: &str) -> rusqlite::Result<u32> {
  let mut stmt =
    conn.prepare("SELECT 1 FROM relationships WHERE relationship_id = ?1")?;
  let mut suffix = 1;
  while stmt.exists(rusqlite::params![slug_candidate(base, suffix)])? {
    tracing::debug!(base, suffix, "relationship slug taken");
    suffix += 1;
  }
  Ok(suffix)
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Person> {
  Ok(Person { person_id: row.get(0)?, name: row.get(1)? })
}

fn piece_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Piece> {
  Ok(Piece { piece_id: row.get(0)?, title: row.get(1)? })
}

fn observation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Observation> {
  Ok(Observation {
    observation_id: row.get(0)?,
    piece_id:       row.get(1)?,
    observer:       row.get(2)?,
    ema:            row.get(3)?,
    remarks:        row.get(4)?,
  })
}

fn role_type_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoleType> {
  Ok(RoleType { role_type_id: row.get(0)?, name: row.get(1)? })
}

fn role_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Role> {
  Ok(Role {
    role_id:   row.get(0)?,
    person:    row.get(1)?,
    role_type: row.get(2)?,
    piece:     row.get(3)?,
    date:      row.get(4)?,
    date_sort: row.get(5)?,
    remarks:   row.get(6)?,
  })
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, person: Person) -> Result<Person> {
    let row = person.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (person_id, name) VALUES (?1, ?2)",
          rusqlite::params![row.person_id, row.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(person)
  }

  async fn get_person(&self, person_id: &str) -> Result<Option<Person>> {
    let id = person_id.to_owned();
    let person = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT person_id, name FROM people WHERE person_id = ?1",
            rusqlite::params![id],
            person_from_row,
          )
          .optional()?)
      })
      .await?;
    Ok(person)
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let people = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT person_id, name FROM people ORDER BY person_id")?;
        let rows = stmt
          .query_map([], person_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(people)
  }

  async fn delete_person(&self, person_id: &str) -> Result<bool> {
    let id = person_id.to_owned();
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM people WHERE person_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Pieces ────────────────────────────────────────────────────────────────

  async fn add_piece(&self, piece: Piece) -> Result<Piece> {
    let row = piece.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pieces (piece_id, title) VALUES (?1, ?2)",
          rusqlite::params![row.piece_id, row.title],
        )?;
        Ok(())
      })
      .await?;
    Ok(piece)
  }

  async fn get_piece(&self, piece_id: &str) -> Result<Option<Piece>> {
    let id = piece_id.to_owned();
    let piece = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT piece_id, title FROM pieces WHERE piece_id = ?1",
            rusqlite::params![id],
            piece_from_row,
          )
          .optional()?)
      })
      .await?;
    Ok(piece)
  }

  async fn list_pieces(&self) -> Result<Vec<Piece>> {
    let pieces = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT piece_id, title FROM pieces ORDER BY piece_id")?;
        let rows = stmt
          .query_map([], piece_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(pieces)
  }

  // ── Observations ──────────────────────────────────────────────────────────

  async fn add_observation(&self, observation: Observation) -> Result<Observation> {
    let row = observation.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO observations (observation_id, piece_id, observer_id, ema, remarks)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            row.observation_id,
            row.piece_id,
            row.observer,
            row.ema,
            row.remarks,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(observation)
  }

  async fn get_observation(&self, observation_id: &str) -> Result<Option<Observation>> {
    let id = observation_id.to_owned();
    let observation = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT observation_id, piece_id, observer_id, ema, remarks
             FROM observations WHERE observation_id = ?1",
            rusqlite::params![id],
            observation_from_row,
          )
          .optional()?)
      })
      .await?;
    Ok(observation)
  }

  async fn delete_observation(&self, observation_id: &str) -> Result<bool> {
    let id = observation_id.to_owned();
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM observations WHERE observation_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  async fn add_role_type(&self, role_type: RoleType) -> Result<RoleType> {
    let row = role_type.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO role_types (role_type_id, name) VALUES (?1, ?2)",
          rusqlite::params![row.role_type_id, row.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(role_type)
  }

  async fn find_role_type(&self, name: &str) -> Result<Option<RoleType>> {
    let name = name.to_owned();
    let role_type = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT role_type_id, name FROM role_types WHERE name = ?1",
            rusqlite::params![name],
            role_type_from_row,
          )
          .optional()?)
      })
      .await?;
    Ok(role_type)
  }

  async fn list_role_types(&self) -> Result<Vec<RoleType>> {
    let role_types = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT role_type_id, name FROM role_types ORDER BY role_type_id")?;
        let rows = stmt
          .query_map([], role_type_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(role_types)
  }

  async fn add_role(&self, role: NewRole) -> Result<Role> {
    let row = role.clone();
    let role_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO roles (person_id, role_type_id, piece_id, date, date_sort, remarks)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            row.person,
            row.role_type,
            row.piece,
            row.date,
            row.date_sort,
            row.remarks,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Role {
      role_id,
      person:    role.person,
      role_type: role.role_type,
      piece:     role.piece,
      date:      role.date,
      date_sort: role.date_sort,
      remarks:   role.remarks,
    })
  }

  async fn list_roles(&self, piece_id: Option<&str>) -> Result<Vec<Role>> {
    let piece_id = piece_id.map(str::to_owned);
    let roles = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT role_id, person_id, role_type_id, piece_id, date, date_sort, remarks
           FROM roles
           WHERE ?1 IS NULL OR piece_id = ?1
           ORDER BY role_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![piece_id], role_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(roles)
  }

  // ── Relationships ─────────────────────────────────────────────────────────

  async fn create_relationship(
    &self,
    input: NewRelationship,
    at:    DateTime<Utc>,
  ) -> Result<Relationship> {
    let mut types = input.types;
    types.roll_up();

    let mut relationship = Relationship {
      relationship_id:        String::new(),
      observer:               input.observer,
      model_observation:      input.model_observation,
      derivative_observation: input.derivative_observation,
      reverse_direction:      input.reverse_direction,
      types,
      remarks:                input.remarks,
      created:                at,
      updated:                at,
      needs_review:           input.needs_review,
    };

    // Resolved for explicit slugs too: it is the observation existence
    // check.
    let base = self
      .slug_base_for(
        &relationship.model_observation,
        &relationship.derivative_observation,
      )
      .await?;

    relationship.relationship_id = match input.relationship_id {
      Some(slug) => {
        validate_slug(&slug)?;
        if !self.insert_with_slug(slug.clone(), &relationship).await? {
          return Err(Error::DuplicateRelationship(slug));
        }
        slug
      }
      None => self.insert_with_generated_slug(base, &relationship).await?,
    };

    tracing::debug!(relationship_id = %relationship, "relationship created");
    Ok(relationship)
  }

  async fn update_relationship(
    &self,
    relationship: Relationship,
    at:           DateTime<Utc>,
  ) -> Result<Relationship> {
    let mut relationship = relationship;
    relationship.types.roll_up();
    relationship.updated = at;

    let slug   = relationship.relationship_id.clone();
    let fields = encode_mutable_fields(&relationship);

    let created: Option<String> = self
      .conn
      .call(move |conn| {
        let (sql, values) = relationship_update(&slug, fields);
        let changed = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        if changed == 0 {
          return Ok(None);
        }
        let created: String = conn.query_row(
          "SELECT created FROM relationships WHERE relationship_id = ?1",
          rusqlite::params![slug],
          |r| r.get(0),
        )?;
        Ok(Some(created))
      })
      .await?;

    let created = created.ok_or_else(|| {
      Error::RelationshipNotFound(relationship.relationship_id.clone())
    })?;
    relationship.created = decode_dt(&created)?;

    Ok(relationship)
  }

  async fn get_relationship(&self, relationship_id: &str) -> Result<Option<Relationship>> {
    let id  = relationship_id.to_owned();
    let sql = format!(
      "SELECT {} FROM relationships WHERE relationship_id = ?1",
      relationship_select_columns(),
    );

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(&sql, rusqlite::params![id], RawRelationship::from_row)
          .optional()?)
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn list_relationships(&self) -> Result<Vec<Relationship>> {
    let sql = format!(
      "SELECT {} FROM relationships ORDER BY id",
      relationship_select_columns(),
    );

    let raws: Vec<RawRelationship> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawRelationship::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelationship::into_relationship).collect()
  }

  async fn delete_relationship(&self, relationship_id: &str) -> Result<bool> {
    let id = relationship_id.to_owned();
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM relationships WHERE relationship_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }
}

