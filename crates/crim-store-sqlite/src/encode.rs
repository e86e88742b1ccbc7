//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Each relationship type is a
//! boolean column named after the type's stable string form.

use std::iter;

use chrono::{DateTime, Utc};
use crim_core::relationship::{Relationship, RelationshipType, RelationshipTypes};
use rusqlite::types::Value;
use strum::IntoEnumIterator as _;

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Optional text ───────────────────────────────────────────────────────────

fn encode_opt_text(s: Option<&str>) -> Value {
  s.map_or(Value::Null, |s| Value::Text(s.to_owned()))
}

// ─── Relationship columns ────────────────────────────────────────────────────

/// Column list for `SELECT`s that feed [`RawRelationship::from_row`].
pub fn relationship_select_columns() -> String {
  let mut cols: Vec<&'static str> = vec![
    "relationship_id",
    "observer_id",
    "model_observation_id",
    "derivative_observation_id",
    "reverse_direction",
  ];
  cols.extend(RelationshipType::iter().map(<&'static str>::from));
  cols.extend(["remarks", "created", "updated", "needs_review"]);
  cols.join(", ")
}

/// Column/value pairs for every field a save may change: everything except
/// `relationship_id` and `created`.
pub fn encode_mutable_fields(r: &Relationship) -> Vec<(&'static str, Value)> {
  let mut fields = vec![
    ("observer_id", encode_opt_text(r.observer.as_deref())),
    ("model_observation_id", Value::Text(r.model_observation.clone())),
    (
      "derivative_observation_id",
      Value::Text(r.derivative_observation.clone()),
    ),
    ("reverse_direction", Value::from(r.reverse_direction)),
  ];
  for t in RelationshipType::iter() {
    let column: &'static str = t.into();
    fields.push((column, Value::from(r.types.contains(t))));
  }
  fields.push(("remarks", Value::Text(r.remarks.clone())));
  fields.push(("updated", Value::Text(encode_dt(r.updated))));
  fields.push(("needs_review", Value::from(r.needs_review)));
  fields
}

/// `INSERT` statement and parameters for a new `relationships` row.
pub fn relationship_insert(
  slug: &str,
  fields: &[(&'static str, Value)],
  created: &str,
) -> (String, Vec<Value>) {
  let columns: Vec<&str> = iter::once("relationship_id")
    .chain(fields.iter().map(|(c, _)| *c))
    .chain(iter::once("created"))
    .collect();
  let placeholders: Vec<String> =
    (1..=columns.len()).map(|i| format!("?{i}")).collect();

  let sql = format!(
    "INSERT INTO relationships ({}) VALUES ({})",
    columns.join(", "),
    placeholders.join(", "),
  );
  let values = iter::once(Value::Text(slug.to_owned()))
    .chain(fields.iter().map(|(_, v)| v.clone()))
    .chain(iter::once(Value::Text(created.to_owned())))
    .collect();

  (sql, values)
}

/// `UPDATE` statement and parameters saving `fields` onto the row for
/// `slug`.
pub fn relationship_update(
  slug: &str,
  fields: Vec<(&'static str, Value)>,
) -> (String, Vec<Value>) {
  let assignments: Vec<String> = fields
    .iter()
    .enumerate()
    .map(|(i, (c, _))| format!("{c} = ?{}", i + 1))
    .collect();

  let sql = format!(
    "UPDATE relationships SET {} WHERE relationship_id = ?{}",
    assignments.join(", "),
    fields.len() + 1,
  );
  let values = fields
    .into_iter()
    .map(|(_, v)| v)
    .chain(iter::once(Value::Text(slug.to_owned())))
    .collect();

  (sql, values)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Values read directly from a `relationships` row.
pub struct RawRelationship {
  pub relationship_id:           String,
  pub observer_id:               Option<String>,
  pub model_observation_id:      String,
  pub derivative_observation_id: String,
  pub reverse_direction:         bool,
  pub types:                     RelationshipTypes,
  pub remarks:                   String,
  pub created:                   String,
  pub updated:                   String,
  pub needs_review:              bool,
}

impl RawRelationship {
  /// Read a row selected with [`relationship_select_columns`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let mut idx = 5;
    let mut types = RelationshipTypes::new();
    for t in RelationshipType::iter() {
      if row.get::<_, bool>(idx)? {
        types.insert(t);
      }
      idx += 1;
    }

    Ok(Self {
      relationship_id: row.get(0)?,
      observer_id: row.get(1)?,
      model_observation_id: row.get(2)?,
      derivative_observation_id: row.get(3)?,
      reverse_direction: row.get(4)?,
      types,
      remarks: row.get(idx)?,
      created: row.get(idx + 1)?,
      updated: row.get(idx + 2)?,
      needs_review: row.get(idx + 3)?,
    })
  }

  pub fn into_relationship(self) -> Result<Relationship> {
    Ok(Relationship {
      relationship_id:        self.relationship_id,
      observer:               self.observer_id,
      model_observation:      self.model_observation_id,
      derivative_observation: self.derivative_observation_id,
      reverse_direction:      self.reverse_direction,
      types:                  self.types,
      remarks:                self.remarks,
      created:                decode_dt(&self.created)?,
      updated:                decode_dt(&self.updated)?,
      needs_review:           self.needs_review,
    })
  }
}
