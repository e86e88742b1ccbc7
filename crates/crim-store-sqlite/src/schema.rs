//! SQL schema for the CRIM SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

use crim_core::relationship::RelationshipType;
use strum::IntoEnumIterator as _;

/// Schema DDL for everything except `relationships`; idempotent thanks to
/// `CREATE TABLE IF NOT EXISTS`.
const BASE_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id TEXT PRIMARY KEY,
    name      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pieces (
    piece_id TEXT PRIMARY KEY,
    title    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS observations (
    observation_id TEXT PRIMARY KEY,
    piece_id       TEXT NOT NULL REFERENCES pieces(piece_id) ON DELETE CASCADE,
    observer_id    TEXT REFERENCES people(person_id) ON DELETE SET NULL,
    ema            TEXT,
    remarks        TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS role_types (
    role_type_id TEXT PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS roles (
    role_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    person_id    TEXT NOT NULL REFERENCES people(person_id) ON DELETE CASCADE,
    role_type_id TEXT NOT NULL REFERENCES role_types(role_type_id),
    piece_id     TEXT REFERENCES pieces(piece_id) ON DELETE CASCADE,
    date         TEXT,
    date_sort    INTEGER,
    remarks      TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS observations_piece_idx ON observations(piece_id);
CREATE INDEX IF NOT EXISTS roles_piece_idx        ON roles(piece_id);
";

/// Full schema DDL. The `relationships` table gets one boolean column per
/// relationship type, named after the type.
pub fn schema() -> String {
  let type_columns: String = RelationshipType::iter()
    .map(|t| format!("    {} BOOLEAN NOT NULL DEFAULT 0,\n", t.as_ref()))
    .collect();

  format!(
    "{BASE_SCHEMA}
-- relationship_id is the source of truth for slug uniqueness; inserts that
-- collide on it are retried with the next suffix.
CREATE TABLE IF NOT EXISTS relationships (
    id                        INTEGER PRIMARY KEY AUTOINCREMENT,
    relationship_id           TEXT NOT NULL UNIQUE,
    observer_id               TEXT REFERENCES people(person_id) ON DELETE SET NULL,
    model_observation_id      TEXT NOT NULL
                              REFERENCES observations(observation_id) ON DELETE CASCADE,
    derivative_observation_id TEXT NOT NULL
                              REFERENCES observations(observation_id) ON DELETE CASCADE,
    reverse_direction         BOOLEAN NOT NULL DEFAULT 0,
{type_columns}    remarks                   TEXT NOT NULL DEFAULT '',
    created                   TEXT NOT NULL,   -- ISO 8601 UTC
    updated                   TEXT NOT NULL,   -- ISO 8601 UTC
    needs_review              BOOLEAN NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS relationships_observer_idx   ON relationships(observer_id);
CREATE INDEX IF NOT EXISTS relationships_model_idx      ON relationships(model_observation_id);
CREATE INDEX IF NOT EXISTS relationships_derivative_idx ON relationships(derivative_observation_id);

PRAGMA user_version = 1;
"
  )
}
