//! Fixture records and their output.
//!
//! A fixture is a JSON array of `{"model": ..., "fields": {...}}` objects, the
//! format the catalog's fixture loader reads.

use std::{io::Write as _, path::Path};

use crim_core::{
  catalog::{NewRole, Role},
  store::CatalogStore,
};
use serde::Serialize;

use crate::{Error, Result};

/// One fixture entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureRecord {
  pub model:  String,
  pub fields: RoleFields,
}

impl FixtureRecord {
  pub fn new(model: &str, fields: RoleFields) -> Self {
    Self { model: model.to_owned(), fields }
  }
}

/// Fields of a role record. Editor roles also carry the edition date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleFields {
  pub person:    String,
  pub role_type: String,
  #[serde(flatten)]
  pub edition:   Option<EditionDate>,
  pub piece:     String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditionDate {
  pub date:      String,
  /// Serialised as `null` when `date` holds no year.
  pub date_sort: Option<i32>,
}

impl From<&RoleFields> for NewRole {
  fn from(fields: &RoleFields) -> Self {
    NewRole {
      person:    fields.person.clone(),
      role_type: fields.role_type.clone(),
      piece:     Some(fields.piece.clone()),
      date:      fields.edition.as_ref().map(|e| e.date.clone()),
      date_sort: fields.edition.as_ref().and_then(|e| e.date_sort),
      remarks:   String::new(),
    }
  }
}

/// Serialise `records` and write them to `path`.
///
/// The document goes to a temporary file in the same directory, which is
/// persisted over `path` only once fully written. On any failure `path` is
/// left untouched and the temporary file is removed.
pub fn write_fixture(path: &Path, records: &[FixtureRecord]) -> Result<()> {
  let json = serde_json::to_vec(records)?;

  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
  tmp.write_all(&json)?;
  tmp.as_file().sync_all()?;
  tmp.persist(path).map_err(|e| e.error)?;
  Ok(())
}

/// Insert every record of a role fixture into `store`, in order.
///
/// Each role is a separate store call, so the load is not atomic: when an
/// insert fails, the roles before it stay in the store and the error names
/// the failing record's 1-based position.
pub async fn apply_fixture<S: CatalogStore>(
  store: &S,
  records: &[FixtureRecord],
) -> Result<Vec<Role>> {
  let mut roles = Vec::with_capacity(records.len());
  for (idx, record) in records.iter().enumerate() {
    let role = store
      .add_role(NewRole::from(&record.fields))
      .await
      .map_err(|e| Error::Apply { record: idx + 1, source: Box::new(e) })?;
    roles.push(role);
  }
  tracing::info!(roles = roles.len(), "fixture applied");
  Ok(roles)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn composer() -> RoleFields {
    RoleFields {
      person:    "COMP_01".into(),
      role_type: "composer".into(),
      edition:   None,
      piece:     "MOD_001".into(),
    }
  }

  #[test]
  fn composer_has_no_date_fields() {
    let value = serde_json::to_value(FixtureRecord::new("crim.crimrole", composer())).unwrap();
    assert_eq!(
      value,
      json!({
        "model": "crim.crimrole",
        "fields": { "person": "COMP_01", "role_type": "composer", "piece": "MOD_001" }
      })
    );
  }

  #[test]
  fn editor_field_order() {
    let editor = RoleFields {
      person:    "ED_01".into(),
      role_type: "editor".into(),
      edition:   Some(EditionDate { date: "1555".into(), date_sort: Some(1555) }),
      piece:     "MOD_001".into(),
    };
    let text = serde_json::to_string(&editor).unwrap();
    assert_eq!(
      text,
      r#"{"person":"ED_01","role_type":"editor","date":"1555","date_sort":1555,"piece":"MOD_001"}"#
    );
  }

  #[test]
  fn undated_editor_serialises_null_sort_key() {
    let editor = RoleFields {
      edition: Some(EditionDate { date: "s.d.".into(), date_sort: None }),
      ..composer()
    };
    let value = serde_json::to_value(&editor).unwrap();
    assert_eq!(value["date_sort"], serde_json::Value::Null);
    assert_eq!(value["date"], "s.d.");
  }

  #[test]
  fn role_from_fields() {
    let role = NewRole::from(&RoleFields {
      edition: Some(EditionDate { date: "ca. 1560".into(), date_sort: Some(1560) }),
      ..composer()
    });
    assert_eq!(role.piece.as_deref(), Some("MOD_001"));
    assert_eq!(role.date.as_deref(), Some("ca. 1560"));
    assert_eq!(role.date_sort, Some(1560));
  }

  #[test]
  fn written_fixture_replaces_existing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("piece_roles.json");
    std::fs::write(&path, "stale").unwrap();

    write_fixture(&path, &[FixtureRecord::new("crim.crimrole", composer())]).unwrap();

    let written: serde_json::Value =
      serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(written[0]["fields"]["person"], "COMP_01");

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "temporary file left behind");
  }

  #[test]
  fn failed_write_leaves_nothing_behind() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("missing").join("piece_roles.json");

    let err = write_fixture(&path, &[]).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
  }
}
