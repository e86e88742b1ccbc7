//! End-to-end import tests against an in-memory catalog store.

use std::path::PathBuf;

use tempfile::TempDir;

use crim_core::{
  catalog::{Person, Piece, RoleType},
  store::CatalogStore,
};
use crim_store_sqlite::SqliteStore;
use serde_json::json;

use crate::{
  Error, ImportConfig, apply_fixture,
  fixture::{FixtureRecord, RoleFields},
  run,
};

async fn seeded_store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");

  for (id, name) in [("COMP_01", "Jacquet of Mantua"), ("ED_01", "Ed Itor")] {
    s.add_person(Person { person_id: id.into(), name: name.into() })
      .await
      .unwrap();
  }
  s.add_piece(Piece { piece_id: "MOD_001".into(), title: "Aspice Domine".into() })
    .await
    .unwrap();
  for (id, name) in [("composer", "Composer"), ("editor", "Editor")] {
    s.add_role_type(RoleType { role_type_id: id.into(), name: name.into() })
      .await
      .unwrap();
  }
  s
}

/// A scratch directory with input and output paths inside it. The
/// directory is removed when the returned guard drops.
fn paths() -> (TempDir, PathBuf, PathBuf) {
  let dir = TempDir::new().expect("temp dir");
  let input = dir.path().join("CRIM_Model_Catalog.csv");
  let output = dir.path().join("piece_roles.json");
  (dir, input, output)
}

fn config(input: PathBuf, output: PathBuf) -> ImportConfig {
  ImportConfig { input, output, ..Default::default() }
}

#[tokio::test]
async fn worked_example_produces_expected_fixture() {
  let s = seeded_store().await;
  let (_dir, input, output) = paths();
  std::fs::write(
    &input,
    "CRIM_Model_ID,Person_ID,Editor Person ID,Date\nMOD_001,COMP_01,ED_01,1555\n",
  )
  .unwrap();

  let records = run(&s, &config(input.clone(), output.clone())).await.unwrap();
  assert_eq!(records.len(), 2);

  let written: serde_json::Value =
    serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();

  assert_eq!(
    written,
    json!([
      {
        "model": "crim.crimrole",
        "fields": { "person": "COMP_01", "role_type": "composer", "piece": "MOD_001" }
      },
      {
        "model": "crim.crimrole",
        "fields": {
          "person": "ED_01",
          "role_type": "editor",
          "date": "1555",
          "date_sort": 1555,
          "piece": "MOD_001"
        }
      }
    ])
  );
}

#[tokio::test]
async fn unknown_editor_writes_nothing() {
  let s = seeded_store().await;
  let (_dir, input, output) = paths();
  std::fs::write(
    &input,
    "CRIM_Model_ID,Person_ID,Editor Person ID,Date\n\
     MOD_001,COMP_01,ED_01,1555\n\
     MOD_001,COMP_01,ED_02,1556\n",
  )
  .unwrap();

  let err = run(&s, &config(input.clone(), output.clone())).await.unwrap_err();

  assert!(matches!(err, Error::PersonNotFound { row: 2, ref person_id } if person_id == "ED_02"));
  assert!(!output.exists());
}

#[tokio::test]
async fn missing_input_is_an_io_error() {
  let s = seeded_store().await;
  let (_dir, input, output) = paths();

  let err = run(&s, &config(input, output.clone())).await.unwrap_err();
  assert!(matches!(err, Error::Io(_)));
  assert!(!output.exists());
}

#[tokio::test]
async fn applied_fixture_becomes_roles() {
  let s = seeded_store().await;
  let (_dir, input, output) = paths();
  std::fs::write(
    &input,
    "CRIM_Model_ID,Person_ID,Editor Person ID,Date\nMOD_001,COMP_01,ED_01,ca. 1555\n",
  )
  .unwrap();

  let records = run(&s, &config(input.clone(), output.clone())).await.unwrap();

  apply_fixture(&s, &records).await.unwrap();

  let roles = s.list_roles(Some("MOD_001")).await.unwrap();
  assert_eq!(roles.len(), 2);
  assert_eq!(roles[0].role_type, "composer");
  assert_eq!(roles[0].date, None);
  assert_eq!(roles[1].role_type, "editor");
  assert_eq!(roles[1].date.as_deref(), Some("ca. 1555"));
  assert_eq!(roles[1].date_sort, Some(1555));
}

#[tokio::test]
async fn trailing_comma_rows_import() {
  let s = seeded_store().await;
  let (_dir, input, output) = paths();
  std::fs::write(
    &input,
    "CRIM_Model_ID,Person_ID,Editor Person ID,Date\nMOD_001,COMP_01,ED_01,1555,\n",
  )
  .unwrap();

  let records = run(&s, &config(input, output.clone())).await.unwrap();
  assert_eq!(records.len(), 2);
  assert!(output.exists());
}

#[tokio::test]
async fn failed_apply_keeps_earlier_roles() {
  let s = seeded_store().await;
  let composer = RoleFields {
    person:    "COMP_01".into(),
    role_type: "composer".into(),
    edition:   None,
    piece:     "MOD_001".into(),
  };
  let ghost = RoleFields { person: "GHOST".into(), ..composer.clone() };
  let records = [
    FixtureRecord::new("crim.crimrole", composer),
    FixtureRecord::new("crim.crimrole", ghost),
  ];

  let err = apply_fixture(&s, &records).await.unwrap_err();
  assert!(matches!(err, Error::Apply { record: 2, .. }));

  let roles = s.list_roles(Some("MOD_001")).await.unwrap();
  assert_eq!(roles.len(), 1);
  assert_eq!(roles[0].person, "COMP_01");
}
