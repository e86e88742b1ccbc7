//! The CSV row → role record transform.

use std::io;

use crim_core::date::date_sort;
use serde::Deserialize;

use crate::{
  Error, Result,
  fixture::{EditionDate, FixtureRecord, RoleFields},
  lookups::RoleLookups,
};

/// The columns of `CRIM_Model_Catalog.csv` the import reads. Other columns
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRow {
  #[serde(rename = "CRIM_Model_ID")]
  pub model_id:  String,
  /// The composer.
  #[serde(rename = "Person_ID")]
  pub person_id: String,
  #[serde(rename = "Editor Person ID")]
  pub editor_id: String,
  /// Edition date, free text. Empty when a short row omits it.
  #[serde(rename = "Date", default)]
  pub date:      String,
}

/// Role-type names and fixture model label used when emitting records.
#[derive(Debug, Clone)]
pub struct RoleNames {
  pub composer:      String,
  pub editor:        String,
  pub fixture_model: String,
}

impl Default for RoleNames {
  fn default() -> Self {
    Self {
      composer:      "Composer".to_string(),
      editor:        "Editor".to_string(),
      fixture_model: "crim.crimrole".to_string(),
    }
  }
}

fn resolve_person(lookups: &RoleLookups, row: usize, person_id: &str) -> Result<String> {
  lookups
    .person(person_id)
    .map(str::to_owned)
    .ok_or_else(|| Error::PersonNotFound { row, person_id: person_id.to_owned() })
}

fn resolve_piece(lookups: &RoleLookups, row: usize, piece_id: &str) -> Result<String> {
  lookups
    .piece(piece_id)
    .map(str::to_owned)
    .ok_or_else(|| Error::PieceNotFound { row, piece_id: piece_id.to_owned() })
}

fn resolve_role_type(lookups: &RoleLookups, name: &str) -> Result<String> {
  lookups
    .role_type(name)
    .map(str::to_owned)
    .ok_or_else(|| Error::RoleTypeNotFound(name.to_owned()))
}

/// The composer role for catalog row number `row`.
pub fn composer_role(
  catalog_row: &CatalogRow,
  row: usize,
  lookups: &RoleLookups,
  names: &RoleNames,
) -> Result<RoleFields> {
  Ok(RoleFields {
    person:    resolve_person(lookups, row, &catalog_row.person_id)?,
    role_type: resolve_role_type(lookups, &names.composer)?,
    edition:   None,
    piece:     resolve_piece(lookups, row, &catalog_row.model_id)?,
  })
}

/// The editor role for catalog row number `row`, carrying the edition date.
pub fn editor_role(
  catalog_row: &CatalogRow,
  row: usize,
  lookups: &RoleLookups,
  names: &RoleNames,
) -> Result<RoleFields> {
  Ok(RoleFields {
    person:    resolve_person(lookups, row, &catalog_row.editor_id)?,
    role_type: resolve_role_type(lookups, &names.editor)?,
    edition:   Some(EditionDate {
      date:      catalog_row.date.clone(),
      date_sort: date_sort([&catalog_row.date]),
    }),
    piece:     resolve_piece(lookups, row, &catalog_row.model_id)?,
  })
}

/// Transform a whole catalog CSV into role records: composer then editor for
/// each row, in input order.
///
/// Stops at the first row that fails to parse or resolve.
pub fn process_roles<R: io::Read>(
  input: R,
  lookups: &RoleLookups,
  names: &RoleNames,
) -> Result<Vec<FixtureRecord>> {
  // Rows may be longer or shorter than the header; spreadsheet exports often
  // end rows with a trailing comma.
  let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
  let mut records = Vec::new();

  for (idx, catalog_row) in reader.deserialize::<CatalogRow>().enumerate() {
    let row = idx + 1;
    let catalog_row = catalog_row?;

    let composer = composer_role(&catalog_row, row, lookups, names)?;
    let editor = editor_role(&catalog_row, row, lookups, names)?;

    records.push(FixtureRecord::new(&names.fixture_model, composer));
    records.push(FixtureRecord::new(&names.fixture_model, editor));
  }

  tracing::debug!(rows = records.len() / 2, "catalog rows transformed");
  Ok(records)
}
