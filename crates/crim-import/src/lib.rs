//! Piece-role import for the CRIM catalog.
//!
//! Turns the model catalog spreadsheet export into a fixture of role records:
//! one composer role and one editor role per catalogued model. Lookups
//! against the catalog store happen once, up front ([`RoleLookups::load`]);
//! the row transform itself ([`process_roles`]) is pure over those lookups.

pub mod error;
pub mod fixture;
pub mod lookups;
pub mod settings;
pub mod transform;

use std::fs::File;

use crim_core::store::CatalogStore;

pub use error::{Error, Result};
pub use fixture::{FixtureRecord, RoleFields, apply_fixture, write_fixture};
pub use lookups::RoleLookups;
pub use settings::ImportConfig;
pub use transform::{CatalogRow, RoleNames, process_roles};

/// Run the whole import: resolve lookups from `store`, transform
/// `config.input`, and write `config.output`.
///
/// Nothing is written unless every row resolves.
pub async fn run<S: CatalogStore>(
  store: &S,
  config: &ImportConfig,
) -> Result<Vec<FixtureRecord>> {
  let lookups = RoleLookups::load(store).await?;
  tracing::info!(
    people = lookups.people_len(),
    pieces = lookups.pieces_len(),
    "lookups loaded"
  );

  let input = File::open(&config.input)?;
  let records = process_roles(input, &lookups, &config.role_names())?;

  write_fixture(&config.output, &records)?;
  tracing::info!(
    records = records.len(),
    output = %config.output.display(),
    "fixture written"
  );

  Ok(records)
}

#[cfg(test)]
mod tests;
