//! Import configuration.
//!
//! Values come from an optional TOML file, then `CRIM_`-prefixed environment
//! variables, then command-line overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::transform::RoleNames;

/// Settings for one run of the piece-role import.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
  /// Catalog CSV export to read.
  pub input:         PathBuf,
  /// Fixture file to write.
  pub output:        PathBuf,
  /// SQLite catalog the lookups are resolved against.
  pub store_path:    PathBuf,
  pub composer_role: String,
  pub editor_role:   String,
  /// `model` label written on every fixture record.
  pub fixture_model: String,
}

impl Default for ImportConfig {
  fn default() -> Self {
    let names = RoleNames::default();
    Self {
      input:         PathBuf::from("source/CRIM_Model_Catalog.csv"),
      output:        PathBuf::from("../crim/fixtures/piece_roles.json"),
      store_path:    PathBuf::from("crim.sqlite3"),
      composer_role: names.composer,
      editor_role:   names.editor,
      fixture_model: names.fixture_model,
    }
  }
}

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub input:      Option<PathBuf>,
  pub output:     Option<PathBuf>,
  pub store_path: Option<PathBuf>,
}

impl ImportConfig {
  /// Layer `file` (if it exists), the environment and `overrides`.
  pub fn load(file: &Path, overrides: Overrides) -> Result<Self, config::ConfigError> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("CRIM"))
      .build()?;

    let mut cfg: Self = settings.try_deserialize()?;
    if let Some(input) = overrides.input {
      cfg.input = input;
    }
    if let Some(output) = overrides.output {
      cfg.output = output;
    }
    if let Some(store_path) = overrides.store_path {
      cfg.store_path = store_path;
    }
    Ok(cfg)
  }

  pub fn role_names(&self) -> RoleNames {
    RoleNames {
      composer:      self.composer_role.clone(),
      editor:        self.editor_role.clone(),
      fixture_model: self.fixture_model.clone(),
    }
  }
}
