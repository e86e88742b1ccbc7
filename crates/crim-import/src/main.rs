//! `piece-roles`: build the piece-role fixture from the model catalog.
//!
//! Reads the catalog CSV, resolves people, pieces and role types against the
//! SQLite catalog, and writes a JSON fixture with a composer and an editor
//! role per catalogued model.
//!
//! ```
//! piece-roles --store crim.sqlite3 --input source/CRIM_Model_Catalog.csv
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use crim_import::{ImportConfig, apply_fixture, settings::Overrides};
use crim_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Build the CRIM piece-role fixture")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "piece-roles.toml")]
  config: PathBuf,

  /// Catalog CSV export to read.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// Fixture file to write.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// SQLite catalog used to resolve people, pieces and role types.
  #[arg(long)]
  store: Option<PathBuf>,

  /// Also insert the generated roles into the catalog.
  #[arg(long)]
  load: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ImportConfig::load(&cli.config, Overrides {
    input:      cli.input,
    output:     cli.output,
    store_path: cli.store,
  })
  .context("failed to load import configuration")?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let records = crim_import::run(&store, &cfg)
    .await
    .with_context(|| format!("failed to import {:?}", cfg.input))?;

  if cli.load {
    let roles = apply_fixture(&store, &records)
      .await
      .context("failed to load roles into the catalog")?;
    tracing::info!(roles = roles.len(), "roles loaded");
  }

  Ok(())
}
