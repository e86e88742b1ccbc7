//! Slug rules for relationship identifiers.
//!
//! Generated slugs look like `<model piece>-<derivative piece>-<n>`, with
//! `n` counting up from 1 until an unused value is found.

use crate::{Error, Result};

/// Maximum slug length accepted by the `relationships` table.
pub const MAX_SLUG_LEN: usize = 64;

/// The common prefix of all generated slugs for a pair of pieces.
pub fn slug_base(model_piece: &str, derivative_piece: &str) -> String {
  format!("{model_piece}-{derivative_piece}")
}

/// The `suffix`-th candidate for `base`; suffixes start at 1.
pub fn slug_candidate(base: &str, suffix: u32) -> String {
  format!("{base}-{suffix}")
}

/// Check that `slug` is non-empty, short enough and made only of ASCII
/// letters, digits, underscores and hyphens.
pub fn validate_slug(slug: &str) -> Result<()> {
  if slug.is_empty() {
    return Err(Error::InvalidSlug(slug.to_owned(), "empty"));
  }
  if slug.len() > MAX_SLUG_LEN {
    return Err(Error::InvalidSlug(slug.to_owned(), "longer than 64 characters"));
  }
  if !slug
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
  {
    return Err(Error::InvalidSlug(
      slug.to_owned(),
      "only letters, digits, '_' and '-' are allowed",
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn candidates_join_pieces_and_suffix() {
    let base = slug_base("CRIM_Model_0008", "CRIM_Mass_0005_3");
    assert_eq!(base, "CRIM_Model_0008-CRIM_Mass_0005_3");
    assert_eq!(slug_candidate(&base, 1), "CRIM_Model_0008-CRIM_Mass_0005_3-1");
    assert_eq!(slug_candidate(&base, 12), "CRIM_Model_0008-CRIM_Mass_0005_3-12");
  }

  #[test]
  fn validation() {
    assert!(validate_slug("pieceA-pieceB-1").is_ok());
    assert!(validate_slug("").is_err());
    assert!(validate_slug("has space").is_err());
    assert!(validate_slug("slash/y").is_err());
    assert!(validate_slug(&"a".repeat(MAX_SLUG_LEN)).is_ok());
    assert!(matches!(
      validate_slug(&"a".repeat(MAX_SLUG_LEN + 1)),
      Err(Error::InvalidSlug(..))
    ));
  }
}
