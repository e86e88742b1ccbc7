//! Relationships between observations and their type taxonomy.
//!
//! A relationship links a *model* observation to a *derivative* observation
//! that quotes or transforms it. What kind of borrowing took place is
//! recorded as a set of [`RelationshipType`] tags drawn from a fixed
//! two-level taxonomy: five categories, three of which have sub-types.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

// ─── Taxonomy ────────────────────────────────────────────────────────────────

/// One tag of the relationship-type taxonomy.
///
/// The string form (`rt_q`, `rt_tm_retrograde`, …) is stable: it names the
/// database column and the serialised value.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  AsRefStr,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum RelationshipType {
  // ── Quotation ───────────────────────────────────────────────────────────
  #[strum(serialize = "rt_q")]
  Quotation,
  #[strum(serialize = "rt_q_exact")]
  Exact,
  #[strum(serialize = "rt_q_monnayage")]
  Monnayage,

  // ── Mechanical transformation ───────────────────────────────────────────
  #[strum(serialize = "rt_tm")]
  MechanicalTransformation,
  #[strum(serialize = "rt_tm_snd")]
  SoundingInDifferentVoices,
  #[strum(serialize = "rt_tm_minv")]
  MelodicallyInverted,
  #[strum(serialize = "rt_tm_retrograde")]
  Retrograde,
  #[strum(serialize = "rt_tm_ms")]
  MetricallyShifted,
  #[strum(serialize = "rt_tm_transposed")]
  Transposed,
  #[strum(serialize = "rt_tm_invertible")]
  InvertibleCounterpoint,

  // ── Non-mechanical transformation ───────────────────────────────────────
  #[strum(serialize = "rt_tnm")]
  NonMechanicalTransformation,
  #[strum(serialize = "rt_tnm_embellished")]
  Embellished,
  #[strum(serialize = "rt_tnm_reduced")]
  Reduced,
  #[strum(serialize = "rt_tnm_amplified")]
  Amplified,
  #[strum(serialize = "rt_tnm_truncated")]
  Truncated,
  #[strum(serialize = "rt_tnm_ncs")]
  NewCounterSubject,
  #[strum(serialize = "rt_tnm_ocs")]
  OldCounterSubjectShifted,
  #[strum(serialize = "rt_tnm_ocst")]
  OldCounterSubjectTransposed,
  #[strum(serialize = "rt_tnm_nc")]
  NewCombination,

  // ── Categories without sub-types ────────────────────────────────────────
  #[strum(serialize = "rt_nm")]
  NewMaterial,
  #[strum(serialize = "rt_om")]
  Omission,
}

impl RelationshipType {
  /// The category a sub-type rolls up into. `None` for the categories
  /// themselves.
  pub fn parent(self) -> Option<Self> {
    use RelationshipType::*;
    match self {
      Exact | Monnayage => Some(Quotation),
      SoundingInDifferentVoices
      | MelodicallyInverted
      | Retrograde
      | MetricallyShifted
      | Transposed
      | InvertibleCounterpoint => Some(MechanicalTransformation),
      Embellished
      | Reduced
      | Amplified
      | Truncated
      | NewCounterSubject
      | OldCounterSubjectShifted
      | OldCounterSubjectTransposed
      | NewCombination => Some(NonMechanicalTransformation),
      Quotation
      | MechanicalTransformation
      | NonMechanicalTransformation
      | NewMaterial
      | Omission => None,
    }
  }

  pub fn is_category(self) -> bool { self.parent().is_none() }

  /// All sub-types of this category, in taxonomy order.
  pub fn children(self) -> impl Iterator<Item = Self> {
    Self::iter().filter(move |t| t.parent() == Some(self))
  }

  /// Human-readable label, as shown to curators.
  pub fn label(self) -> &'static str {
    use RelationshipType::*;
    match self {
      Quotation => "quotation",
      Exact => "exact",
      Monnayage => "monnayage",
      MechanicalTransformation => "mechanical transformation",
      SoundingInDifferentVoices => "sounding in different voice(s)",
      MelodicallyInverted => "melodically inverted",
      Retrograde => "retrograde",
      MetricallyShifted => "metrically shifted",
      Transposed => "transposed",
      InvertibleCounterpoint => "double or invertible counterpoint",
      NonMechanicalTransformation => "non-mechanical transformation",
      Embellished => "embellished",
      Reduced => "reduced",
      Amplified => "amplified",
      Truncated => "truncated",
      NewCounterSubject => "new counter-subject",
      OldCounterSubjectShifted => "old counter-subject shifted",
      OldCounterSubjectTransposed => "old counter-subject transposed",
      NewCombination => "new combination",
      NewMaterial => "new material",
      Omission => "omission",
    }
  }

  /// Parse the stable string form (e.g. `"rt_tm_retrograde"`).
  pub fn parse(s: &str) -> Result<Self> {
    s.parse()
      .map_err(|_| Error::UnknownRelationshipType(s.to_owned()))
  }
}

impl fmt::Display for RelationshipType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_ref())
  }
}

impl Serialize for RelationshipType {
  fn serialize<S: Serializer>(
    &self,
    serializer: S,
  ) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_ref())
  }
}

impl<'de> Deserialize<'de> for RelationshipType {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> std::result::Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    Self::parse(&s).map_err(de::Error::custom)
  }
}

// ─── Tag set ─────────────────────────────────────────────────────────────────

/// The set of relationship types asserted for one relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipTypes(BTreeSet<RelationshipType>);

impl RelationshipTypes {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, t: RelationshipType) -> bool { self.0.insert(t) }

  pub fn remove(&mut self, t: RelationshipType) -> bool { self.0.remove(&t) }

  pub fn contains(&self, t: RelationshipType) -> bool { self.0.contains(&t) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = RelationshipType> + '_ {
    self.0.iter().copied()
  }

  /// Category tags implied by the sub-types in this set, whether or not
  /// they are already present.
  pub fn required_parents(&self) -> BTreeSet<RelationshipType> {
    self.iter().filter_map(RelationshipType::parent).collect()
  }

  /// Force every implied category on. Never removes a tag.
  pub fn roll_up(&mut self) {
    let parents = self.required_parents();
    self.0.extend(parents);
  }

  /// Whether every sub-type's category is present.
  pub fn is_rolled_up(&self) -> bool {
    self.required_parents().iter().all(|p| self.0.contains(p))
  }
}

impl FromIterator<RelationshipType> for RelationshipTypes {
  fn from_iter<I: IntoIterator<Item = RelationshipType>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl Extend<RelationshipType> for RelationshipTypes {
  fn extend<I: IntoIterator<Item = RelationshipType>>(&mut self, iter: I) {
    self.0.extend(iter);
  }
}

// ─── Relationship ────────────────────────────────────────────────────────────

/// A persisted relationship between two observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
  /// Assigned once on creation; never changes.
  pub relationship_id:        String,
  /// Person who recorded the relationship. Cleared if that person is
  /// removed.
  pub observer:               Option<String>,
  pub model_observation:      String,
  pub derivative_observation: String,
  /// Display the derivative as the model and vice versa.
  pub reverse_direction:      bool,
  pub types:                  RelationshipTypes,
  /// Free text; supports Markdown.
  pub remarks:                String,
  pub created:                DateTime<Utc>,
  pub updated:                DateTime<Utc>,
  pub needs_review:           bool,
}

impl fmt::Display for Relationship {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.relationship_id)
  }
}

// ─── NewRelationship ─────────────────────────────────────────────────────────

/// Input to [`crate::store::CatalogStore::create_relationship`].
///
/// `relationship_id` is normally left empty and derived by the store from
/// the pieces the two observations belong to.
#[derive(Debug, Clone)]
pub struct NewRelationship {
  pub relationship_id:        Option<String>,
  pub observer:               Option<String>,
  pub model_observation:      String,
  pub derivative_observation: String,
  pub reverse_direction:      bool,
  pub types:                  RelationshipTypes,
  pub remarks:                String,
  pub needs_review:           bool,
}

impl NewRelationship {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(
    model_observation: impl Into<String>,
    derivative_observation: impl Into<String>,
  ) -> Self {
    Self {
      relationship_id: None,
      observer: None,
      model_observation: model_observation.into(),
      derivative_observation: derivative_observation.into(),
      reverse_direction: false,
      types: RelationshipTypes::new(),
      remarks: String::new(),
      needs_review: false,
    }
  }

  pub fn with_types(
    mut self,
    types: impl IntoIterator<Item = RelationshipType>,
  ) -> Self {
    self.types.extend(types);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::{RelationshipType::*, *};

  #[test]
  fn every_sub_type_implies_its_category() {
    for t in RelationshipType::iter().filter(|t| !t.is_category()) {
      let mut set: RelationshipTypes = [t].into_iter().collect();
      set.roll_up();
      assert!(set.contains(t.parent().unwrap()), "{t} did not roll up");
      assert_eq!(set.len(), 2);
    }
  }

  #[test]
  fn new_combination_rolls_up_to_non_mechanical() {
    let mut set: RelationshipTypes = [NewCombination].into_iter().collect();
    set.roll_up();
    assert!(set.contains(NonMechanicalTransformation));
  }

  #[test]
  fn roll_up_is_idempotent_and_never_clears() {
    let mut set: RelationshipTypes =
      [Quotation, Retrograde, Embellished, Omission].into_iter().collect();
    set.roll_up();
    let once = set.clone();
    set.roll_up();
    assert_eq!(set, once);
    for t in [Quotation, Retrograde, Embellished, Omission] {
      assert!(set.contains(t));
    }
    assert!(set.contains(MechanicalTransformation));
    assert!(set.contains(NonMechanicalTransformation));
  }

  #[test]
  fn categories_alone_imply_nothing() {
    let set: RelationshipTypes =
      [Quotation, NewMaterial, Omission].into_iter().collect();
    assert!(set.required_parents().is_empty());
    assert!(set.is_rolled_up());
  }

  #[test]
  fn taxonomy_shape() {
    assert_eq!(RelationshipType::iter().count(), 21);
    assert_eq!(Quotation.children().count(), 2);
    assert_eq!(MechanicalTransformation.children().count(), 6);
    assert_eq!(NonMechanicalTransformation.children().count(), 8);
    assert_eq!(NewMaterial.children().count(), 0);
  }

  #[test]
  fn stable_names_parse_back() {
    for t in RelationshipType::iter() {
      assert_eq!(RelationshipType::parse(t.as_ref()).unwrap(), t);
    }
    assert_eq!(Retrograde.to_string(), "rt_tm_retrograde");
    assert!(matches!(
      RelationshipType::parse("tnm_nc"),
      Err(Error::UnknownRelationshipType(_))
    ));
  }

  #[test]
  fn types_serialize_as_names() {
    let set: RelationshipTypes = [Exact, Quotation].into_iter().collect();
    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, r#"["rt_q","rt_q_exact"]"#);
    let back: RelationshipTypes = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
  }
}
