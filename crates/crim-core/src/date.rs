//! Sortable-date normalisation for free-text catalog dates.

use std::sync::LazyLock;

use regex::Regex;

/// A standalone four-digit year: no letters, digits or underscores on
/// either side.
static YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is valid"));

/// The earliest four-digit year found in any of `dates`.
///
/// Catalog dates are free text ("1555", "ca. 1540-1545", "before 1568"), so
/// every standalone run of four digits counts as a year. Returns `None` when
/// no year is present.
pub fn date_sort<I, S>(dates: I) -> Option<i32>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  dates
    .into_iter()
    .flat_map(|d| years(d.as_ref()))
    .min()
}

fn years(s: &str) -> Vec<i32> {
  YEAR
    .captures_iter(s)
    .filter_map(|c| c[1].parse().ok())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_year() {
    assert_eq!(date_sort(["1555"]), Some(1555));
  }

  #[test]
  fn earliest_year_wins() {
    assert_eq!(date_sort(["ca. 1545-1540"]), Some(1540));
    assert_eq!(date_sort(["1570", "before 1568"]), Some(1568));
  }

  #[test]
  fn no_year() {
    assert_eq!(date_sort(["unknown"]), None);
    assert_eq!(date_sort([""]), None);
    assert_eq!(date_sort(Vec::<String>::new()), None);
  }

  #[test]
  fn ignores_longer_and_shorter_digit_runs() {
    assert_eq!(date_sort(["no. 12, 15550"]), None);
    assert_eq!(date_sort(["RISM 1549/12"]), Some(1549));
  }

  #[test]
  fn year_glued_to_letters_is_not_a_year() {
    assert_eq!(date_sort(["1555a"]), None);
    assert_eq!(date_sort(["1555a", "1560"]), Some(1560));
  }
}
