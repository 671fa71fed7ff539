//! Small shared helpers

use crate::prelude::*;

/// Midnight at the start of the same calendar day.
pub fn day_start(at: DateTime) -> DateTime {
  at.date().and_hms_opt(0, 0, 0).unwrap_or(at)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_day_start() {
    let noon = chrono::NaiveDate::from_ymd_opt(2026, 8, 5)
      .unwrap()
      .and_hms_opt(12, 34, 56)
      .unwrap();

    let start = day_start(noon);
    assert_eq!(start.date(), noon.date());
    assert_eq!(start.time(), chrono::NaiveTime::MIN);
    assert_eq!(day_start(start), start);
  }
}
