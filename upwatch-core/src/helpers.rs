use std::time::{SystemTime, UNIX_EPOCH};

pub fn now() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap()
    .as_secs() as i64
}

/// Returns a y/d/h/m string from a minute count.
pub fn format_minutes(minutes: i64) -> String {
  let years = minutes / (365 * 60 * 24);
  let minutes = minutes % (365 * 60 * 24);
  let days = minutes / (60 * 24);
  let minutes = minutes % (60 * 24);
  let hours = minutes / 60;
  let minutes = minutes % 60;

  if years > 0 {
    return format!("{years}y {days}d {hours}h {minutes}m");
  }

  if days > 0 {
    return format!("{days}d {hours}h {minutes}m");
  }

  if hours > 0 {
    return format!("{hours}h {minutes}m");
  }

  format!("{minutes}m")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn format_minutes_picks_largest_unit() {
    assert_eq!(format_minutes(5), "5m");
    assert_eq!(format_minutes(65), "1h 5m");
    assert_eq!(format_minutes(60 * 24 + 61), "1d 1h 1m");
    assert_eq!(format_minutes(365 * 60 * 24 + 60 * 24), "1y 1d 0h 0m");
  }
}
