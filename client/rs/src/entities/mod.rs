use typeshare::typeshare;

pub mod allocation;
pub mod config;
pub mod form;
pub mod job;
pub mod logger;
pub mod logs;
pub mod namespace;

/// Typeshare as `number`, deserialize as i64.
#[typeshare(serialized_as = "number")]
pub type I64 = i64;

/// Typeshare as `number`, deserialize as u64.
#[typeshare(serialized_as = "number")]
pub type U64 = u64;

pub const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Form durations are whole seconds, the cluster API takes
/// nanoseconds. Exact integer multiplication, no float path.
pub fn secs_to_nanos(secs: u64) -> i64 {
  secs as i64 * NANOS_PER_SEC
}

/// Inverse of [secs_to_nanos]. Floor division, negative inputs
/// clamp to zero.
pub fn nanos_to_secs(nanos: i64) -> u64 {
  (nanos / NANOS_PER_SEC).max(0) as u64
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duration_round_trip_is_exact() {
    for secs in [0, 1, 5, 30, 86_400, 1_000_000] {
      assert_eq!(nanos_to_secs(secs_to_nanos(secs)), secs);
    }
  }

  #[test]
  fn nanos_floor_divide() {
    assert_eq!(nanos_to_secs(1_999_999_999), 1);
    assert_eq!(nanos_to_secs(999_999_999), 0);
    assert_eq!(nanos_to_secs(-5), 0);
  }
}
