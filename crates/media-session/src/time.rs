//! Conversions between platform-native time representations and the
//! primitive values handed across the boundary.

/// 100 ns ticks per second, the resolution of the platform's `TimeSpan`.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Offset, in 100 ns ticks, between the platform epoch (1601-01-01 UTC)
/// and the Unix epoch (1970-01-01 UTC).
pub const UNIX_EPOCH_OFFSET_TICKS: i64 = 116_444_736_000_000_000;

/// Whole seconds for a tick count; the fractional second is truncated.
pub fn ticks_to_seconds(ticks: i64) -> i64 {
    ticks / TICKS_PER_SECOND
}

/// Tick count for a whole-second position.
pub fn seconds_to_ticks(seconds: i64) -> i64 {
    seconds * TICKS_PER_SECOND
}

/// Convert a platform timestamp (ticks since the platform epoch) to Unix
/// epoch milliseconds.
pub fn universal_time_to_unix_ms(universal_time: i64) -> i64 {
    (universal_time - UNIX_EPOCH_OFFSET_TICKS) / 10_000
}
