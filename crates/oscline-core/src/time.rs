//! OSC time tags
//!
//! Time tags use the NTP 64-bit fixed point format: whole seconds since
//! 1900-01-01 in the upper 32 bits, fractions of a second in the lower 32.
//! The special value `1` means "immediately".

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time tag meaning "process on receipt"
pub const IMMEDIATE: u64 = 1;

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const FRACTION_SCALE: f64 = 4_294_967_296.0; // 2^32

/// Whole seconds since 1900
pub fn seconds(tag: u64) -> u32 {
    (tag >> 32) as u32
}

/// Fractional part in units of 2^-32 seconds
pub fn fraction(tag: u64) -> u32 {
    tag as u32
}

pub fn from_parts(seconds: u32, fraction: u32) -> u64 {
    ((seconds as u64) << 32) | fraction as u64
}

/// Build a time tag from a duration since the NTP epoch
pub fn from_duration_since_ntp_epoch(since: Duration) -> u64 {
    let secs = since.as_secs() as u32;
    let frac = (since.subsec_nanos() as f64 / 1e9 * FRACTION_SCALE) as u32;
    from_parts(secs, frac)
}

/// Duration since the NTP epoch represented by a time tag
pub fn to_duration_since_ntp_epoch(tag: u64) -> Duration {
    let nanos = (fraction(tag) as f64 / FRACTION_SCALE * 1e9) as u32;
    Duration::new(seconds(tag) as u64, nanos.min(999_999_999))
}

/// Convert a wall-clock time to a time tag.
///
/// Times before 1970 clamp to the Unix epoch.
pub fn from_system_time(time: SystemTime) -> u64 {
    let since_unix = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    from_duration_since_ntp_epoch(since_unix + Duration::from_secs(NTP_UNIX_OFFSET))
}

/// Convert a time tag to wall-clock time.
///
/// Tags before 1970 clamp to the Unix epoch.
pub fn to_system_time(tag: u64) -> SystemTime {
    let since_ntp = to_duration_since_ntp_epoch(tag);
    let since_unix = since_ntp.saturating_sub(Duration::from_secs(NTP_UNIX_OFFSET));
    UNIX_EPOCH + since_unix
}

/// Current time as a time tag
pub fn now() -> u64 {
    from_system_time(SystemTime::now())
}
