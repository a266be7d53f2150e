pub mod member;
pub mod credit;
pub mod payment;
pub mod notification;
pub mod setting;

use chrono::{DateTime, Duration, Utc};

/// Next `updated_at` value for a record last touched at `previous`.
///
/// Two updates inside the same clock tick still produce strictly increasing
/// timestamps.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
