//! Time helpers
//!
//! Lock arithmetic is done in unix epoch milliseconds on the server clock.

use chrono::Utc;

/// Current unix epoch time in milliseconds.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current time as an RFC 3339 string, used in error envelopes.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
