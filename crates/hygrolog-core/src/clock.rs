//! Wall-clock helpers.

use time::{OffsetDateTime, PrimitiveDateTime};

/// Current local civil (zone-free) time.
///
/// Falls back to UTC when the local offset cannot be determined, which can
/// happen in multi-threaded processes on some Unix platforms.
#[must_use]
pub fn now_civil() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}
