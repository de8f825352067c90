use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time as nanoseconds since the Unix epoch.
pub fn now_nanos() -> i64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_or(0, |d| d.as_nanos() as i64)
}
