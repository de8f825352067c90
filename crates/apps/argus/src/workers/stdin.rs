use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

use governor::{DefaultDirectRateLimiter, Quota};
use lib_common::time::now_nanos;
use lib_track::EventDispatcher;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Reads the line protocol from stdin and feeds the dispatcher:
///
/// ```text
/// cart_viewed screen=cart
/// !network_lost
/// ```
///
/// A leading `!` marks a marker event; `key=value` pairs become properties.
pub struct StdinWorker {
	dispatcher: EventDispatcher,
	limiter: DefaultDirectRateLimiter,
	dropped: AtomicU64,
}

impl StdinWorker {
	pub fn start(dispatcher: EventDispatcher) -> Result<Self> {
		let rate = NonZeroU32::new(10).ok_or(Error::InvalidRate)?;
		let burst = NonZeroU32::new(50).ok_or(Error::InvalidRate)?;

		let limiter = DefaultDirectRateLimiter::direct(Quota::per_second(rate).allow_burst(burst));

		Ok(StdinWorker {
			dispatcher,
			limiter,
			dropped: AtomicU64::new(0),
		})
	}

	pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
		let mut lines = BufReader::new(tokio::io::stdin()).lines();

		loop {
			tokio::select! {
				_ = shutdown.cancelled() => break,

				line = lines.next_line() => {
					match line? {
						Some(line) => {
							if let Err(e) = self.on_line(line.trim()) {
								warn!("{e}");
							}
						}
						None => {
							shutdown.cancel();
							break;
						}
					}
				}
			}
		}
		Ok(())
	}

	fn on_line(&self, line: &str) -> Result<()> {
		if line.is_empty() {
			return Ok(());
		}

		let (marker, rest) = match line.strip_prefix('!') {
			Some(rest) => (true, rest),
			None => (false, line),
		};

		let mut parts = rest.split_whitespace();
		let name = parts.next().ok_or_else(|| Error::MalformedLine(line.to_string()))?;

		let mut props: HashMap<String, String> = HashMap::new();
		for part in parts {
			let (key, value) = part.split_once('=').ok_or_else(|| Error::MalformedLine(line.to_string()))?;
			props.insert(key.to_string(), value.to_string());
		}
		let props = (!props.is_empty()).then_some(props);

		let time_nanos = now_nanos();
		if marker {
			self.dispatcher.add_marker_event(name, time_nanos, props)?;
		} else {
			self.dispatcher.add_event(name, time_nanos, props)?;
		}

		// The echo is throttled so a chatty feed cannot flood the log.
		if self.limiter.check().is_ok() {
			info!("Ingested '{name}' (marker: {marker})");
		} else {
			self.dropped.fetch_add(1, Ordering::Relaxed);
		}

		Ok(())
	}
}

// region:    --- Tests


// endregion: --- Tests
