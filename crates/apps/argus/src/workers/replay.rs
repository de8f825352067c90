use std::collections::HashMap;
use std::path::Path;

use lib_common::time::now_nanos;
use lib_track::EventDispatcher;
use serde::Deserialize;
use tokio::time::{sleep, sleep_until, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::Result;

/// Grace period after the last event so in-flight dispatch settles before
/// the agent stops.
const SETTLE: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct Session {
	#[serde(default)]
	event: Vec<SessionEvent>,
}

#[derive(Debug, Deserialize)]
struct SessionEvent {
	name: String,
	#[serde(default)]
	after_ms: u64,
	#[serde(default)]
	marker: bool,
	#[serde(default)]
	props: Option<HashMap<String, String>>,
}

/// Feeds a recorded session into the dispatcher, pacing each event by its
/// offset from the session start.
pub struct ReplayWorker {
	session: Session,
	dispatcher: EventDispatcher,
	hold_open: bool,
}

impl ReplayWorker {
	pub fn start(session_path: impl AsRef<Path>, dispatcher: EventDispatcher, hold_open: bool) -> Result<Self> {
		let content = std::fs::read_to_string(session_path)?;
		let session: Session = toml::from_str(&content)?;

		Ok(ReplayWorker {
			session,
			dispatcher,
			hold_open,
		})
	}

	pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
		let started = Instant::now();

		for event in &self.session.event {
			let at = started + Duration::from_millis(event.after_ms);
			tokio::select! {
				_ = shutdown.cancelled() => return Ok(()),
				_ = sleep_until(at) => {}
			}

			let time_nanos = now_nanos();
			if event.marker {
				self.dispatcher.add_marker_event(event.name.as_str(), time_nanos, event.props.clone())?;
			} else {
				self.dispatcher.add_event(event.name.as_str(), time_nanos, event.props.clone())?;
			}
			info!("Replayed '{}' at +{}ms", event.name, event.after_ms);
		}

		if !self.hold_open {
			sleep(SETTLE).await;
			shutdown.cancel();
		}

		Ok(())
	}
}

// region:    --- Tests


// endregion: --- Tests
