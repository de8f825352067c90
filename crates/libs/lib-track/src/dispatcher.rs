use std::collections::HashMap;
use std::sync::Arc;

use lib_common::event::LocalEvent;
use lib_event::trx::{new_channel, Rx, Tx};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;
use crate::tracker::TrackerMsg;

pub(crate) enum DispatchMsg {
	Event(LocalEvent),
	Marker(LocalEvent),
	Attach(Vec<Tx<TrackerMsg>>),
}

/// Producer-facing ingestion handle. `add_event`/`add_marker_event` are
/// non-blocking and safe to call from any task or thread; ordering across
/// calls is the order they enqueued.
#[derive(Clone)]
pub struct EventDispatcher {
	tx: Tx<DispatchMsg>,
}

impl EventDispatcher {
	pub fn add_event(&self, name: impl Into<Arc<str>>, time_nanos: i64, props: Option<HashMap<String, String>>) -> Result<()> {
		self.tx.send_sync(DispatchMsg::Event(Self::local_event(name, time_nanos, props)))?;
		Ok(())
	}

	pub fn add_marker_event(
		&self,
		name: impl Into<Arc<str>>,
		time_nanos: i64,
		props: Option<HashMap<String, String>>,
	) -> Result<()> {
		self.tx.send_sync(DispatchMsg::Marker(Self::local_event(name, time_nanos, props)))?;
		Ok(())
	}

	pub(crate) fn attach(&self, trackers: Vec<Tx<TrackerMsg>>) -> Result<()> {
		self.tx.send_sync(DispatchMsg::Attach(trackers))?;
		Ok(())
	}

	fn local_event(name: impl Into<Arc<str>>, time_nanos: i64, props: Option<HashMap<String, String>>) -> LocalEvent {
		match props {
			Some(props) => LocalEvent::with_props(name, time_nanos, props),
			None => LocalEvent::new(name, time_nanos),
		}
	}
}

/// Drains the ingestion queue and broadcasts each event to every attached
/// tracker, in enqueue order. Each tracker gets its own serialized feed;
/// events arriving while no tracker is attached are dropped.
pub struct DispatchWorker {
	rx: Rx<DispatchMsg>,
	trackers: Vec<Tx<TrackerMsg>>,
}

impl DispatchWorker {
	pub fn start() -> (EventDispatcher, Self) {
		let (tx, rx) = new_channel::<DispatchMsg>("dispatch");

		(
			EventDispatcher { tx },
			DispatchWorker {
				rx,
				trackers: Vec::new(),
			},
		)
	}

	pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
		loop {
			tokio::select! {
				_ = shutdown.cancelled() => break,

				msg = self.rx.recv() => {
					let Ok(msg) = msg else { break };
					match msg {
						DispatchMsg::Event(event) => self.broadcast(TrackerMsg::Event(event)).await,
						DispatchMsg::Marker(marker) => self.broadcast(TrackerMsg::Marker(marker)).await,
						DispatchMsg::Attach(trackers) => {
							debug!("{} tracker(s) attached to dispatcher", trackers.len());
							self.trackers = trackers;
						}
					}
				}
			}
		}
		Ok(())
	}

	async fn broadcast(&self, msg: TrackerMsg) {
		for tx in &self.trackers {
			if let Err(e) = tx.send(msg.clone()).await {
				warn!("Dropping event for a stopped tracker: {e}");
			}
		}
	}
}

// region:    --- Tests


// endregion: --- Tests
