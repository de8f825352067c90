use std::sync::Arc;

use lib_event::trx::{new_channel, Rx, Tx};
use lib_match::{Interaction, RunningStatus};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config_source::ConfigSource;
use crate::dispatcher::{DispatchWorker, EventDispatcher};
use crate::error::Result;
use crate::tracker::{InteractionTracker, TrackerMsg, TrackerUpdate};

/// Read handle over the coordinator's aggregated snapshot, one status per
/// tracker in configuration order. `current` is non-blocking; `changed`
/// resolves on the next value-distinct snapshot.
#[derive(Clone)]
pub struct StatusBoard {
	rx: watch::Receiver<Arc<Vec<RunningStatus>>>,
}

impl StatusBoard {
	pub fn current(&self) -> Arc<Vec<RunningStatus>> {
		self.rx.borrow().clone()
	}

	pub async fn changed(&mut self) -> Result<()> {
		self.rx.changed().await?;
		Ok(())
	}
}

/// Owns the tracker fleet for one configuration fetch. Configurations are
/// fetched exactly once; a failed fetch leaves the coordinator running as a
/// pass-through with zero trackers.
pub struct InteractionCoordinator {
	dispatcher: EventDispatcher,
	board: StatusBoard,
	completions_rx: Rx<Interaction>,
	shutdown: CancellationToken,
	tasks: JoinSet<Result<()>>,
}

impl InteractionCoordinator {
	pub async fn start(source: &impl ConfigSource) -> Result<Self> {
		let configs = match source.fetch().await {
			Ok(configs) => configs,
			Err(e) => {
				warn!("Interaction config fetch failed, tracking disabled: {e}");
				Vec::new()
			}
		};

		let shutdown = CancellationToken::new();
		let mut tasks = JoinSet::new();

		let (dispatcher, dispatch_worker) = DispatchWorker::start();
		let (updates_tx, updates_rx) = new_channel::<TrackerUpdate>("tracker_updates");
		let (completions_tx, completions_rx) = new_channel::<Interaction>("completions");

		let mut tracker_txs: Vec<Tx<TrackerMsg>> = Vec::new();
		for config in configs {
			let config = Arc::new(config);
			let (tx, rx) = new_channel::<TrackerMsg>("tracker");
			let slot = tracker_txs.len();

			match InteractionTracker::start(slot, config.clone(), rx, updates_tx.clone()) {
				Ok(tracker) => {
					info!("Tracking interaction '{}' (id {})", config.name, config.id);
					tracker_txs.push(tx);
					tasks.spawn(tracker.run(shutdown.clone()));
				}
				Err(e) => warn!("Skipping interaction '{}': {e}", config.name),
			}
		}

		let (board_tx, board_rx) = watch::channel(Arc::new(vec![RunningStatus::NoMatch; tracker_txs.len()]));

		let aggregator = StatusAggregator {
			updates_rx,
			completions_tx,
			board_tx,
			statuses: vec![RunningStatus::NoMatch; tracker_txs.len()],
		};
		tasks.spawn(aggregator.run(shutdown.clone()));

		dispatcher.attach(tracker_txs)?;
		tasks.spawn(dispatch_worker.run(shutdown.clone()));

		Ok(InteractionCoordinator {
			dispatcher,
			board: StatusBoard { rx: board_rx },
			completions_rx,
			shutdown,
			tasks,
		})
	}

	pub fn dispatcher(&self) -> EventDispatcher {
		self.dispatcher.clone()
	}

	pub fn states(&self) -> StatusBoard {
		self.board.clone()
	}

	/// Every finished interaction, success or failure, exactly once each.
	pub fn completions(&self) -> Rx<Interaction> {
		self.completions_rx.clone()
	}

	/// Cancels trackers and their timers. Matches still in flight are
	/// discarded without producing a final interaction.
	pub async fn shutdown(mut self) -> Result<()> {
		self.shutdown.cancel();
		while let Some(res) = self.tasks.join_next().await {
			res??;
		}
		Ok(())
	}
}

/// Folds tracker updates into the published snapshot. Publication is
/// deduplicated by value, so subscribers only wake on real changes.
struct StatusAggregator {
	updates_rx: Rx<TrackerUpdate>,
	completions_tx: Tx<Interaction>,
	board_tx: watch::Sender<Arc<Vec<RunningStatus>>>,
	statuses: Vec<RunningStatus>,
}

impl StatusAggregator {
	async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
		loop {
			tokio::select! {
				_ = shutdown.cancelled() => break,

				update = self.updates_rx.recv() => {
					let Ok(TrackerUpdate { slot, status }) = update else { break };

					if let Some(interaction) = status.completed() {
						self.completions_tx.send(interaction.clone()).await?;
					}

					if let Some(entry) = self.statuses.get_mut(slot) {
						*entry = status;
					}

					let snapshot = Arc::new(self.statuses.clone());
					if *self.board_tx.borrow() != snapshot {
						let _ = self.board_tx.send(snapshot);
					}
				}
			}
		}
		Ok(())
	}
}

// region:    --- Tests


// endregion: --- Tests
