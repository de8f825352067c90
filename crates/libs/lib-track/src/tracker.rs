use std::collections::HashSet;
use std::sync::Arc;

use lib_common::event::LocalEvent;
use lib_event::trx::{Rx, Tx};
use lib_match::{InteractionConfig, RunningStatus, SequenceMatcher, WalkOutcome};
use tokio::time::{sleep_until, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// Extra delay on top of a configuration's timeout so that a completing
/// event and its timer never race on the same millisecond.
const TIMEOUT_BUFFER_MS: u64 = 10;

#[derive(Debug, Clone)]
pub enum TrackerMsg {
	Event(LocalEvent),
	Marker(LocalEvent),
}

/// Status change of one tracker, addressed by its slot in the coordinator's
/// snapshot.
#[derive(Debug, Clone)]
pub struct TrackerUpdate {
	pub slot: usize,
	pub status: RunningStatus,
}

/// Advances one configuration's sequence as relevant events arrive. Owns its
/// state exclusively; the dispatcher guarantees events arrive serialized.
pub struct InteractionTracker {
	slot: usize,
	config: Arc<InteractionConfig>,
	rx: Rx<TrackerMsg>,
	updates_tx: Tx<TrackerUpdate>,
	relevant: HashSet<String>,

	accumulated: Vec<LocalEvent>,
	matched: Vec<LocalEvent>,
	markers: Vec<LocalEvent>,
	interaction_id: Option<Arc<str>>,
	in_progress: bool,
	deadline: Option<Instant>,
	status: RunningStatus,
}

impl InteractionTracker {
	pub fn start(slot: usize, config: Arc<InteractionConfig>, rx: Rx<TrackerMsg>, updates_tx: Tx<TrackerUpdate>) -> Result<Self> {
		config.validate()?;
		let relevant = config.relevant_names();

		Ok(InteractionTracker {
			slot,
			config,
			rx,
			updates_tx,
			relevant,
			accumulated: Vec::new(),
			matched: Vec::new(),
			markers: Vec::new(),
			interaction_id: None,
			in_progress: false,
			deadline: None,
			status: RunningStatus::NoMatch,
		})
	}

	pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
		loop {
			tokio::select! {
				_ = shutdown.cancelled() => break,

				_ = Self::expired(self.deadline) => {
					if self.on_timeout().await.is_err() {
						debug!("Tracker '{}' update channel closed", self.config.name);
						break;
					}
				}

				msg = self.rx.recv() => {
					let Ok(msg) = msg else { break };
					match msg {
						TrackerMsg::Event(event) => {
							if self.on_event(event).await.is_err() {
								debug!("Tracker '{}' update channel closed", self.config.name);
								break;
							}
						}
						TrackerMsg::Marker(marker) => self.markers.push(marker),
					}
				}
			}
		}
		Ok(())
	}

	async fn expired(deadline: Option<Instant>) {
		match deadline {
			Some(at) => sleep_until(at).await,
			None => std::future::pending().await,
		}
	}

	async fn on_event(&mut self, event: LocalEvent) -> Result<()> {
		if !self.relevant.contains(event.name.as_ref()) {
			return Ok(());
		}

		self.insert_sorted(event);

		loop {
			let id = self.ensure_id();
			let outcome = SequenceMatcher::walk(&self.config, &self.accumulated, &self.markers, &id);

			match outcome {
				WalkOutcome::Idle => break,

				WalkOutcome::Advancing { index, matched } => {
					self.matched = matched;
					self.in_progress = true;
					self.arm_timeout();
					self.publish(RunningStatus::Ongoing {
						index,
						interaction_id: id,
						config: self.config.clone(),
						completed: None,
					})
					.await?;
					break;
				}

				WalkOutcome::Completed(interaction) | WalkOutcome::Invalidated(interaction) => {
					let index = interaction.events.len();
					self.clear_walk();
					self.markers.clear();
					self.publish(RunningStatus::Ongoing {
						index,
						interaction_id: id,
						config: self.config.clone(),
						completed: Some(interaction),
					})
					.await?;
					break;
				}

				WalkOutcome::Broken { interaction, resume } => {
					let index = interaction.events.len();
					self.clear_walk();
					self.markers.clear();
					self.publish(RunningStatus::Ongoing {
						index,
						interaction_id: id,
						config: self.config.clone(),
						completed: Some(interaction),
					})
					.await?;
					// The interrupting event starts a fresh walk with a new id.
					self.accumulated.push(resume);
					continue;
				}

				WalkOutcome::Reset => {
					self.clear_walk();
					self.publish(RunningStatus::NoMatch).await?;
					break;
				}
			}
		}

		Ok(())
	}

	async fn on_timeout(&mut self) -> Result<()> {
		let Some(id) = self.interaction_id.clone() else {
			self.deadline = None;
			return Ok(());
		};

		let interaction = SequenceMatcher::failed(&self.config, self.matched.clone(), &self.markers, &id);
		let index = interaction.events.len();
		debug!("Tracker '{}' timed out after {} step(s)", self.config.name, index);

		self.clear_walk();
		self.markers.clear();
		self.publish(RunningStatus::Ongoing {
			index,
			interaction_id: id,
			config: self.config.clone(),
			completed: Some(interaction),
		})
		.await?;

		Ok(())
	}

	/// Stable among equal timestamps: a newcomer goes after its peers, so
	/// same-timestamp ordering follows arrival order.
	fn insert_sorted(&mut self, event: LocalEvent) {
		let at = self.accumulated.partition_point(|e| e.time_nanos <= event.time_nanos);
		self.accumulated.insert(at, event);
	}

	/// The id minted here is reused for every event of one ongoing match and
	/// retired when the walk ends.
	fn ensure_id(&mut self) -> Arc<str> {
		match &self.interaction_id {
			Some(id) => id.clone(),
			None => {
				let id: Arc<str> = Uuid::new_v4().to_string().into();
				self.interaction_id = Some(id.clone());
				id
			}
		}
	}

	fn arm_timeout(&mut self) {
		let ms = self.config.timeout_ms.max(0) as u64 + TIMEOUT_BUFFER_MS;
		self.deadline = Some(Instant::now() + Duration::from_millis(ms));
	}

	fn clear_walk(&mut self) {
		self.accumulated.clear();
		self.matched.clear();
		self.interaction_id = None;
		self.in_progress = false;
		self.deadline = None;
	}

	async fn publish(&mut self, status: RunningStatus) -> Result<()> {
		if self.status == status {
			return Ok(());
		}
		self.status = status.clone();
		self.updates_tx
			.send(TrackerUpdate {
				slot: self.slot,
				status,
			})
			.await?;
		Ok(())
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;
	use lib_event::trx::new_channel;
	use lib_match::SequenceEventSpec;

	fn step(name: &str) -> SequenceEventSpec {
		SequenceEventSpec {
			name: name.to_string(),
			matchers: Vec::new(),
			blacklisted: false,
		}
	}

	fn fx_config(sequence: Vec<SequenceEventSpec>, blacklist: Vec<SequenceEventSpec>) -> InteractionConfig {
		InteractionConfig {
			id: 1,
			name: "checkout".to_string(),
			sequence,
			blacklist,
			lower_limit_ms: 100,
			mid_limit_ms: 500,
			upper_limit_ms: 1000,
			timeout_ms: 20_000,
		}
	}

	fn evt(name: &str, ms: i64) -> LocalEvent {
		LocalEvent::new(name.to_string(), ms * 1_000_000)
	}

	struct Harness {
		tx: Tx<TrackerMsg>,
		updates: Rx<TrackerUpdate>,
		token: CancellationToken,
	}

	fn spawn_tracker(config: InteractionConfig) -> Result<Harness> {
		let (tx, rx) = new_channel::<TrackerMsg>("tracker_test");
		let (updates_tx, updates) = new_channel::<TrackerUpdate>("updates_test");
		let tracker = InteractionTracker::start(0, Arc::new(config), rx, updates_tx)?;
		let token = CancellationToken::new();
		tokio::spawn(tracker.run(token.clone()));

		Ok(Harness { tx, updates, token })
	}

	async fn assert_no_update(updates: &Rx<TrackerUpdate>) {
		let res = tokio::time::timeout(Duration::from_millis(100), updates.recv()).await;
		assert!(res.is_err(), "expected no update, got {res:?}");
	}

	#[tokio::test(start_paused = true)]
	async fn completes_two_step_sequence() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		let advancing = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("b", 50))).await?;
		let completed = h.updates.recv().await?;

		// -- Check
		assert!(advancing.status.is_advancing());
		let interaction = completed.status.completed().expect("should carry an interaction");
		assert!(!interaction.is_errored);
		assert_eq!(interaction.events, vec![evt("a", 0), evt("b", 50)]);
		assert_eq!(interaction.apdex_score, Some(1.0));

		// Same id across the whole match.
		let RunningStatus::Ongoing { interaction_id, .. } = &advancing.status else {
			panic!("expected ongoing status");
		};
		assert_eq!(interaction_id.as_ref(), interaction.id.as_ref());

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn out_of_order_events_still_complete() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec: `b` first is ignored, then `a` re-sorts before it.
		h.tx.send(TrackerMsg::Event(evt("b", 100))).await?;
		h.tx.send(TrackerMsg::Event(evt("a", 10))).await?;
		let completed = h.updates.recv().await?;

		// -- Check
		let interaction = completed.status.completed().expect("should carry an interaction");
		assert!(!interaction.is_errored);
		assert_eq!(interaction.events, vec![evt("a", 10), evt("b", 100)]);

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn duplicate_completion_event_is_ignored() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		h.tx.send(TrackerMsg::Event(evt("b", 50))).await?;
		let _advancing = h.updates.recv().await?;
		let _completed = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("b", 50))).await?;

		// -- Check: the consumed accumulator does not re-advance.
		assert_no_update(&h.updates).await;

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn blacklist_mid_match_fails_interaction() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], vec![step("x")]))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		let _advancing = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("x", 50))).await?;
		let failed = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("b", 100))).await?;

		// -- Check
		let interaction = failed.status.completed().expect("should carry an interaction");
		assert!(interaction.is_errored);
		assert_eq!(interaction.events, vec![evt("a", 0)]);
		assert!(interaction.apdex_score.is_none());
		// The trailing `b` has nothing to attach to.
		assert_no_update(&h.updates).await;

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn blacklist_after_completion_is_ignored() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], vec![step("x")]))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		h.tx.send(TrackerMsg::Event(evt("b", 50))).await?;
		let _advancing = h.updates.recv().await?;
		let completed = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("x", 100))).await?;

		// -- Check
		let interaction = completed.status.completed().expect("should carry an interaction");
		assert!(!interaction.is_errored);
		assert_no_update(&h.updates).await;

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn timeout_fails_stuck_match() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		let _advancing = h.updates.recv().await?;
		// Paused time auto-advances to the timer deadline.
		let failed = h.updates.recv().await?;

		// -- Check
		let interaction = failed.status.completed().expect("should carry an interaction");
		assert!(interaction.is_errored);
		assert_eq!(interaction.events, vec![evt("a", 0)]);
		assert!(interaction.user_category.is_none());

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn unrelated_events_do_not_reset_timeout() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;
		let started = Instant::now();

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		let _advancing = h.updates.recv().await?;
		tokio::time::advance(Duration::from_secs(18)).await;
		h.tx.send(TrackerMsg::Event(evt("unrelated", 18_000))).await?;
		tokio::time::sleep(Duration::from_millis(1)).await;
		let failed = h.updates.recv().await?;

		// -- Check: the timer fired at ~20s, not 38s.
		assert!(failed.status.completed().is_some_and(|i| i.is_errored));
		assert!(started.elapsed() < Duration::from_secs(21));

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn sequential_matches_get_distinct_ids() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		h.tx.send(TrackerMsg::Event(evt("b", 50))).await?;
		let _ = h.updates.recv().await?;
		let first = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("a", 100))).await?;
		h.tx.send(TrackerMsg::Event(evt("b", 150))).await?;
		let _ = h.updates.recv().await?;
		let second = h.updates.recv().await?;

		// -- Check
		let first_id = first.status.completed().expect("first interaction").id.clone();
		let second_id = second.status.completed().expect("second interaction").id.clone();
		assert_ne!(first_id, second_id);

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn broken_match_reseeds_breaking_event() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec: a second `a` breaks the match and starts a fresh one.
		h.tx.send(TrackerMsg::Event(evt("a", 0))).await?;
		let advancing = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("a", 50))).await?;
		let failed = h.updates.recv().await?;
		let restarted = h.updates.recv().await?;

		// -- Check
		let interaction = failed.status.completed().expect("should carry an interaction");
		assert!(interaction.is_errored);
		assert_eq!(interaction.events, vec![evt("a", 0)]);
		assert!(restarted.status.is_advancing());

		let RunningStatus::Ongoing { interaction_id: old, .. } = &advancing.status else {
			panic!("expected ongoing status");
		};
		let RunningStatus::Ongoing { interaction_id: new, .. } = &restarted.status else {
			panic!("expected ongoing status");
		};
		assert_ne!(old, new);

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn marker_events_attach_to_next_interaction() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec
		h.tx.send(TrackerMsg::Marker(evt("network_lost", 5))).await?;
		h.tx.send(TrackerMsg::Event(evt("a", 10))).await?;
		h.tx.send(TrackerMsg::Event(evt("b", 50))).await?;
		let _ = h.updates.recv().await?;
		let first = h.updates.recv().await?;
		h.tx.send(TrackerMsg::Event(evt("a", 100))).await?;
		h.tx.send(TrackerMsg::Event(evt("b", 150))).await?;
		let _ = h.updates.recv().await?;
		let second = h.updates.recv().await?;

		// -- Check: markers are consumed by the first interaction only.
		let first = first.status.completed().expect("first interaction");
		let second = second.status.completed().expect("second interaction");
		assert_eq!(first.marker_events, vec![evt("network_lost", 5)]);
		assert!(second.marker_events.is_empty());

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn same_timestamp_preserves_arrival_order() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("a", 100))).await?;
		h.tx.send(TrackerMsg::Event(evt("b", 100))).await?;
		let _ = h.updates.recv().await?;
		let completed = h.updates.recv().await?;

		// -- Check
		let interaction = completed.status.completed().expect("should carry an interaction");
		assert_eq!(interaction.events, vec![evt("a", 100), evt("b", 100)]);
		assert_eq!(interaction.completion_time_nanos, Some(0));

		h.token.cancel();
		Ok(())
	}

	#[tokio::test(start_paused = true)]
	async fn irrelevant_events_produce_no_updates() -> Result<()> {
		// -- Setup & Fixtures
		let h = spawn_tracker(fx_config(vec![step("a"), step("b")], Vec::new()))?;

		// -- Exec
		h.tx.send(TrackerMsg::Event(evt("zzz", 0))).await?;

		// -- Check
		assert_no_update(&h.updates).await;

		h.token.cancel();
		Ok(())
	}

	#[test]
	fn invalid_config_is_rejected() {
		// -- Setup & Fixtures
		let (_tx, rx) = new_channel::<TrackerMsg>("tracker_test");
		let (updates_tx, _updates) = new_channel::<TrackerUpdate>("updates_test");
		let fx_config = fx_config(Vec::new(), Vec::new());

		// -- Exec
		let res = InteractionTracker::start(0, Arc::new(fx_config), rx, updates_tx);

		// -- Check
		assert!(res.is_err());
	}
}

// endregion: --- Tests
