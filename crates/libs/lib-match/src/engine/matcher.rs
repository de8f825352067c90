use std::sync::Arc;

use lib_common::event::LocalEvent;

use crate::config::InteractionConfig;
use crate::engine::score;
use crate::engine::Interaction;

/// Result of one walk over the accumulated events of a single configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum WalkOutcome {
	/// Nothing changed; the caller keeps its previous status.
	Idle,
	/// The sequence advanced but is not complete. `matched` holds the events
	/// consumed by sequence steps so far.
	Advancing { index: usize, matched: Vec<LocalEvent> },
	/// Every step matched; a successful interaction was built.
	Completed(Interaction),
	/// An unexpected event interrupted an active match. `resume` is that
	/// event; it was not consumed and seeds a fresh walk.
	Broken { interaction: Interaction, resume: LocalEvent },
	/// A globally blacklisted event killed an active match.
	Invalidated(Interaction),
	/// A blacklisted sequence step matched; the walk is abandoned without
	/// producing an interaction.
	Reset,
}

/// Pure walk over a configuration's accumulated events, sorted by timestamp.
/// Re-run in full whenever a relevant event arrives; the caller owns the
/// accumulated list and clears it on any terminal outcome.
pub struct SequenceMatcher;

impl SequenceMatcher {
	pub fn walk(
		config: &InteractionConfig,
		events: &[LocalEvent],
		markers: &[LocalEvent],
		interaction_id: &Arc<str>,
	) -> WalkOutcome {
		let mut index = 0;
		let mut in_progress = false;
		let mut matched: Vec<LocalEvent> = Vec::new();

		let mut cursor = 0;
		while cursor < events.len() {
			let event = &events[cursor];

			if in_progress && config.blacklist.iter().any(|entry| entry.matches(event)) {
				let interaction = Self::failed(config, matched, markers, interaction_id);
				return WalkOutcome::Invalidated(interaction);
			}

			let Some(step) = config.sequence.get(index) else {
				break;
			};

			if step.matches(event) {
				if step.blacklisted {
					return WalkOutcome::Reset;
				}
				matched.push(event.clone());
				index += 1;
				in_progress = true;
				if index == config.sequence.len() {
					let interaction = Self::completed(config, matched, markers, interaction_id);
					return WalkOutcome::Completed(interaction);
				}
				cursor += 1;
				continue;
			}

			if step.blacklisted {
				// Placeholder step: skip it and test the same event against
				// the next step.
				index += 1;
				continue;
			}

			if in_progress {
				let interaction = Self::failed(config, matched, markers, interaction_id);
				return WalkOutcome::Broken {
					interaction,
					resume: event.clone(),
				};
			}

			cursor += 1;
		}

		if in_progress {
			WalkOutcome::Advancing { index, matched }
		} else {
			WalkOutcome::Idle
		}
	}

	fn completed(
		config: &InteractionConfig,
		matched: Vec<LocalEvent>,
		markers: &[LocalEvent],
		interaction_id: &Arc<str>,
	) -> Interaction {
		let first = matched.first().map_or(0, |e| e.time_nanos);
		let last = matched.last().map_or(0, |e| e.time_nanos);
		let elapsed_nanos = last - first;
		let (apdex_score, user_category) = score::apdex(config, elapsed_nanos / 1_000_000);

		Interaction {
			id: interaction_id.clone(),
			name: Arc::from(config.name.as_str()),
			config_id: config.id,
			first_event_time_nanos: first,
			last_event_time_nanos: last,
			events: matched,
			marker_events: markers.to_vec(),
			apdex_score: Some(apdex_score),
			user_category: Some(user_category),
			completion_time_nanos: Some(elapsed_nanos),
			is_errored: false,
		}
	}

	/// An interaction that ended without completing: interrupted,
	/// invalidated, or timed out. Score and category stay unset.
	pub fn failed(
		config: &InteractionConfig,
		matched: Vec<LocalEvent>,
		markers: &[LocalEvent],
		interaction_id: &Arc<str>,
	) -> Interaction {
		let first = matched.first().map_or(0, |e| e.time_nanos);
		let last = matched.last().map_or(0, |e| e.time_nanos);

		Interaction {
			id: interaction_id.clone(),
			name: Arc::from(config.name.as_str()),
			config_id: config.id,
			first_event_time_nanos: first,
			last_event_time_nanos: last,
			events: matched,
			marker_events: markers.to_vec(),
			apdex_score: None,
			user_category: None,
			completion_time_nanos: None,
			is_errored: true,
		}
	}
}

// region:    --- Tests


// endregion: --- Tests
