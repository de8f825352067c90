use std::sync::Arc;

use derive_more::Display;
use lib_common::event::LocalEvent;

use crate::config::InteractionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{self:?}")]
pub enum UserCategory {
	Excellent,
	Good,
	Average,
	Poor,
}

/// A finished walk through a configured sequence, successful or not.
/// Constructed exactly once per match and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
	pub id: Arc<str>,
	pub name: Arc<str>,
	pub config_id: i64,
	pub first_event_time_nanos: i64,
	pub last_event_time_nanos: i64,
	pub events: Vec<LocalEvent>,
	pub marker_events: Vec<LocalEvent>,
	pub apdex_score: Option<f64>,
	pub user_category: Option<UserCategory>,
	pub completion_time_nanos: Option<i64>,
	pub is_errored: bool,
}

/// What one tracker is currently doing. `completed: Some(_)` is the terminal
/// state of a walk; a later matching event starts a fresh `Ongoing` with a
/// new interaction id.
#[derive(Debug, Clone, PartialEq)]
pub enum RunningStatus {
	NoMatch,
	Ongoing {
		index: usize,
		interaction_id: Arc<str>,
		config: Arc<InteractionConfig>,
		completed: Option<Interaction>,
	},
}

impl RunningStatus {
	pub fn completed(&self) -> Option<&Interaction> {
		match self {
			RunningStatus::Ongoing {
				completed: Some(interaction),
				..
			} => Some(interaction),
			_ => None,
		}
	}

	pub fn is_advancing(&self) -> bool {
		matches!(self, RunningStatus::Ongoing { completed: None, .. })
	}
}
