use lib_common::event::LocalEvent;
use serde::Deserialize;

use crate::config::PropMatcher;

/// One step of a configured event sequence, or one entry of a blacklist.
///
/// A `blacklisted` step inside a sequence is a placeholder: it never
/// consumes a sequence slot, and an event matching it invalidates the match.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SequenceEventSpec {
	pub name: String,
	#[serde(default)]
	pub matchers: Vec<PropMatcher>,
	#[serde(default)]
	pub blacklisted: bool,
}

impl SequenceEventSpec {
	pub fn matches(&self, event: &LocalEvent) -> bool {
		if event.name.as_ref() != self.name {
			return false;
		}
		self.matchers.iter().all(|m| m.matches(event.props.as_ref()))
	}
}

// region:    --- Tests


// endregion: --- Tests
