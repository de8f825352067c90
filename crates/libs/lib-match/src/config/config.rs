use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use simple_fs::SPath;

use crate::config::SequenceEventSpec;
use crate::error::{Error, Result};
use crate::hash_utils;

/// One interaction to track: an ordered event sequence plus the latency
/// bands used to score a completed match.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InteractionConfig {
	pub id: i64,
	pub name: String,
	pub sequence: Vec<SequenceEventSpec>,
	#[serde(default)]
	pub blacklist: Vec<SequenceEventSpec>,
	pub lower_limit_ms: i64,
	pub mid_limit_ms: i64,
	pub upper_limit_ms: i64,
	pub timeout_ms: i64,
}

impl InteractionConfig {
	/// Construction-time invariants. A sequence that starts or ends with a
	/// blacklisted step can never be satisfied.
	pub fn validate(&self) -> Result<()> {
		if self.sequence.is_empty() {
			return Err(Error::EmptySequence(self.name.clone()));
		}
		let first_blacklisted = self.sequence.first().is_some_and(|s| s.blacklisted);
		let last_blacklisted = self.sequence.last().is_some_and(|s| s.blacklisted);
		if first_blacklisted || last_blacklisted {
			return Err(Error::BlacklistedBoundary(self.name.clone()));
		}
		if !self.sequence.iter().any(|s| !s.blacklisted) {
			return Err(Error::NoMatchableStep(self.name.clone()));
		}
		if self.lower_limit_ms > self.mid_limit_ms || self.mid_limit_ms > self.upper_limit_ms {
			return Err(Error::LimitsNotAscending(self.name.clone()));
		}
		Ok(())
	}

	/// Event names this configuration can ever react to, sequence steps and
	/// blacklist entries alike.
	pub fn relevant_names(&self) -> HashSet<String> {
		self.sequence
			.iter()
			.chain(self.blacklist.iter())
			.map(|s| s.name.clone())
			.collect()
	}
}

#[derive(Deserialize)]
struct ConfigRaw {
	interaction: InteractionConfig,
}

/// An [`InteractionConfig`] together with the blake3 hash of the content it
/// was parsed from, used as its identity in logs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
	pub inner: InteractionConfig,
	pub hash: [u8; 32],
}

impl LoadedConfig {
	pub fn from_str(s: &str) -> Result<Self> {
		let raw: ConfigRaw = toml::from_str(s)?;
		raw.interaction.validate()?;

		Ok(LoadedConfig {
			inner: raw.interaction,
			hash: hash_utils::blake3(s),
		})
	}

	pub fn from_file(config_path: impl AsRef<Path>) -> Result<Self> {
		let file_path = SPath::from_std_path(config_path)?;

		if !file_path.exists() {
			return Err(Error::ConfigPathNotFound(file_path.into()));
		}

		let content = std::fs::read_to_string(file_path)?;
		Self::from_str(&content)
	}

	pub fn hash_hex(&self) -> Arc<str> {
		hex::encode(self.hash).into()
	}
}

// region:    --- Tests


// endregion: --- Tests
