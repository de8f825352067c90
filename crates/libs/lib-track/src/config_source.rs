use std::path::PathBuf;

use lib_match::{ConfigSet, InteractionConfig};
use tracing::debug;

use crate::error::Result;

/// Where interaction configurations come from. Fetched exactly once at
/// coordinator start; there is no retry and no hot reload.
#[allow(async_fn_in_trait)]
pub trait ConfigSource {
	async fn fetch(&self) -> Result<Vec<InteractionConfig>>;
}

/// A directory of TOML interaction files, the local stand-in for a remote
/// config endpoint.
pub struct TomlDirSource {
	dir: PathBuf,
}

impl TomlDirSource {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		TomlDirSource { dir: dir.into() }
	}
}

impl ConfigSource for TomlDirSource {
	async fn fetch(&self) -> Result<Vec<InteractionConfig>> {
		let set = ConfigSet::load_from_dir(&self.dir)?;
		for config in &set.configs {
			debug!("Loaded interaction '{}' ({})", config.inner.name, config.hash_hex());
		}
		Ok(set.configs.into_iter().map(|c| c.inner).collect())
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	#[tokio::test]
	async fn toml_dir_source_fetches_inner_configs() -> Result<()> {
		// -- Setup & Fixtures
		let fx_source = TomlDirSource::new("../lib-match/configs");

		// -- Exec
		let configs = fx_source.fetch().await?;

		// -- Check
		assert_eq!(configs.len(), 2);
		assert!(configs.iter().all(|c| !c.sequence.is_empty()));

		Ok(())
	}
}

// endregion: --- Tests
