use std::path::Path;

use glob::glob;
use tracing::warn;

use crate::config::LoadedConfig;
use crate::error::Result;

/// All interaction configs found under a directory. One malformed file does
/// not fail the load; the file is skipped with a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSet {
	pub configs: Vec<LoadedConfig>,
}

impl ConfigSet {
	pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<ConfigSet> {
		let mut configs = Vec::new();

		let pattern = format!("{}/**/*.toml", dir.as_ref().display());

		for entry in glob(&pattern)? {
			match entry {
				Ok(path) => match LoadedConfig::from_file(&path) {
					Ok(config) => configs.push(config),
					Err(e) => warn!("Skipping interaction config '{}': {e}", path.display()),
				},
				Err(e) => warn!("Glob pattern error: {:?}", e),
			}
		}

		Ok(ConfigSet { configs })
	}

	pub fn config_count(&self) -> usize {
		self.configs.len()
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

	use super::*;

	#[test]
	fn load_config_set_from_dir() -> Result<()> {
		// -- Setup & Fixtures
		let fx_config_dir = "configs/";
		let fx_config_count = 2; // broken.toml is skipped

		// -- Exec
		let set = ConfigSet::load_from_dir(fx_config_dir)?;

		// -- Check
		assert_eq!(fx_config_count, set.config_count());
		assert!(set.configs.iter().any(|c| c.inner.name == "checkout"));

		Ok(())
	}
}

// endregion: --- Tests
