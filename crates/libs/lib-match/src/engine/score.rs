use crate::config::InteractionConfig;
use crate::engine::UserCategory;

/// APDEX-style latency score for a completed match. Bands are inclusive on
/// their upper bound.
pub fn apdex(config: &InteractionConfig, elapsed_ms: i64) -> (f64, UserCategory) {
	if elapsed_ms <= config.lower_limit_ms {
		return (1.0, UserCategory::Excellent);
	}
	if elapsed_ms > config.upper_limit_ms {
		return (0.0, UserCategory::Poor);
	}

	let category = if elapsed_ms <= config.mid_limit_ms {
		UserCategory::Good
	} else {
		UserCategory::Average
	};

	let span = config.upper_limit_ms - config.lower_limit_ms;
	if span == 0 {
		return (0.0, category);
	}

	let score = 1.0 - (elapsed_ms - config.lower_limit_ms) as f64 / span as f64;
	(score, category)
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::InteractionConfig;

	fn fx_config(lower: i64, mid: i64, upper: i64) -> InteractionConfig {
		InteractionConfig {
			id: 1,
			name: "test".to_string(),
			sequence: Vec::new(),
			blacklist: Vec::new(),
			lower_limit_ms: lower,
			mid_limit_ms: mid,
			upper_limit_ms: upper,
			timeout_ms: 1000,
		}
	}

	#[test]
	fn score_band_boundaries() {
		// -- Setup & Fixtures
		let config = fx_config(100, 500, 1000);

		// -- Check
		assert_eq!(apdex(&config, 50), (1.0, UserCategory::Excellent));
		assert_eq!(apdex(&config, 100), (1.0, UserCategory::Excellent));
		assert_eq!(apdex(&config, 1500), (0.0, UserCategory::Poor));

		let (score, category) = apdex(&config, 500);
		assert_eq!(category, UserCategory::Good);
		assert!((score - (1.0 - 400.0 / 900.0)).abs() < f64::EPSILON);

		let (score, category) = apdex(&config, 501);
		assert_eq!(category, UserCategory::Average);
		assert!((score - (1.0 - 401.0 / 900.0)).abs() < f64::EPSILON);

		let (score, _) = apdex(&config, 1000);
		assert!(score.abs() < f64::EPSILON);
	}

	#[test]
	fn score_degenerate_limits() {
		// -- Setup & Fixtures
		let config = fx_config(100, 100, 100);

		// -- Check
		assert_eq!(apdex(&config, 100), (1.0, UserCategory::Excellent));
		assert_eq!(apdex(&config, 101), (0.0, UserCategory::Poor));
	}
}

// endregion: --- Tests
