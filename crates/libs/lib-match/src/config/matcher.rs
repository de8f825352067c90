use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOp {
	Equals,
	NotEquals,
	Contains,
	NotContains,
	StartsWith,
	EndsWith,
}

/// One property constraint on an event. All constraints declared on a step
/// must hold for the step to match.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PropMatcher {
	pub field: String,
	pub op: MatchOp,
	pub value: String,
}

impl PropMatcher {
	/// A property absent from the event never matches, whichever the
	/// operator, negated ones included.
	pub fn matches(&self, props: Option<&HashMap<String, String>>) -> bool {
		let Some(actual) = props.and_then(|p| p.get(&self.field)) else {
			return false;
		};

		match self.op {
			MatchOp::Equals => actual == &self.value,
			MatchOp::NotEquals => actual != &self.value,
			MatchOp::Contains => actual.contains(&self.value),
			MatchOp::NotContains => !actual.contains(&self.value),
			MatchOp::StartsWith => actual.starts_with(&self.value),
			MatchOp::EndsWith => actual.ends_with(&self.value),
		}
	}
}

// region:    --- Tests

#[cfg(test)]
mod tests {
	use super::*;

	fn props(fields: &[(&str, &str)]) -> HashMap<String, String> {
		fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
	}

	fn matcher(field: &str, op: MatchOp, value: &str) -> PropMatcher {
		PropMatcher {
			field: field.to_string(),
			op,
			value: value.to_string(),
		}
	}

	#[test]
	fn eval_equals_and_not_equals() {
		// -- Setup & Fixtures
		let fx_props = props(&[("screen", "cart")]);

		// -- Check
		assert!(matcher("screen", MatchOp::Equals, "cart").matches(Some(&fx_props)));
		assert!(!matcher("screen", MatchOp::Equals, "home").matches(Some(&fx_props)));
		assert!(matcher("screen", MatchOp::NotEquals, "home").matches(Some(&fx_props)));
		assert!(!matcher("screen", MatchOp::NotEquals, "cart").matches(Some(&fx_props)));
	}

	#[test]
	fn eval_substring_ops() {
		// -- Setup & Fixtures
		let fx_props = props(&[("path", "/checkout/payment")]);

		// -- Check
		assert!(matcher("path", MatchOp::Contains, "checkout").matches(Some(&fx_props)));
		assert!(matcher("path", MatchOp::NotContains, "settings").matches(Some(&fx_props)));
		assert!(matcher("path", MatchOp::StartsWith, "/checkout").matches(Some(&fx_props)));
		assert!(matcher("path", MatchOp::EndsWith, "payment").matches(Some(&fx_props)));
		assert!(!matcher("path", MatchOp::StartsWith, "payment").matches(Some(&fx_props)));
	}

	#[test]
	fn eval_missing_property_never_matches() {
		// -- Setup & Fixtures
		let fx_props = props(&[("screen", "cart")]);

		// -- Check
		assert!(!matcher("missing", MatchOp::Equals, "cart").matches(Some(&fx_props)));
		assert!(!matcher("missing", MatchOp::NotEquals, "cart").matches(Some(&fx_props)));
		assert!(!matcher("missing", MatchOp::NotContains, "cart").matches(Some(&fx_props)));
		assert!(!matcher("screen", MatchOp::Equals, "cart").matches(None));
	}
}

// endregion: --- Tests
