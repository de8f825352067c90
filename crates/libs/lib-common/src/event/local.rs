use std::collections::HashMap;
use std::sync::Arc;

/// A single application event as observed by the instrumentation layer.
/// Immutable once constructed; shared by cheap clone.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalEvent {
	pub name: Arc<str>,
	pub time_nanos: i64,
	pub props: Option<HashMap<String, String>>,
}

impl LocalEvent {
	pub fn new(name: impl Into<Arc<str>>, time_nanos: i64) -> Self {
		LocalEvent {
			name: name.into(),
			time_nanos,
			props: None,
		}
	}

	pub fn with_props(name: impl Into<Arc<str>>, time_nanos: i64, props: HashMap<String, String>) -> Self {
		LocalEvent {
			name: name.into(),
			time_nanos,
			props: Some(props),
		}
	}

	pub fn prop(&self, key: &str) -> Option<&str> {
		self.props.as_ref().and_then(|p| p.get(key)).map(String::as_str)
	}
}

// region:    --- Tests


// endregion: --- Tests
