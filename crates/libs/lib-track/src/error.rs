use derive_more::{Display, From};
use tokio::task::JoinError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[from(String, &String, &str)]
	Custom(String),

	#[display("Config fetch failed: {_0}")]
	ConfigFetch(String),

	// -- Externals
	#[from]
	Event(lib_event::Error),
	#[display("Invalid interaction config: {_0}")]
	#[from]
	Match(lib_match::Error),
	#[from]
	Join(JoinError),
	#[from]
	StatusWatch(tokio::sync::watch::error::RecvError),
}

// region:    --- Custom

impl Error {
	pub fn custom_from_err(err: impl std::error::Error) -> Self {
		Self::Custom(err.to_string())
	}

	pub fn custom(val: impl Into<String>) -> Self {
		Self::Custom(val.into())
	}
}

// endregion: --- Custom

// region:    --- Error Boilerplate

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
