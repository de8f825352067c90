use derive_more::{Display, From};
use flume::{RecvError, SendError};
use tokio::task::JoinError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[from(String, &String, &str)]
	Custom(String),
	EventSend(String),
	EventRecv(RecvError),
	#[display("A session file is only used in 'replay' mode")]
	SessionWithoutReplay,
	#[display("No session file specified for 'replay' mode")]
	NoSessionSpecified,
	InvalidRate,
	#[display("Malformed event line: '{_0}'")]
	MalformedLine(String),

	// -- Externals
	#[from]
	Join(JoinError),
	#[from]
	Event(lib_event::Error),
	#[from]
	Match(lib_match::Error),
	#[from]
	Track(lib_track::Error),
	#[from]
	TomlDe(toml::de::Error),
	#[from]
	Io(std::io::Error),
}

impl<T> From<SendError<T>> for Error {
	fn from(value: SendError<T>) -> Self {
		Self::EventSend(value.to_string())
	}
}

impl From<RecvError> for Error {
	fn from(err: RecvError) -> Self {
		Self::EventRecv(err)
	}
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
