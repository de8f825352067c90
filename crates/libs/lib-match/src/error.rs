use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[from(String, &String, &str)]
	#[display("{_0}")]
	Custom(String),

	// -- Config validation
	#[display("Interaction '{_0}' has an empty event sequence")]
	EmptySequence(String),
	#[display("Interaction '{_0}' starts or ends with a blacklisted step")]
	BlacklistedBoundary(String),
	#[display("Interaction '{_0}' has no matchable step")]
	NoMatchableStep(String),
	#[display("Interaction '{_0}' latency limits are not ascending")]
	LimitsNotAscending(String),

	// -- Config loading
	#[display("No interaction config file found at '{_0}'")]
	ConfigPathNotFound(String),
	#[display("No interaction configs found in '{_0}'")]
	NoConfigsInDir(String),

	// -- Externals
	#[from]
	#[display("{_0}")]
	Glob(glob::GlobError),
	#[from]
	#[display("{_0}")]
	GlobPattern(glob::PatternError),
	#[from]
	#[display("{_0}")]
	TomlDe(toml::de::Error),
	#[from]
	#[display("{_0}")]
	SimpleFs(simple_fs::Error),
	#[from]
	#[display("{_0}")]
	Io(std::io::Error),
}

// region:    --- Error Boilerplate

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
