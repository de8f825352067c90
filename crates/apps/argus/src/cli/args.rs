use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use humantime::Duration;

#[derive(Parser, Debug)]
#[command(name = "argus")]
pub struct Cli {
	#[arg(long, value_enum, default_value = "stdin")]
	pub mode: RunMode,

	#[arg(long, help = "Directory of interaction config TOML files")]
	pub interactions: PathBuf,

	#[arg(long, help = "Session file to replay. REQUIRED when using --mode replay")]
	pub session: Option<PathBuf>,

	#[arg(
		long,
		help = "Time duration (e.g., 20s, 5m, 1h) to keep the agent running after the feed ends"
	)]
	pub time: Option<Duration>,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
	Stdin,
	Replay,
}
