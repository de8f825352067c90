// region:    --- Modules
mod cli;
mod error;
mod supervisor;
mod workers;
// endregion: --- Modules

pub use self::error::{Error, Result};

use clap::Parser;
use lib_track::{InteractionCoordinator, TomlDirSource};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, RunMode};
use crate::supervisor::Supervisor;
use crate::workers::{ReplayWorker, SinkWorker, StdinWorker};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Cli::parse();
	tracing_subscriber::fmt()
		.with_target(false)
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	if args.session.is_some() && args.mode != RunMode::Replay {
		return Err(Error::SessionWithoutReplay);
	}

	let source = TomlDirSource::new(&args.interactions);
	let coordinator = InteractionCoordinator::start(&source).await?;

	let mut supervisor = Supervisor::new();

	let sink = SinkWorker::start(coordinator.completions(), coordinator.states());
	supervisor.spawn("sink", sink.run(supervisor.token()));

	// When a run time is given, the feed ending does not stop the agent;
	// pending timeouts still get to fire.
	let hold_open = args.time.is_some();

	match args.mode {
		RunMode::Replay => {
			let session = args.session.ok_or(Error::NoSessionSpecified)?;
			let replay = ReplayWorker::start(session, coordinator.dispatcher(), hold_open)?;
			supervisor.spawn("replay", replay.run(supervisor.token()));
		}

		RunMode::Stdin => {
			let stdin = StdinWorker::start(coordinator.dispatcher())?;
			supervisor.spawn("stdin", stdin.run(supervisor.token()));
		}
	}

	if let Some(time) = args.time {
		let token = supervisor.token();
		tokio::spawn(async move {
			tokio::time::sleep(time.into()).await;
			token.cancel();
		});
	}

	let token = supervisor.token();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			token.cancel();
		}
	});

	supervisor.token().cancelled().await;

	supervisor.shutdown().await?;
	coordinator.shutdown().await?;

	Ok(())
}
