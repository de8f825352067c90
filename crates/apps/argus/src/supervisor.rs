use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;

/// Owns the feed and sink workers: one shutdown token, one join set.
pub struct Supervisor {
	shutdown: CancellationToken,
	tasks: JoinSet<Result<()>>,
}

impl Supervisor {
	pub fn new() -> Self {
		Self {
			shutdown: CancellationToken::new(),
			tasks: JoinSet::new(),
		}
	}

	pub fn token(&self) -> CancellationToken {
		self.shutdown.clone()
	}

	pub fn spawn<F>(&mut self, name: &'static str, fut: F)
	where
		F: Future<Output = Result<()>> + Send + 'static,
	{
		self.tasks.spawn(async move {
			let res = fut.await;
			debug!("Worker '{name}' finished");
			res
		});
	}

	pub async fn shutdown(mut self) -> Result<()> {
		info!("Supervisor shutdown starting");
		self.shutdown.cancel();

		while let Some(res) = self.tasks.join_next().await {
			res??;
		}
		info!("Supervisor shutdown complete");

		Ok(())
	}
}
