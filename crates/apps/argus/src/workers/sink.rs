use lib_event::trx::Rx;
use lib_match::{Interaction, RunningStatus};
use lib_track::StatusBoard;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::Result;

/// Terminal consumer: logs every finished interaction and narrates the
/// status board as matches advance. In the full SDK this seam is where
/// completed interactions become telemetry spans.
pub struct SinkWorker {
	completions: Rx<Interaction>,
	states: StatusBoard,
}

impl SinkWorker {
	pub fn start(completions: Rx<Interaction>, states: StatusBoard) -> Self {
		SinkWorker { completions, states }
	}

	pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
		loop {
			tokio::select! {
				_ = shutdown.cancelled() => break,

				interaction = self.completions.recv() => {
					match interaction {
						Ok(interaction) => print_interaction(&interaction),
						Err(_) => break,
					}
				}

				changed = self.states.changed() => {
					if changed.is_err() {
						break;
					}
					print_snapshot(&self.states);
				}
			}
		}
		Ok(())
	}
}

fn print_interaction(interaction: &Interaction) {
	if interaction.is_errored {
		warn!(
			"[{}] '{}' did not complete: {} event(s), {} marker(s) (id {})",
			interaction.config_id,
			interaction.name,
			interaction.events.len(),
			interaction.marker_events.len(),
			interaction.id,
		);
	} else {
		let elapsed_ms = interaction.completion_time_nanos.unwrap_or(0) / 1_000_000;
		warn!(
			"[{}] '{}' completed in {}ms, score {} ({}) (id {})",
			interaction.config_id,
			interaction.name,
			elapsed_ms,
			interaction.apdex_score.map_or("-".to_string(), |s| format!("{s:.2}")),
			interaction
				.user_category
				.map_or("-".to_string(), |c| c.to_string()),
			interaction.id,
		);
	}
}

fn print_snapshot(states: &StatusBoard) {
	for status in states.current().iter() {
		if let RunningStatus::Ongoing {
			index,
			interaction_id,
			config,
			completed: None,
		} = status
		{
			info!(
				"'{}' in flight: step {}/{} (id {})",
				config.name,
				index,
				config.sequence.len(),
				interaction_id,
			);
		}
	}
}
