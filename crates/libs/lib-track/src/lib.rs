mod config_source;
mod coordinator;
mod dispatcher;
mod error;
mod tracker;

pub use config_source::{ConfigSource, TomlDirSource};
pub use coordinator::{InteractionCoordinator, StatusBoard};
pub use dispatcher::{DispatchWorker, EventDispatcher};
pub use error::{Error, Result};
pub use tracker::{InteractionTracker, TrackerMsg, TrackerUpdate};
