use flume::{Receiver, Sender};

use crate::error::Result;

/// Sending half of a labeled unbounded channel. The label names the wire in
/// logs and errors; it carries no runtime behavior.
pub struct Tx<T> {
	label: &'static str,
	tx: Sender<T>,
}

impl<T> Tx<T> {
	pub async fn send(&self, item: T) -> Result<()> {
		self.tx.send_async(item).await?;
		Ok(())
	}

	/// Non-blocking send. The channel is unbounded, so this only fails when
	/// every receiver has been dropped.
	pub fn send_sync(&self, item: T) -> Result<()> {
		self.tx.send(item)?;
		Ok(())
	}

	pub fn label(&self) -> &'static str {
		self.label
	}
}

impl<T> Clone for Tx<T> {
	fn clone(&self) -> Self {
		Tx {
			label: self.label,
			tx: self.tx.clone(),
		}
	}
}

pub struct Rx<T> {
	label: &'static str,
	rx: Receiver<T>,
}

impl<T> Rx<T> {
	pub async fn recv(&self) -> Result<T> {
		let res = self.rx.recv_async().await?;
		Ok(res)
	}

	pub fn label(&self) -> &'static str {
		self.label
	}
}

impl<T> Clone for Rx<T> {
	fn clone(&self) -> Self {
		Rx {
			label: self.label,
			rx: self.rx.clone(),
		}
	}
}

pub fn new_channel<T>(label: &'static str) -> (Tx<T>, Rx<T>) {
	let (tx, rx) = flume::unbounded::<T>();

	(Tx { label, tx }, Rx { label, rx })
}

// region:    --- Tests


// endregion: --- Tests
