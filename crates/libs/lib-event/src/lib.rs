mod error;
pub mod trx;

pub use error::{Error, Result};
