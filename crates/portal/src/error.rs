use std::time::Duration;

use fantoccini::error::{CmdError, NewSessionError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("could not start a WebDriver session: {0}")]
	Session(#[from] NewSessionError),

	#[error("WebDriver command failed: {0}")]
	Command(#[from] CmdError),

	/// An element the next step depends on never showed up.
	#[error("{what} not ready after {after:?}")]
	Timeout { what: String, after: Duration },

	#[error(transparent)]
	Schedule(#[from] sit2ics_core::Error),
}
