use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	/// A date or time cell no longer matches the portal's format.
	#[error("invalid {kind} {value:?}: {source}")]
	Timestamp {
		kind: &'static str,
		value: String,
		source: chrono::ParseError,
	},

	#[error("expected a \"DD/MM/YYYY - DD/MM/YYYY\" date range, got {0:?}")]
	DateRange(String),
}

impl Error {
	pub(crate) fn timestamp(kind: &'static str, value: &str, source: chrono::ParseError) -> Self {
		Self::Timestamp {
			kind,
			value: value.to_owned(),
			source,
		}
	}
}
