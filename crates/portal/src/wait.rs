//! Bounded polling for elements of the live page.

use std::{future::Future, time::Duration};

use fantoccini::{elements::Element, error::CmdError, Client, Locator};
use sit2ics_core::page::Target;
use tokio::time::{sleep, Instant};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
	pub timeout: Duration,
	pub poll: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTier {
	/// Elements of an already loaded page.
	Quick,
	/// Elements behind a navigation.
	Long,
}

impl WaitTier {
	#[must_use]
	pub fn policy(self) -> Policy {
		match self {
			Self::Quick => Policy {
				timeout: Duration::from_secs(30),
				poll: Duration::from_secs(1),
			},
			Self::Long => Policy {
				timeout: Duration::from_secs(60),
				poll: Duration::from_secs(2),
			},
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
	Present,
	Visible,
	Clickable,
}

#[must_use]
pub fn locator(target: Target) -> Locator<'static> {
	match target {
		Target::Id(id) => Locator::Id(id),
		Target::Css(css) => Locator::Css(css),
		Target::XPath(xpath) => Locator::XPath(xpath),
	}
}

/// Polls `probe` every `policy.poll` until it yields a value or `policy.timeout` passes.
///
/// `Client::wait` only knows presence; visibility and clickability need their own probe.
///
/// # Errors
///
/// Fails with [`Error::Timeout`] when time runs out, or with the first error `probe` returns.
pub async fn until<T, F, Fut>(policy: Policy, what: &str, mut probe: F) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<Option<T>>>,
{
	let deadline = Instant::now() + policy.timeout;

	loop {
		if let Some(value) = probe().await? {
			return Ok(value);
		}

		if Instant::now() >= deadline {
			return Err(Error::Timeout {
				what: what.to_owned(),
				after: policy.timeout,
			});
		}

		sleep(policy.poll).await;
	}
}

/// Missing and stale elements mean "not yet"; any other command error is fatal.
fn settle<T>(result: std::result::Result<T, CmdError>) -> Result<Option<T>> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(e) if e.is_no_such_element() || e.is_stale_element_reference() => Ok(None),
		Err(e) => Err(e.into()),
	}
}

async fn probe(client: &Client, target: Target, condition: Condition) -> Result<Option<Element>> {
	let Some(element) = settle(client.find(locator(target)).await)? else {
		return Ok(None);
	};

	let ready = match condition {
		Condition::Present => Some(true),
		Condition::Visible => settle(element.is_displayed().await)?,
		Condition::Clickable => match settle(element.is_displayed().await)? {
			Some(true) => settle(element.is_enabled().await)?,
			other => other,
		},
	};

	Ok((ready == Some(true)).then_some(element))
}

/// Waits for `target` to meet `condition`.
///
/// # Errors
///
/// Fails on timeout or a WebDriver error other than a missing or stale element.
pub async fn element(
	client: &Client,
	target: Target,
	condition: Condition,
	tier: WaitTier,
) -> Result<Element> {
	let what = format!("{target:?} ({condition:?})");

	until(tier.policy(), &what, || probe(client, target, condition)).await
}
