//! The walk from the login form to the rendered schedule.

use std::fmt;

use fantoccini::Client;
use select::document::Document;
use sit2ics_core::{scrape_schedule, PageModel, Schedule};

use crate::{
	error::Result,
	wait::{self, locator, Condition, WaitTier},
};

#[derive(Clone)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"***")
			.finish()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Start,
	Authenticated,
	Landing,
	ScheduleFrame,
	ListView,
	/// The schedule frame's source has been read.
	Captured,
	Done,
}

impl Stage {
	#[must_use]
	pub fn next(self) -> Option<Self> {
		Some(match self {
			Self::Start => Self::Authenticated,
			Self::Authenticated => Self::Landing,
			Self::Landing => Self::ScheduleFrame,
			Self::ScheduleFrame => Self::ListView,
			Self::ListView => Self::Captured,
			Self::Captured => Self::Done,
			Self::Done => return None,
		})
	}

	/// Tier of the wait that gates leaving this stage, if there is one.
	#[must_use]
	pub fn tier(self) -> Option<WaitTier> {
		match self {
			Self::Start | Self::Authenticated | Self::ScheduleFrame => Some(WaitTier::Quick),
			Self::Landing | Self::ListView => Some(WaitTier::Long),
			Self::Captured | Self::Done => None,
		}
	}
}

/// What the browser leaves behind for scraping.
#[derive(Debug, Clone, Default)]
pub struct Capture {
	pub term: Option<String>,
	pub html: String,
}

/// Scrapes the captured schedule frame.
///
/// # Errors
///
/// Fails if a row holds timestamps in an unexpected format.
pub fn scrape_capture<P: PageModel>(page: &P, capture: &Capture) -> Result<Schedule> {
	let schedule = scrape_schedule(page, &Document::from(capture.html.as_str()))?;

	log::info!(
		"finished scraping: {} meetings, {} rows skipped",
		schedule.meetings.len(),
		schedule.skipped.len()
	);

	Ok(schedule)
}

pub struct Session<'a, P> {
	client: &'a Client,
	page: &'a P,
	stage: Stage,
	capture: Capture,
	schedule: Schedule,
}

impl<'a, P: PageModel> Session<'a, P> {
	#[must_use]
	pub fn new(client: &'a Client, page: &'a P) -> Self {
		Self {
			client,
			page,
			stage: Stage::Start,
			capture: Capture::default(),
			schedule: Schedule::default(),
		}
	}

	#[must_use]
	pub fn stage(&self) -> Stage {
		self.stage
	}

	/// Runs every stage, returning the schedule and the term's label.
	///
	/// # Errors
	///
	/// Fails on the first wait that times out, WebDriver command that fails, or
	/// timestamp in an unexpected format.
	pub async fn run(mut self, credentials: &Credentials) -> Result<(Schedule, Option<String>)> {
		while self.stage != Stage::Done {
			self.advance(credentials).await?;
		}

		Ok((self.schedule, self.capture.term))
	}

	/// Performs the transition out of the current stage.
	///
	/// # Errors
	///
	/// Fails on the first wait that times out or WebDriver command that fails.
	pub async fn advance(&mut self, credentials: &Credentials) -> Result<Stage> {
		let Some(next) = self.stage.next() else {
			return Ok(self.stage);
		};
		let tier = self.stage.tier().unwrap_or(WaitTier::Quick);
		let entry = self.page.schedule_entry();

		match self.stage {
			Stage::Start => {
				let fields = self.page.login_fields();

				self.client.goto(self.page.entry_url()).await?;

				let username =
					wait::element(self.client, fields.username, Condition::Present, tier).await?;
				let password = self.client.find(locator(fields.password)).await?;
				let submit = self.client.find(locator(fields.submit)).await?;

				username.click().await?;
				username.send_keys(&credentials.username).await?;
				password.click().await?;
				password.send_keys(&credentials.password).await?;
				submit.click().await?;
			}
			Stage::Authenticated => {
				wait::element(self.client, self.page.landing_marker(), Condition::Visible, tier)
					.await?;
			}
			Stage::Landing => {
				self.client
					.find(locator(entry.course_management))
					.await?
					.click()
					.await?;

				wait::element(self.client, entry.weekly_schedule, Condition::Clickable, tier)
					.await?
					.click()
					.await?;

				wait::element(self.client, entry.frame, Condition::Present, WaitTier::Quick)
					.await?
					.enter_frame()
					.await?;
			}
			Stage::ScheduleFrame => {
				self.client.find(locator(entry.list_view)).await?.click().await?;

				wait::element(self.client, entry.module_list, Condition::Visible, tier).await?;
			}
			Stage::ListView => {
				let term = wait::element(self.client, entry.term_label, Condition::Visible, tier)
					.await?
					.text()
					.await?;

				log::info!("term: {term}");

				self.capture = Capture {
					term: Some(term).filter(|t| !t.is_empty()),
					html: self.client.source().await?,
				};
			}
			Stage::Captured => {
				self.schedule = scrape_capture(self.page, &self.capture)?;
			}
			Stage::Done => {}
		}

		log::debug!("{:?} -> {next:?}", self.stage);
		self.stage = next;

		Ok(next)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_stages_are_linear() {
		let mut stage = Stage::Start;
		let mut seen = vec![stage];

		while let Some(next) = stage.next() {
			stage = next;
			seen.push(stage);
		}

		assert_eq!(
			seen,
			[
				Stage::Start,
				Stage::Authenticated,
				Stage::Landing,
				Stage::ScheduleFrame,
				Stage::ListView,
				Stage::Captured,
				Stage::Done,
			]
		);
	}

	#[test]
	fn test_browser_stages_wait() {
		for stage in [
			Stage::Start,
			Stage::Authenticated,
			Stage::Landing,
			Stage::ScheduleFrame,
			Stage::ListView,
		] {
			assert!(stage.tier().is_some(), "{stage:?}");
		}

		assert_eq!(Stage::Landing.tier(), Some(WaitTier::Long));
		assert_eq!(Stage::Captured.tier(), None);
	}

	#[test]
	fn test_scrape_capture_without_modules() {
		let capture = Capture {
			term: Some("2024/25 Trimester 2".into()),
			html: "<html><body><form></form></body></html>".into(),
		};

		let schedule = scrape_capture(&sit2ics_core::In4Sit, &capture).unwrap();

		assert!(schedule.meetings.is_empty());
		assert!(schedule.skipped.is_empty());
	}

	#[test]
	fn test_credentials_hide_password() {
		let credentials = Credentials {
			username: "2301234@sit.singaporetech.edu.sg".into(),
			password: "hunter2".into(),
		};

		let debug = format!("{credentials:?}");
		assert!(debug.contains("2301234"));
		assert!(!debug.contains("hunter2"));
	}
}
