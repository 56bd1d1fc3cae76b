#![warn(clippy::pedantic)]

use std::{
	fs,
	io::Read,
	path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use icalendar::{Calendar, CalendarDateTime, Component, Event, EventLike};
use select::document::Document;

pub mod error;
pub mod meeting;
pub mod page;

pub use error::{Error, Result};
pub use meeting::{ClassMeeting, SkipReason};
pub use page::{In4Sit, PageModel};

pub const TZ: chrono_tz::Tz = chrono_tz::Asia::Singapore;

pub const INSTITUTION: &str = "Singapore Institute of Technology";

/// A meeting row that produced no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
	pub module_title: String,
	/// 0-based, header excluded.
	pub row: usize,
	pub reason: SkipReason,
}

/// Everything scraped from one schedule page, in page order.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
	pub meetings: Vec<ClassMeeting>,
	pub skipped: Vec<SkippedRow>,
}

/// Reads every meeting row of a rendered schedule page.
///
/// # Errors
///
/// Fails if a row has a time range but its dates or times cannot be parsed.
pub fn scrape_schedule<P: PageModel>(page: &P, document: &Document) -> Result<Schedule> {
	let mut schedule = Schedule::default();

	for block in page.module_blocks(document) {
		let title = page.module_title(block);
		let rows = page.meeting_rows(block);
		let mut class = meeting::ClassBlock::default();

		log::info!("{title}: {} rows", rows.len());

		for (index, row) in rows.into_iter().enumerate() {
			let cells = page.row_cells(row);

			match meeting::parse_row(&title, &mut class, meeting::RowCells(&cells))? {
				Ok(meeting) => schedule.meetings.push(meeting),
				Err(reason) => {
					log::warn!("skipping row {index} of {title}: {reason}");
					schedule.skipped.push(SkippedRow {
						module_title: title.clone(),
						row: index,
						reason,
					});
				}
			}
		}
	}

	Ok(schedule)
}

/// Parses a saved copy of the schedule frame.
///
/// # Errors
///
/// Fails on read errors or unparseable timestamps.
pub fn parse_from_buf<R: Read>(buf: R) -> Result<Schedule> {
	let document = Document::from_read(buf)?;

	scrape_schedule(&In4Sit, &document)
}

/// Parses a saved schedule frame from `path`, or stdin if there is none.
///
/// # Errors
///
/// Fails on read errors or unparseable timestamps.
pub fn parse_from_file<P: AsRef<Path>>(path: Option<P>) -> Result<Schedule> {
	if let Some(path) = path {
		parse_from_buf(fs::File::open(path)?)
	} else {
		parse_from_buf(std::io::stdin().lock())
	}
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
	/// Advertised as the calendar's timezone; event times stay floating.
	pub timezone: chrono_tz::Tz,
	/// Calendar display name.
	pub name: String,
	/// DTSTAMP of every event.
	pub stamp: DateTime<Utc>,
}

impl Default for ExportOptions {
	fn default() -> Self {
		Self {
			timezone: TZ,
			name: INSTITUTION.to_owned(),
			stamp: Utc::now(),
		}
	}
}

#[must_use]
pub fn create_calendar(meetings: &[ClassMeeting], options: &ExportOptions) -> Calendar {
	let mut calendar = Calendar::new();
	calendar.name(&options.name);
	calendar.timezone(options.timezone.name());

	for (index, class) in meetings.iter().enumerate() {
		let mut event = Event::new();

		event
			.uid(&format!(
				"{index}-{}-{}@sit2ics",
				class.class_no,
				class.start.format("%Y%m%dT%H%M")
			))
			.timestamp(options.stamp)
			.summary(&format!("{} - {}", class.module_title, class.class_component))
			.starts(CalendarDateTime::Floating(class.start))
			.ends(CalendarDateTime::Floating(class.end))
			.location(&class.room)
			.description(&format!(
				"Section: {}\nClass Number: {}\nInstructors: {}",
				class.class_section, class.class_no, class.instructors
			));

		calendar.push(event);
	}

	calendar
}

/// Dots trimmed from both ends, spaces replaced, `.ics` appended.
#[must_use]
pub fn file_name(name: &str) -> String {
	format!("{}.ics", name.trim_matches('.').replace(' ', "_"))
}

/// Writes the calendar for `meetings` to `dir`, returning the path written.
///
/// # Errors
///
/// Fails if the file cannot be written.
pub fn export(
	meetings: &[ClassMeeting],
	dir: &Path,
	name: &str,
	options: &ExportOptions,
) -> Result<PathBuf> {
	let calendar = create_calendar(meetings, options);
	let path = dir.join(file_name(name));

	fs::write(&path, calendar.to_string())?;
	log::info!("wrote {} events to {}", meetings.len(), path.display());

	Ok(path)
}
