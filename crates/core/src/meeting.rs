//! Turning the text cells of one schedule row into a [`ClassMeeting`].

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";

/// A full row carries class number, section and component before the
/// logical fields. Rows that are one cell short lost the class number.
const FULL_ROW: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMeeting {
	pub module_title: String,
	pub class_no: String,
	pub class_section: String,
	pub class_component: String,
	pub start: NaiveDateTime,
	pub end: NaiveDateTime,
	pub room: String,
	pub instructors: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	DayTime,
	Room,
	Instructors,
	Dates,
}

impl Field {
	fn column(self) -> usize {
		match self {
			Self::DayTime => 3,
			Self::Room => 4,
			Self::Instructors => 5,
			Self::Dates => 6,
		}
	}
}

/// The text cells of a single meeting row.
#[derive(Debug, Clone, Copy)]
pub struct RowCells<'a>(pub &'a [String]);

impl<'a> RowCells<'a> {
	/// Column offset of the logical fields: 0 for a full row, -1 otherwise.
	#[must_use]
	pub fn offset(&self) -> isize {
		if self.0.len() < FULL_ROW {
			-1
		} else {
			0
		}
	}

	#[must_use]
	pub fn field(&self, field: Field) -> Option<&'a str> {
		let index = field.column().checked_add_signed(self.offset())?;

		self.0.get(index).map(String::as_str)
	}

	/// Whether this row opens a new class block.
	#[must_use]
	pub fn starts_block(&self) -> bool {
		self.0
			.first()
			.is_some_and(|cell| cell.trim().chars().count() > 2)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// The day/time cell does not hold exactly one `HH:MM - HH:MM` range.
	TimeNotRange,
	MissingCells,
	/// The end timestamp is not after the start timestamp.
	InvertedRange,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::TimeNotRange => "time is not a range",
			Self::MissingCells => "missing cells",
			Self::InvertedRange => "ends before it starts",
		})
	}
}

/// Class identifiers carried from the first row of a block to the rows after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassBlock {
	pub class_no: String,
	pub section: String,
	pub component: String,
}

impl ClassBlock {
	/// Takes over the identifiers of `cells` if the row opens a new block.
	pub fn update(&mut self, cells: RowCells) {
		if !cells.starts_block() {
			return;
		}

		let cell = |i: usize| cells.0.get(i).map_or_else(String::new, |s| s.trim().to_owned());

		self.class_no = cell(0);
		self.section = cell(1);
		self.component = cell(2);
	}
}

/// Splits `"<label> HH:MM - HH:MM"` into its two times, dropping the label.
#[must_use]
pub fn split_time_range(s: &str) -> Option<(&str, &str)> {
	let (_, times) = s.trim().split_once(' ')?;
	split_pair(times)
}

fn split_pair(s: &str) -> Option<(&str, &str)> {
	let mut parts = s.split(" - ");

	match (parts.next(), parts.next(), parts.next()) {
		(Some(a), Some(b), None) => Some((a.trim(), b.trim())),
		_ => None,
	}
}

fn parse_date(s: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::timestamp("date", s, e))
}

fn parse_time(s: &str) -> Result<NaiveTime> {
	NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| Error::timestamp("time", s, e))
}

/// Combines `"DD/MM/YYYY - DD/MM/YYYY"` with the two times of a time range.
///
/// # Errors
///
/// Fails if a date or time does not follow the portal's format.
pub fn timestamps(
	dates: &str,
	(start_time, end_time): (&str, &str),
) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
	let (start_date, end_date) =
		split_pair(dates).ok_or_else(|| Error::DateRange(dates.to_owned()))?;

	let start = parse_date(start_date)?.and_time(parse_time(start_time)?);
	let end = parse_date(end_date)?.and_time(parse_time(end_time)?);

	Ok((start < end).then_some((start, end)))
}

/// Parses one row, updating the carried `block` first.
///
/// # Errors
///
/// Fails if the row holds a time range but its timestamps cannot be parsed.
pub fn parse_row(
	module_title: &str,
	block: &mut ClassBlock,
	cells: RowCells,
) -> Result<std::result::Result<ClassMeeting, SkipReason>> {
	block.update(cells);

	let (Some(day_time), Some(room), Some(instructors), Some(dates)) = (
		cells.field(Field::DayTime),
		cells.field(Field::Room),
		cells.field(Field::Instructors),
		cells.field(Field::Dates),
	) else {
		return Ok(Err(SkipReason::MissingCells));
	};

	let Some(times) = split_time_range(day_time) else {
		return Ok(Err(SkipReason::TimeNotRange));
	};

	let Some((start, end)) = timestamps(dates, times)? else {
		return Ok(Err(SkipReason::InvertedRange));
	};

	Ok(Ok(ClassMeeting {
		module_title: module_title.to_owned(),
		class_no: block.class_no.clone(),
		class_section: block.section.clone(),
		class_component: block.component.clone(),
		start,
		end,
		room: room.trim().to_owned(),
		instructors: instructors.trim().replace('\n', " "),
	}))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(cells: &[&str]) -> Vec<String> {
		cells.iter().map(ToString::to_string).collect()
	}

	fn full() -> Vec<String> {
		row(&[
			"1234",
			"L1",
			"LEC",
			"Mo 09:00 - 11:00",
			"E2-05-12",
			"Jane Tan\nJohn Lim",
			"08/01/2024 - 08/01/2024",
		])
	}

	#[test]
	fn test_offset_by_cell_count() {
		assert_eq!(RowCells(&full()).offset(), 0);
		assert_eq!(RowCells(&full()[1..]).offset(), -1);
	}

	#[test]
	fn test_short_row_reads_same_fields() {
		let full = full();
		let short = &full[1..];

		for field in [Field::DayTime, Field::Room, Field::Instructors, Field::Dates] {
			assert_eq!(RowCells(&full).field(field), RowCells(short).field(field));
		}
	}

	#[test]
	fn test_parse_full_row() {
		let mut block = ClassBlock::default();
		let meeting = parse_row("Programming", &mut block, RowCells(&full()))
			.unwrap()
			.unwrap();

		assert_eq!(meeting.class_no, "1234");
		assert_eq!(meeting.class_section, "L1");
		assert_eq!(meeting.class_component, "LEC");
		assert_eq!(meeting.instructors, "Jane Tan John Lim");
		assert_eq!(meeting.start.to_string(), "2024-01-08 09:00:00");
		assert_eq!(meeting.end.to_string(), "2024-01-08 11:00:00");
		assert!(meeting.start < meeting.end);
	}

	#[test]
	fn test_carry_forward() {
		let mut block = ClassBlock::default();
		let first = full();
		let mut second = full();
		second[0] = "\u{a0}".into();
		second[1] = String::new();
		second[2] = String::new();
		second[3] = "We 14:00 - 16:00".into();
		let third = row(&[
			"",
			"",
			"Fr 10:00 - 12:00",
			"E2-05-12",
			"Jane Tan",
			"12/01/2024 - 12/01/2024",
		]);

		let meetings = [first, second, third]
			.iter()
			.map(|cells| parse_row("Programming", &mut block, RowCells(cells)).unwrap().unwrap())
			.collect::<Vec<_>>();

		for meeting in &meetings {
			assert_eq!(
				(&*meeting.class_no, &*meeting.class_section, &*meeting.class_component),
				("1234", "L1", "LEC")
			);
		}
		assert_eq!(meetings[2].start.to_string(), "2024-01-12 10:00:00");
	}

	#[test]
	fn test_new_block_replaces_identifiers() {
		let mut block = ClassBlock::default();
		block.update(RowCells(&full()));

		let mut next = full();
		next[0] = "5678".into();
		next[1] = "T3".into();
		next[2] = "TUT".into();
		block.update(RowCells(&next));

		assert_eq!(block.class_no, "5678");
		assert_eq!(block.section, "T3");
		assert_eq!(block.component, "TUT");
	}

	#[test]
	fn test_time_not_range_is_skipped() {
		let mut block = ClassBlock::default();

		for day_time in ["TBA", "Mo 09:00", "Mo 09:00 - 10:00 - 11:00", ""] {
			let mut cells = full();
			cells[3] = day_time.into();

			assert_eq!(
				parse_row("Programming", &mut block, RowCells(&cells)).unwrap(),
				Err(SkipReason::TimeNotRange),
				"{day_time:?}"
			);
		}
	}

	#[test]
	fn test_missing_cells_is_skipped() {
		let mut block = ClassBlock::default();
		let cells = row(&["1234", "L1", "LEC", "Mo 09:00 - 11:00"]);

		assert_eq!(
			parse_row("Programming", &mut block, RowCells(&cells)).unwrap(),
			Err(SkipReason::MissingCells)
		);
	}

	#[test]
	fn test_inverted_range_is_skipped() {
		let mut block = ClassBlock::default();
		let mut cells = full();
		cells[3] = "Mo 11:00 - 09:00".into();

		assert_eq!(
			parse_row("Programming", &mut block, RowCells(&cells)).unwrap(),
			Err(SkipReason::InvertedRange)
		);
	}

	#[test]
	fn test_bad_date_is_an_error() {
		let mut block = ClassBlock::default();
		let mut cells = full();
		cells[6] = "2024-01-08 - 2024-01-08".into();

		assert!(matches!(
			parse_row("Programming", &mut block, RowCells(&cells)),
			Err(Error::Timestamp { kind: "date", .. })
		));
	}

	#[test]
	fn test_date_without_range_is_an_error() {
		let mut block = ClassBlock::default();
		let mut cells = full();
		cells[6] = "08/01/2024".into();

		assert!(matches!(
			parse_row("Programming", &mut block, RowCells(&cells)),
			Err(Error::DateRange(_))
		));
	}

	#[test]
	fn test_start_before_end_for_valid_ranges() {
		for (times, dates) in [
			(("08:00", "08:01"), "01/02/2024 - 01/02/2024"),
			(("23:00", "01:00"), "01/02/2024 - 02/02/2024"),
			(("00:00", "23:59"), "31/12/2023 - 31/12/2023"),
		] {
			let (start, end) = timestamps(dates, times).unwrap().unwrap();
			assert!(start < end);
		}
	}
}
