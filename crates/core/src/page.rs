//! Where things live on the portal's pages.
//!
//! Everything that depends on the portal's markup goes through [`PageModel`],
//! so a layout change only touches one implementation.

use select::{document::Document, node::Node, predicate::Name};

/// How to find an element in the live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	Id(&'static str),
	Css(&'static str),
	XPath(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct LoginFields {
	pub username: Target,
	pub password: Target,
	pub submit: Target,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleEntry {
	pub course_management: Target,
	pub weekly_schedule: Target,
	pub frame: Target,
	pub list_view: Target,
	pub module_list: Target,
	pub term_label: Target,
}

pub trait PageModel {
	fn entry_url(&self) -> &str;
	fn login_fields(&self) -> LoginFields;
	/// Visible once the login went through.
	fn landing_marker(&self) -> Target;
	fn schedule_entry(&self) -> ScheduleEntry;

	/// One node per module, in document order.
	fn module_blocks<'a>(&self, document: &'a Document) -> Vec<Node<'a>>;
	fn module_title(&self, block: Node) -> String;
	/// Meeting rows of a module, header excluded.
	fn meeting_rows<'a>(&self, block: Node<'a>) -> Vec<Node<'a>>;
	fn row_cells(&self, row: Node) -> Vec<String>;
}

/// The in4sit PeopleSoft pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct In4Sit;

const MODULES: &str = "html/body/form/div[5]/table/tbody/tr/td/div/table/tbody/tr[10]/td[2]/div/table/tbody/tr/td/div/table";
const MODULE_TITLE: &str = "tbody/tr[1]/td";
const MEETINGS: &str = "tbody/tr/td/table/tbody/tr/td/div/table/tbody/tr/td/table";
const MEETING_ROWS: &str = "tbody/tr";
const CELLS: &str = "td/div/span";

impl PageModel for In4Sit {
	fn entry_url(&self) -> &str {
		"https://in4sit.singaporetech.edu.sg/"
	}

	fn login_fields(&self) -> LoginFields {
		LoginFields {
			username: Target::Id("userNameInput"),
			password: Target::Id("passwordInput"),
			submit: Target::Id("submitButton"),
		}
	}

	fn landing_marker(&self) -> Target {
		Target::Id("HOMEPAGE_SELECTOR$PIMG")
	}

	fn schedule_entry(&self) -> ScheduleEntry {
		ScheduleEntry {
			course_management: Target::Id("win0divPTNUI_LAND_REC_GROUPLET$1"),
			weekly_schedule: Target::Id("win1div$ICField$11$$1"),
			frame: Target::Id("main_target_win0"),
			list_view: Target::XPath(r#"//*[@id="DERIVED_REGFRM1_SSR_SCHED_FORMAT$258$"]"#),
			module_list: Target::Id("win0divSSR_DUMMY_RECVW$0"),
			term_label: Target::Css(r"#DERIVED_REGFRM1_SSR_STDNTKEY_DESCR\$11\$"),
		}
	}

	fn module_blocks<'a>(&self, document: &'a Document) -> Vec<Node<'a>> {
		walk_document(document, MODULES)
	}

	fn module_title(&self, block: Node) -> String {
		walk([block], MODULE_TITLE)
			.first()
			.map(|node| text(*node))
			.unwrap_or_default()
	}

	fn meeting_rows<'a>(&self, block: Node<'a>) -> Vec<Node<'a>> {
		walk([block], MEETINGS)
			.last()
			.map(|table| walk([*table], MEETING_ROWS).into_iter().skip(1).collect())
			.unwrap_or_default()
	}

	fn row_cells(&self, row: Node) -> Vec<String> {
		walk([row], CELLS).into_iter().map(text).collect()
	}
}

/// One `name` or `name[position]` step of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step<'p> {
	name: &'p str,
	/// 1-based, counted among same-named siblings.
	position: Option<usize>,
}

impl<'p> Step<'p> {
	fn parse(s: &'p str) -> Self {
		match s.split_once('[') {
			Some((name, rest)) => Self {
				name,
				position: rest.trim_end_matches(']').parse().ok(),
			},
			None => Self {
				name: s,
				position: None,
			},
		}
	}

	fn select<'a>(self, nodes: impl IntoIterator<Item = Node<'a>>) -> Vec<Node<'a>> {
		let mut out = Vec::new();

		for node in nodes {
			let mut n = 0;
			for child in node.children().filter(|c| c.name() == Some(self.name)) {
				n += 1;
				if self.position.map_or(true, |p| p == n) {
					out.push(child);
				}
			}
		}

		out
	}
}

/// Follows a relative child path such as `tbody/tr[1]/td` from each of `roots`.
pub fn walk<'a>(roots: impl IntoIterator<Item = Node<'a>>, path: &str) -> Vec<Node<'a>> {
	path.split('/')
		.filter(|s| !s.is_empty())
		.map(Step::parse)
		.fold(roots.into_iter().collect(), |nodes, step| step.select(nodes))
}

/// Follows a path whose first step names a top-level element, such as `html/body`.
pub fn walk_document<'a>(document: &'a Document, path: &str) -> Vec<Node<'a>> {
	let path = path.trim_start_matches('/');
	let (first, rest) = path.split_once('/').unwrap_or((path, ""));
	let first = Step::parse(first);

	let roots = document
		.find(Name(first.name))
		.filter(|node| node.parent().is_none());

	walk(roots, rest)
}

/// Rendered text of a node: `<br>` becomes a newline, outer whitespace trimmed.
#[must_use]
pub fn text(node: Node) -> String {
	fn collect(node: Node, out: &mut String) {
		if let Some(s) = node.as_text() {
			out.push_str(s);
		} else if node.name() == Some("br") {
			out.push('\n');
		} else {
			for child in node.children() {
				collect(child, out);
			}
		}
	}

	let mut out = String::new();
	collect(node, &mut out);
	out.trim().to_owned()
}

#[cfg(test)]
mod tests {
	use super::*;

	const DOC: &str = "<html><body>\
		<div id=a></div>\
		<div id=b><p>one</p><span>x</span><p>two</p></div>\
		<div id=c><p>three</p></div>\
		</body></html>";

	fn ids(nodes: &[Node]) -> Vec<String> {
		nodes
			.iter()
			.map(|n| n.attr("id").map_or_else(|| text(*n), ToOwned::to_owned))
			.collect()
	}

	#[test]
	fn test_step_parse() {
		assert_eq!(
			Step::parse("div[5]"),
			Step {
				name: "div",
				position: Some(5)
			}
		);
		assert_eq!(
			Step::parse("td"),
			Step {
				name: "td",
				position: None
			}
		);
	}

	#[test]
	fn test_walk_positions_count_same_name_siblings() {
		let document = Document::from(DOC);

		assert_eq!(ids(&walk_document(&document, "/html/body/div[2]")), ["b"]);
		assert_eq!(ids(&walk_document(&document, "html/body/div[2]/p[2]")), ["two"]);
	}

	#[test]
	fn test_walk_unindexed_steps_match_all_in_order() {
		let document = Document::from(DOC);

		assert_eq!(
			ids(&walk_document(&document, "html/body/div/p")),
			["one", "two", "three"]
		);
		assert!(walk_document(&document, "html/body/table").is_empty());
	}

	#[test]
	fn test_text_renders_line_breaks() {
		let document = Document::from("<span> Jane Tan<br>John Lim&nbsp;</span>");
		let span = document.find(Name("span")).next().unwrap();

		assert_eq!(text(span), "Jane Tan\nJohn Lim");
	}
}
