#![warn(clippy::pedantic)]

use fantoccini::{wd::Capabilities, Client, ClientBuilder};
use serde_json::json;
use sit2ics_core::{PageModel, Schedule};

pub mod error;
pub mod session;
pub mod wait;

pub use error::{Error, Result};
pub use session::{scrape_capture, Capture, Credentials, Session, Stage};

#[derive(Debug, Clone)]
pub struct PortalOptions {
	pub webdriver: String,
	pub headless: bool,
}

impl Default for PortalOptions {
	fn default() -> Self {
		Self {
			webdriver: "http://localhost:9515".to_owned(),
			headless: false,
		}
	}
}

#[must_use]
pub fn capabilities(headless: bool) -> Capabilities {
	let args = if headless {
		vec!["--headless=new"]
	} else {
		Vec::new()
	};

	let mut caps = Capabilities::new();
	caps.insert("goog:chromeOptions".to_owned(), json!({ "args": args }));
	caps
}

/// Connects to the WebDriver server named in `options`.
///
/// # Errors
///
/// Fails if no session can be created.
pub async fn connect(options: &PortalOptions) -> Result<Client> {
	let client = ClientBuilder::native()
		.capabilities(capabilities(options.headless))
		.connect(&options.webdriver)
		.await?;

	Ok(client)
}

/// Logs in, reads the weekly schedule and returns it with the term's label.
///
/// The browser session is closed before returning, whether or not scraping worked.
///
/// # Errors
///
/// Fails if the session cannot be created, a page element never appears, or the
/// schedule holds timestamps in an unexpected format.
pub async fn scrape<P: PageModel>(
	page: &P,
	options: &PortalOptions,
	credentials: &Credentials,
) -> Result<(Schedule, Option<String>)> {
	let client = connect(options).await?;
	let result = Session::new(&client, page).run(credentials).await;

	if let Err(e) = client.close().await {
		log::warn!("could not close the browser session: {e}");
	}

	result
}
