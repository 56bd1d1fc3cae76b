#![warn(clippy::pedantic)]

use std::{
	io::{self, BufRead, Write},
	path::PathBuf,
};

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use sit2ics_core::{ExportOptions, In4Sit, INSTITUTION};
use sit2ics_portal::{Credentials, PortalOptions};

#[derive(Parser)]
#[clap(about = "Export your SIT weekly schedule to an iCalendar file")]
struct Args {
	/// Name of the calendar file, without extension.
	#[clap(default_value = "sem2-timetable")]
	name: String,
	/// Read a saved schedule page instead of logging in (`-` for stdin).
	#[clap(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
	html: Option<PathBuf>,
	#[clap(short, long, env = "SIT_USERNAME")]
	username: Option<String>,
	#[clap(long, env = "SIT_PASSWORD", hide_env_values = true)]
	password: Option<String>,
	#[clap(long)]
	headless: bool,
	#[clap(long, value_name = "URL", default_value = "http://localhost:9515")]
	webdriver: String,
	#[clap(long, default_value = "Asia/Singapore", value_parser = parse_timezone)]
	timezone: Tz,
	/// Directory to write the calendar to.
	#[clap(short, long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
	dir: PathBuf,
}

fn parse_timezone(s: &str) -> Result<Tz, String> {
	s.parse::<Tz>().map_err(|e| e.to_string())
}

fn prompt(label: &str) -> Result<String> {
	print!("{label}: ");
	io::stdout().flush()?;

	let mut line = String::new();
	io::stdin().lock().read_line(&mut line)?;

	Ok(line.trim().to_owned())
}

fn credentials(args: &Args) -> Result<Credentials> {
	let username = match &args.username {
		Some(username) => username.clone(),
		None => prompt("SIT Account Address")?,
	};
	let password = match &args.password {
		Some(password) => password.clone(),
		None => rpassword::prompt_password("SIT Account Password: ")
			.context("could not read the password")?,
	};

	Ok(Credentials { username, password })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();

	let (schedule, term) = if let Some(path) = &args.html {
		let path = (path.as_os_str() != "-").then_some(path);
		let schedule = sit2ics_core::parse_from_file(path)
			.context("could not read the saved schedule page")?;

		(schedule, None)
	} else {
		let credentials = credentials(&args)?;
		let options = PortalOptions {
			webdriver: args.webdriver.clone(),
			headless: args.headless,
		};

		sit2ics_portal::scrape(&In4Sit, &options, &credentials)
			.await
			.context("could not scrape the weekly schedule")?
	};

	let options = ExportOptions {
		timezone: args.timezone,
		name: term.unwrap_or_else(|| INSTITUTION.to_owned()),
		stamp: Utc::now(),
	};

	let path = sit2ics_core::export(&schedule.meetings, &args.dir, &args.name, &options)
		.with_context(|| format!("could not write {}", sit2ics_core::file_name(&args.name)))?;

	log::debug!("{}", path.display());
	println!("exported.");

	Ok(())
}
