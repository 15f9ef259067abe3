// ABOUTME: Main library entry point for the mpt.ru page parser.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, records, errors, sentinels.

//! mpt-parser - typed extraction from the public pages of mpt.ru.
//!
//! This crate fetches the college's loosely structured HTML pages (weekly
//! timetables, replacement bulletins, specialty micro-sites, the staff
//! directory) and recovers typed records from them, tolerating the markup
//! drift between page revisions. Extraction is best-effort: missing fields
//! degrade to sentinels, and only three page-shape conditions abort a parse.
//!
//! # Example
//!
//! ```no_run
//! use mpt_parser::{Client, ParseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ParseError> {
//!     let client = Client::builder().build();
//!     let week = client.current_week().await?;
//!     println!("Текущая неделя: {}", week);
//!     for day in client.replacements().await? {
//!         println!("{}: замены для {} групп", day.date, day.groups.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod models;
pub mod options;
pub mod resource;
pub mod text;

pub use crate::client::Client;
pub use crate::error::{ErrorCode, ParseError};
pub use crate::models::{
    Day, Group, GroupLeaders, LeaderRole, Lesson, ReplacementDay, ReplacementGroup,
    ReplacementItem, ReplacementLesson, SiteItem, Specialty, SpecialtyEntry, SpecialtySite,
    Teacher, Week,
};
pub use crate::options::{ClientBuilder, Options};
pub use crate::text::{ABSENT, DASH};
