// ABOUTME: Extraction modules turning parsed documents into typed records.
// ABOUTME: One module per page family: schedule, replacements, specialties, teachers.

//! Page extractors.
//!
//! Each extractor takes an already-parsed [`scraper::Html`] document and
//! returns typed records; none of them performs IO. The only fatal
//! conditions are the three page-shape drifts (unknown week label, dateless
//! bulletin header, unresolved specialty query) - everything else degrades
//! per field to the sentinels in [`crate::text`].

pub mod replacements;
pub mod schedule;
pub mod specialties;
pub mod teachers;
