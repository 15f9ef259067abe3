// ABOUTME: Extractors for the specialty directory listing and specialty micro-sites.
// ABOUTME: Directory rows, three dated list sections, and group-leadership rosters.

//! Specialty directory and micro-site extraction.
//!
//! The directory is a plain list of anchors; the embedded code follows a
//! strict grammar (`DD.DD.DD`, an optional parenthesized uppercase
//! qualifier, or the first-year placeholder). A row without a code is a
//! data-quality defect of the page, not an error - the code stays empty.
//!
//! Micro-sites carry three near-identical dated link sections (notices,
//! news, exam questions) and a tabbed group-leadership widget; all four are
//! tolerant of missing pieces.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::dom::{all, all_in, attr_of, first, first_in, text_of};
use crate::models::{GroupLeaders, LeaderRole, SiteItem, SpecialtyEntry, SpecialtySite};
use crate::text::{find_date, find_datetime};

/// Specialty-code grammar: `DD.DD.DD`, optionally a parenthesized uppercase
/// qualifier, or the literal first-year placeholder.
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{2}(?:\s?\([А-ЯЁ]+\))?|1 курс").unwrap());

/// Directory item selectors, tried in order; the first one yielding anchors
/// wins. The page dropped its wrapper class in one revision, hence the chain.
const DIRECTORY_SELECTORS: [&str; 3] = [
    "ul.specialties-list li a",
    "div.content ul li a",
    "ul li a",
];

/// The three dated list sections of a micro-site.
const SECTION_IMPORTANT: &str = "div.important-information";
const SECTION_NEWS: &str = "div.site-news";
const SECTION_EXAMS: &str = "div.exam-questions";

/// Tabbed group-leadership widget.
const LEADERS_CONTAINER: &str = "div.group-leaders";

/// Parses the specialty directory listing, one entry per list-item anchor.
pub fn extract_specialties(doc: &Html) -> Vec<SpecialtyEntry> {
    let anchors = DIRECTORY_SELECTORS
        .iter()
        .map(|sel| all(doc, sel))
        .find(|found| !found.is_empty())
        .unwrap_or_default();

    anchors
        .into_iter()
        .map(|a| {
            let name = text_of(a);
            let code = CODE_RE
                .find(&name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            SpecialtyEntry {
                name,
                code,
                url: attr_of(a, "href").unwrap_or_default(),
            }
        })
        .collect()
}

/// Parses a specialty micro-site around its directory entry.
///
/// `base_url` anchors relative hrefs; the exam-question archive carries
/// full timestamps while the other two sections are date-only.
pub fn extract_specialty_site(
    entry: &SpecialtyEntry,
    doc: &Html,
    base_url: &str,
) -> SpecialtySite {
    let mut site = SpecialtySite::from_entry(entry);
    site.important = extract_section(doc, SECTION_IMPORTANT, base_url);
    site.news = extract_section(doc, SECTION_NEWS, base_url);
    site.exam_questions = extract_section(doc, SECTION_EXAMS, base_url);
    site.group_leaders = extract_group_leaders(doc, base_url);
    site
}

/// One dated list section: per item an anchor and an adjacent date element.
fn extract_section(doc: &Html, container: &str, base_url: &str) -> Vec<SiteItem> {
    let Some(section) = first(doc, container) else {
        return Vec::new();
    };

    all_in(section, "li")
        .into_iter()
        .filter_map(|li| {
            let anchor = first_in(li, "a")?;
            let date_text = first_in(li, "span.date").map(text_of).unwrap_or_default();
            let date = find_datetime(&date_text)
                .or_else(|| find_date(&date_text).map(|d| d.and_time(chrono::NaiveTime::MIN)))
                .unwrap_or_default();
            Some(SiteItem {
                name: text_of(anchor),
                url: absolutize(attr_of(anchor, "href").unwrap_or_default(), base_url),
                date,
            })
        })
        .collect()
}

/// Group-leadership rosters: one tabbed pane per group, one role table per
/// person. A pane with zero resolved roles is dropped.
fn extract_group_leaders(doc: &Html, base_url: &str) -> Vec<GroupLeaders> {
    let Some(container) = first(doc, LEADERS_CONTAINER) else {
        return Vec::new();
    };

    all_in(container, "div.tab-pane")
        .into_iter()
        .filter_map(|pane| {
            let name = first_in(pane, "h3").map(text_of).unwrap_or_default();
            let roles: Vec<LeaderRole> = all_in(pane, "table")
                .into_iter()
                .filter_map(|table| extract_role(table, base_url))
                .collect();
            if name.is_empty() || roles.is_empty() {
                None
            } else {
                Some(GroupLeaders { name, roles })
            }
        })
        .collect()
}

/// Three fixed positions of a role table's single data row: photo, role
/// label, person name.
fn extract_role(table: ElementRef<'_>, base_url: &str) -> Option<LeaderRole> {
    let rows = all_in(table, "tr");
    let row = rows.last()?;
    let cells = all_in(*row, "td");

    let photo = cells
        .first()
        .and_then(|c| first_in(*c, "img"))
        .and_then(|img| attr_of(img, "src"))
        .map(|src| absolutize(src, base_url))
        .unwrap_or_default();
    let role = cells.get(1).map(|c| text_of(*c)).unwrap_or_default();
    let name = cells.get(2).map(|c| text_of(*c)).unwrap_or_default();

    if role.is_empty() && name.is_empty() {
        None
    } else {
        Some(LeaderRole { photo, role, name })
    }
}

/// Fixed relative-prefix rule: empty stays empty, absolute is kept, anything
/// else has its leading slash stripped and the site base prepended.
fn absolutize(href: String, base_url: &str) -> String {
    if href.is_empty() || href.starts_with("http://") || href.starts_with("https://") {
        return href;
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}
