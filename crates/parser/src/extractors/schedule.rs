// ABOUTME: Extractor for the weekly schedule page: current-week badge and full timetable.
// ABOUTME: Specialty panes -> group blocks -> one table per weekday -> lesson rows.

//! Weekly schedule extraction.
//!
//! The schedule page is a tabbed layout: one pane per specialty, inside each
//! pane one block per printed timetable, inside each block one table per
//! weekday. A block's label may name several co-scheduled groups
//! ("Группа О-21, О-22"); all of them receive the same week of days by
//! reference.
//!
//! Key behaviors:
//! - Rows numbered 0 are explicit "no lesson" rows and are dropped.
//! - A name cell with nested elements encodes two alternating lessons
//!   (numerator/denominator); plain cells are single lessons.
//! - Unresolved weekday names yield index -1 rather than failing; only the
//!   current-week badge is allowed to abort extraction.

use std::sync::Arc;

use scraper::{ElementRef, Html};

use crate::dom::{
    all_in, element_children, first, first_in, has_element_children, text_of,
};
use crate::error::ParseError;
use crate::models::{Day, Group, Lesson, Specialty, Week};
use crate::text::{
    normalize_group_code, repair_percent_escapes, weekday_index, ABSENT, DASH,
};

/// Badge showing the current alternation phase.
const WEEK_BADGE: &str = "span.label";

/// One pane per specialty under the tab container.
const SPECIALTY_PANES: &str = "div.tab-content > div";

/// Fixed phrase prefixed to every specialty header.
const SPECIALTY_PREFIX: &str = "Расписание занятий по специальности";

/// Fixed phrase prefixed to every group label.
const GROUP_PREFIX: &str = "Группа";

/// Reads the current-week badge.
///
/// An unrecognized label is one of the fatal page-shape conditions: if the
/// badge drifted, nothing else on the page can be trusted either.
pub fn extract_week(doc: &Html) -> Result<Week, ParseError> {
    let label = first(doc, WEEK_BADGE).map(text_of).unwrap_or_default();
    let lower = label.to_lowercase();
    if lower.contains("знаменатель") {
        Ok(Week::Denominator)
    } else if lower.contains("числитель") {
        Ok(Week::Numerator)
    } else {
        Err(ParseError::unknown_week("ExtractWeek", label))
    }
}

/// Parses the full per-specialty, per-group, per-day weekly timetable.
pub fn extract_schedule(doc: &Html) -> Vec<Specialty> {
    let panes = crate::dom::all(doc, SPECIALTY_PANES);
    panes.into_iter().filter_map(extract_specialty).collect()
}

/// One tab pane: specialty header plus its group blocks.
fn extract_specialty(pane: ElementRef<'_>) -> Option<Specialty> {
    let name = first_in(pane, "h2")
        .map(|h| strip_prefix_phrase(&text_of(h), SPECIALTY_PREFIX))
        .unwrap_or_else(|| ABSENT.to_string());

    let mut groups = Vec::new();
    for block in element_children(pane) {
        if block.value().name() != "div" {
            continue;
        }
        groups.extend(extract_group_block(block));
    }

    if groups.is_empty() {
        None
    } else {
        Some(Specialty { name, groups })
    }
}

/// One printed timetable block: a label naming one or more groups, then one
/// table per weekday. The resolved week is attached by reference to every
/// group name of the label.
fn extract_group_block(block: ElementRef<'_>) -> Vec<Group> {
    let label = match first_in(block, "h3") {
        Some(h) => text_of(h),
        None => return Vec::new(),
    };

    let label = strip_prefix_phrase(&repair_percent_escapes(&label), GROUP_PREFIX);
    let names: Vec<String> = label
        .split(", ")
        .map(normalize_group_code)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Vec::new();
    }

    let days: Vec<Day> = all_in(block, "table")
        .into_iter()
        .map(extract_day)
        .collect();
    let days = Arc::new(days);

    names
        .into_iter()
        .map(|name| Group {
            name,
            days: Arc::clone(&days),
        })
        .collect()
}

/// One weekday table: caption carries "day name (place)", rows carry lessons.
fn extract_day(table: ElementRef<'_>) -> Day {
    let caption = first_in(table, "caption").map(text_of).unwrap_or_default();
    let (day_name, place) = split_caption(&caption);

    let lessons = all_in(table, "tr")
        .into_iter()
        .skip(1) // header row
        .filter_map(extract_lesson_row)
        .collect();

    Day {
        num: weekday_index(&day_name),
        place,
        lessons,
    }
}

/// Splits a caption into the day name (remainder) and the parenthesized
/// place label with its enclosing characters stripped.
fn split_caption(caption: &str) -> (String, String) {
    if let (Some(open), Some(close)) = (caption.find('('), caption.rfind(')')) {
        if open < close {
            let place = caption[open + 1..close].trim();
            let day = caption[..open].trim();
            let place = if place.is_empty() { ABSENT } else { place };
            return (day.to_string(), place.to_string());
        }
    }
    (
        caption.trim().to_string(),
        ABSENT.to_string(),
    )
}

/// One timetable row. Returns None for header leftovers, "no lesson" rows
/// (slot 0) and rows whose number cell is unreadable.
fn extract_lesson_row(row: ElementRef<'_>) -> Option<Lesson> {
    let cells = all_in(row, "td");
    let num: u8 = text_of(*cells.first()?).parse().unwrap_or(0);
    if num == 0 {
        return None;
    }

    let name_cell = cells.get(1).copied();
    let teacher_cell = cells.get(2).copied();

    let alternating = name_cell.map(has_element_children).unwrap_or(false);
    if alternating {
        let (name, alt_name) = positional_pair(name_cell);
        let (teacher, alt_teacher) = positional_pair(teacher_cell);
        return Some(Lesson {
            num,
            name,
            alt_name: Some(alt_name),
            teacher,
            alt_teacher: Some(alt_teacher),
        });
    }

    Some(Lesson {
        num,
        name: cell_text_or(name_cell, ABSENT),
        alt_name: None,
        teacher: cell_text_or(teacher_cell, ABSENT),
        alt_teacher: None,
    })
}

/// Primary/secondary texts from the two fixed child positions of an
/// alternating cell; missing pieces default to the placeholder dash.
fn positional_pair(cell: Option<ElementRef<'_>>) -> (String, String) {
    let children = cell.map(element_children).unwrap_or_default();
    let piece = |i: usize| -> String {
        children
            .get(i)
            .map(|el| text_of(*el))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DASH.to_string())
    };
    (piece(0), piece(1))
}

fn cell_text_or(cell: Option<ElementRef<'_>>, default: &str) -> String {
    cell.map(text_of)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn strip_prefix_phrase(text: &str, prefix: &str) -> String {
    text.strip_prefix(prefix).unwrap_or(text).trim().to_string()
}
