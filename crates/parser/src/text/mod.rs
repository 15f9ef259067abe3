// ABOUTME: Pure text normalizers shared by every extractor.
// ABOUTME: Lesson-text splitting, weekday resolution, group-code and escape repair, date scanning.

//! Text normalization primitives.
//!
//! Everything in this module is a pure function over strings: no DOM, no IO.
//! The extractors lean on these to recover clean fields from free-form or
//! malformed cell text.
//!
//! Key behaviors:
//! - Missing data degrades to the [`ABSENT`] sentinel, never to an error.
//! - Weekday resolution returns -1 for unknown names instead of failing.
//! - Group codes are rewritten so visually ambiguous О/O glyphs become the
//!   digit they stand for before a code is ever used as an identifier.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Sentinel for absent source data (an empty lesson name, a missing teacher,
/// a day without a place label).
pub const ABSENT: &str = "Отсутствует";

/// Placeholder for a missing half of an alternating numerator/denominator pair.
pub const DASH: &str = "-";

/// Canonical weekday names, Sunday-first, matching the publisher's locale.
pub const WEEKDAYS: [&str; 7] = [
    "Воскресенье",
    "Понедельник",
    "Вторник",
    "Среда",
    "Четверг",
    "Пятница",
    "Суббота",
];

static WEEKDAYS_LOWER: Lazy<Vec<String>> =
    Lazy::new(|| WEEKDAYS.iter().map(|d| d.to_lowercase()).collect());

/// Teacher-name-shaped run: a capitalized surname followed by two dotted
/// initials, e.g. "Иванов И.И." or "Иванов И. И.".
static TEACHER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[А-ЯЁ][а-яё]+\s+[А-ЯЁ]\.\s?[А-ЯЁ]\.").unwrap());

/// `DD.MM.YYYY`-shaped run.
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{4}").unwrap());

/// `DD.MM.YYYY HH:MM:SS`-shaped run.
static DATETIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{4} \d{2}:\d{2}:\d{2}").unwrap());

/// A combined "subject + teacher" cell split into its two fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonText {
    pub name: String,
    pub teacher: String,
}

/// Normalizes whitespace by collapsing runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrites non-breaking spaces to plain spaces.
///
/// The staff directory pads names with U+00A0, which breaks whitespace
/// tokenization if left in place.
pub fn unnbsp(s: &str) -> String {
    s.replace('\u{a0}', " ")
}

/// Splits a combined "subject + teacher" cell into lesson name and teacher.
///
/// Every teacher-name-shaped run is removed from the text; the remainder is
/// the lesson name. Multiple runs are joined with ", " - a cell listing two
/// co-teachers keeps both. With no run at all the whole text is the name and
/// the teacher defaults to [`ABSENT`].
pub fn split_lesson_text(raw: &str) -> LessonText {
    let text = normalize_whitespace(raw);

    let teachers: Vec<&str> = TEACHER_NAME_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .collect();

    if teachers.is_empty() {
        return LessonText {
            name: if text.is_empty() {
                ABSENT.to_string()
            } else {
                text
            },
            teacher: ABSENT.to_string(),
        };
    }

    let stripped = TEACHER_NAME_RE.replace_all(&text, " ");
    let name = normalize_whitespace(&stripped)
        .trim_matches([',', ' '])
        .to_string();

    LessonText {
        name: if name.is_empty() {
            ABSENT.to_string()
        } else {
            name
        },
        teacher: teachers.join(", "),
    }
}

/// Resolves free text to a Sunday-first weekday index.
///
/// Case-insensitive containment match against the canonical names; the first
/// name found wins. Returns -1 when no weekday name occurs in the text.
pub fn weekday_index(text: &str) -> i8 {
    let lower = text.to_lowercase();
    for (i, day) in WEEKDAYS_LOWER.iter().enumerate() {
        if lower.contains(day) {
            return i as i8;
        }
    }
    -1
}

/// Rewrites visually ambiguous letters in a group code to the digit they
/// stand for.
///
/// Group labels mix Cyrillic О/о and Latin O/o with the digit 0 depending on
/// who typed the page revision; all four spell the digit.
pub fn normalize_group_code(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            'О' | 'о' | 'O' | 'o' => '0',
            other => other,
        })
        .collect()
}

/// Best-effort reversal of percent-escaped group labels.
///
/// Some page revisions publish labels through a lossy URL-escaping step
/// ("%D0%9E-21"). Unescapable input comes back unchanged.
pub fn repair_percent_escapes(raw: &str) -> String {
    if !raw.contains('%') {
        return raw.to_string();
    }
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Finds the first valid `DD.MM.YYYY` date in the text.
pub fn find_date(text: &str) -> Option<NaiveDate> {
    DATE_RE
        .find_iter(text)
        .find_map(|m| NaiveDate::parse_from_str(m.as_str(), "%d.%m.%Y").ok())
}

/// Finds the first valid `DD.MM.YYYY HH:MM:SS` timestamp in the text.
pub fn find_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_RE
        .find_iter(text)
        .find_map(|m| NaiveDateTime::parse_from_str(m.as_str(), "%d.%m.%Y %H:%M:%S").ok())
}
