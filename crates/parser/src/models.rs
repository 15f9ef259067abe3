// ABOUTME: Typed domain records produced by the extractors.
// ABOUTME: Timetables, replacements, specialty directory/micro-site content, staff entries.

//! Domain record types.
//!
//! Every record is an immutable value object built once per extraction call.
//! Day and replacement sequences that one printed block assigns to several
//! co-scheduled groups are shared by reference (`Arc`), not duplicated, so
//! memory and equality semantics match what the page actually says.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Phase of the two-week alternating schedule cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Week {
    /// "Числитель" - the numerator week.
    Numerator,
    /// "Знаменатель" - the denominator week.
    Denominator,
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Week::Numerator => "Числитель",
            Week::Denominator => "Знаменатель",
        };
        write!(f, "{}", s)
    }
}

/// One timetable slot.
///
/// `alt_name`/`alt_teacher` are present only when the source cell encodes two
/// alternating lessons (numerator/denominator variants); they are positionally
/// paired with `name`/`teacher`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub num: u8,
    pub name: String,
    pub alt_name: Option<String>,
    pub teacher: String,
    pub alt_teacher: Option<String>,
}

/// One weekday of a group's timetable.
///
/// `num` is the Sunday-first weekday index 0–6, or -1 when the printed day
/// name could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub num: i8,
    pub place: String,
    pub lessons: Vec<Lesson>,
}

/// A student cohort with its full week of days.
///
/// When one timetable block serves several co-scheduled groups, all of them
/// hold the same `Arc` - the week is shared, not copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub days: Arc<Vec<Day>>,
}

/// An academic program and its groups, as printed on the schedule page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub name: String,
    pub groups: Vec<Group>,
}

/// One side of a substitution: the lesson as scheduled or as replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementLesson {
    pub name: String,
    pub teacher: String,
}

/// A single published substitution for one lesson slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementItem {
    pub num: u8,
    #[serde(rename = "old")]
    pub old_lesson: ReplacementLesson,
    #[serde(rename = "new")]
    pub new_lesson: ReplacementLesson,
    /// When the substitution was published.
    pub created: NaiveDateTime,
}

/// Substitutions for one group on one date.
///
/// Bulletin blocks listing several groups share one `Arc` of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementGroup {
    pub group: String,
    pub replacements: Arc<Vec<ReplacementItem>>,
}

/// All substitutions published for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementDay {
    pub date: NaiveDate,
    pub groups: Vec<ReplacementGroup>,
}

/// A directory row: specialty display name, code and micro-site URL.
///
/// `code` is empty when the anchor text carries none - a data-quality defect
/// the directory extractor tolerates rather than guards against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialtyEntry {
    pub name: String,
    pub code: String,
    pub url: String,
}

/// One dated link on a specialty micro-site (notice, news post or
/// exam-question entry). Date-only sources parse to midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteItem {
    pub name: String,
    pub url: String,
    pub date: NaiveDateTime,
}

/// One leadership role inside a group roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderRole {
    pub photo: String,
    pub role: String,
    pub name: String,
}

/// Leadership roster of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLeaders {
    pub name: String,
    pub roles: Vec<LeaderRole>,
}

/// A specialty micro-site: the directory entry plus its extracted content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialtySite {
    pub name: String,
    pub code: String,
    pub url: String,
    /// "Важная информация" notices.
    pub important: Vec<SiteItem>,
    pub news: Vec<SiteItem>,
    pub exam_questions: Vec<SiteItem>,
    pub group_leaders: Vec<GroupLeaders>,
}

impl SpecialtySite {
    /// Builds a site record around its directory entry.
    pub fn from_entry(entry: &SpecialtyEntry) -> Self {
        Self {
            name: entry.name.clone(),
            code: entry.code.clone(),
            url: entry.url.clone(),
            important: Vec::new(),
            news: Vec::new(),
            exam_questions: Vec::new(),
            group_leaders: Vec::new(),
        }
    }
}

/// A staff-directory entry with the full name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub surname: String,
    pub name: String,
    /// Remaining name tokens rejoined; empty for two-token names.
    pub patronymic: String,
    pub photo: String,
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_displays_russian_label() {
        assert_eq!(Week::Numerator.to_string(), "Числитель");
        assert_eq!(Week::Denominator.to_string(), "Знаменатель");
    }

    #[test]
    fn replacement_item_serializes_old_new_field_names() {
        let item = ReplacementItem {
            num: 2,
            old_lesson: ReplacementLesson {
                name: "Математика".into(),
                teacher: "Иванов И.И.".into(),
            },
            new_lesson: ReplacementLesson {
                name: "Физика".into(),
                teacher: "Петров П.П.".into(),
            },
            created: NaiveDate::from_ymd_opt(2024, 2, 5)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("old").is_some());
        assert!(json.get("new").is_some());
        assert!(json.get("old_lesson").is_none());
    }

    #[test]
    fn shared_days_compare_equal_and_share_storage() {
        let days = Arc::new(vec![Day {
            num: 1,
            place: "Корпус 1".into(),
            lessons: Vec::new(),
        }]);
        let a = Group {
            name: "0-21".into(),
            days: Arc::clone(&days),
        };
        let b = Group {
            name: "0-22".into(),
            days: Arc::clone(&days),
        };
        assert!(Arc::ptr_eq(&a.days, &b.days));
        assert_eq!(a.days, b.days);
    }
}
