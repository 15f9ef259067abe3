// ABOUTME: Extractor for schedule substitutions: multi-day bulletin and printable single-day page.
// ABOUTME: Date headers open days; content blocks attach shared item sequences to their groups.

//! Replacement (substitution) extraction.
//!
//! The bulletin is a flat sequence of sibling blocks: a page title, then
//! date headers alternating with content blocks. A header opens a new day;
//! every following content block belongs to that day until the next header.
//! A header without a recognizable date is fatal - it means the page shape
//! drifted and block attribution can no longer be trusted.
//!
//! The printable page is simpler: one table per group set, no per-row
//! publication timestamps - every item is stamped with the requested date
//! at midnight.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use scraper::{ElementRef, Html};

use crate::dom::{all_in, element_children, first, first_in, text_of};
use crate::error::ParseError;
use crate::models::{ReplacementDay, ReplacementGroup, ReplacementItem, ReplacementLesson};
use crate::text::{find_date, find_datetime, normalize_group_code, split_lesson_text};

/// Content container of the bulletin page; falls back to the whole body.
const BULLETIN_CONTAINER: &str = "div.content";

/// Fixed phrase prefixed to group captions.
const GROUP_PREFIX: &str = "Группа";

/// Parses the multi-day substitution bulletin.
///
/// Fails with `DateNotFound` when a header block carries no
/// `DD.MM.YYYY`-shaped date; content blocks appearing before the first
/// header are ignored.
pub fn extract_replacements(doc: &Html) -> Result<Vec<ReplacementDay>, ParseError> {
    let container = first(doc, BULLETIN_CONTAINER)
        .or_else(|| first(doc, "body"))
        .ok_or_else(|| {
            ParseError::extract("", "ExtractReplacements", Some(anyhow::anyhow!("empty document")))
        })?;

    let mut days: Vec<ReplacementDay> = Vec::new();

    // The first sibling is the page title.
    for block in element_children(container).into_iter().skip(1) {
        if is_header_block(block) {
            let text = text_of(block);
            let date = find_date(&text)
                .ok_or_else(|| ParseError::date_not_found("ExtractReplacements", &text))?;
            days.push(ReplacementDay {
                date,
                groups: Vec::new(),
            });
            continue;
        }

        let Some(day) = days.last_mut() else {
            continue;
        };
        let fallback = day.date.and_time(NaiveTime::MIN);
        day.groups
            .extend(extract_content_block(block, None, fallback));
    }

    Ok(days)
}

/// Parses the printable single-day page for `date`.
///
/// Every top-level sibling of the body except the first wraps one group
/// table; the page carries no publication timestamps, so every item is
/// created at `date` midnight.
pub fn extract_replacements_on(doc: &Html, date: NaiveDate) -> Vec<ReplacementGroup> {
    let Some(body) = first(doc, "body") else {
        return Vec::new();
    };

    let midnight = date.and_time(NaiveTime::MIN);
    element_children(body)
        .into_iter()
        .skip(1)
        .flat_map(|block| extract_content_block(block, Some(midnight), midnight))
        .collect()
}

/// Date headers are heading elements; content blocks are anything else.
fn is_header_block(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h2" | "h3" | "h4")
}

/// One content block: a table whose caption names one or more groups and
/// whose body rows are the substitutions. The parsed item sequence is shared
/// by reference across all the caption's group names.
fn extract_content_block(
    block: ElementRef<'_>,
    fixed_created: Option<NaiveDateTime>,
    fallback_created: NaiveDateTime,
) -> Vec<ReplacementGroup> {
    let table = if block.value().name() == "table" {
        Some(block)
    } else {
        first_in(block, "table")
    };
    let Some(table) = table else {
        return Vec::new();
    };

    let caption = first_in(table, "caption").map(text_of).unwrap_or_default();
    let names: Vec<String> = caption
        .strip_prefix(GROUP_PREFIX)
        .unwrap_or(&caption)
        .trim()
        .split(", ")
        .map(normalize_group_code)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Vec::new();
    }

    let items = Arc::new(extract_items(table, fixed_created, fallback_created));

    names
        .into_iter()
        .map(|group| ReplacementGroup {
            group,
            replacements: Arc::clone(&items),
        })
        .collect()
}

/// Body rows of one substitution table, header row excluded.
fn extract_items(
    table: ElementRef<'_>,
    fixed_created: Option<NaiveDateTime>,
    fallback_created: NaiveDateTime,
) -> Vec<ReplacementItem> {
    all_in(table, "tr")
        .into_iter()
        .skip(1)
        .filter_map(|row| extract_item(row, fixed_created, fallback_created))
        .collect()
}

fn extract_item(
    row: ElementRef<'_>,
    fixed_created: Option<NaiveDateTime>,
    fallback_created: NaiveDateTime,
) -> Option<ReplacementItem> {
    let cells = all_in(row, "td");
    if cells.len() < 3 {
        return None;
    }

    let num: u8 = text_of(cells[0]).parse().unwrap_or(0);
    let old = split_lesson_text(&text_of(cells[1]));
    let new = split_lesson_text(&text_of(cells[2]));

    let created = fixed_created.unwrap_or_else(|| {
        cells
            .get(3)
            .and_then(|c| find_datetime(&text_of(*c)))
            .unwrap_or(fallback_created)
    });

    Some(ReplacementItem {
        num,
        old_lesson: ReplacementLesson {
            name: old.name,
            teacher: old.teacher,
        },
        new_lesson: ReplacementLesson {
            name: new.name,
            teacher: new.teacher,
        },
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::text::ABSENT;
    use pretty_assertions::assert_eq;

    const BULLETIN_HTML: &str = r#"
        <html><body><div class="content">
            <h2>Изменения в расписании</h2>
            <h3>Замены на 05.02.2024</h3>
            <div class="table-responsive">
                <table>
                    <caption>Группа А-11, А-12</caption>
                    <tr><th>№</th><th>Вместо</th><th>Замена</th><th>Добавлено</th></tr>
                    <tr>
                        <td>2</td>
                        <td>Математика Иванов И.И.</td>
                        <td>Физика Петров П.П.</td>
                        <td>04.02.2024 18:30:00</td>
                    </tr>
                    <tr>
                        <td>3</td>
                        <td>Самостоятельная работа</td>
                        <td>Химия Сидорова С.С.</td>
                        <td>04.02.2024 18:31:12</td>
                    </tr>
                </table>
            </div>
            <h3>Замены на 06.02.2024</h3>
            <div class="table-responsive">
                <table>
                    <caption>Группа О-21</caption>
                    <tr><th>№</th><th>Вместо</th><th>Замена</th><th>Добавлено</th></tr>
                    <tr>
                        <td>1</td>
                        <td>История Козлова К.К.</td>
                        <td>Обществознание Козлова К.К.</td>
                        <td>не указано</td>
                    </tr>
                </table>
            </div>
        </div></body></html>
    "#;

    #[test]
    fn bulletin_splits_into_dated_days() {
        let doc = Html::parse_document(BULLETIN_HTML);
        let days = extract_replacements(&doc).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 2, 6).unwrap());
    }

    #[test]
    fn multi_group_caption_shares_one_item_sequence() {
        let doc = Html::parse_document(BULLETIN_HTML);
        let days = extract_replacements(&doc).unwrap();
        let groups = &days[0].groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group, "А-11");
        assert_eq!(groups[1].group, "А-12");
        assert!(Arc::ptr_eq(&groups[0].replacements, &groups[1].replacements));
        assert_eq!(groups[0].replacements.len(), 2);
    }

    #[test]
    fn rows_parse_lessons_and_timestamps() {
        let doc = Html::parse_document(BULLETIN_HTML);
        let days = extract_replacements(&doc).unwrap();
        let item = &days[0].groups[0].replacements[0];
        assert_eq!(item.num, 2);
        assert_eq!(item.old_lesson.name, "Математика");
        assert_eq!(item.old_lesson.teacher, "Иванов И.И.");
        assert_eq!(item.new_lesson.name, "Физика");
        assert_eq!(item.new_lesson.teacher, "Петров П.П.");
        assert_eq!(
            item.created,
            NaiveDate::from_ymd_opt(2024, 2, 4)
                .unwrap()
                .and_hms_opt(18, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn teacherless_old_lesson_gets_absent_sentinel() {
        let doc = Html::parse_document(BULLETIN_HTML);
        let days = extract_replacements(&doc).unwrap();
        let item = &days[0].groups[0].replacements[1];
        assert_eq!(item.old_lesson.name, "Самостоятельная работа");
        assert_eq!(item.old_lesson.teacher, ABSENT);
    }

    #[test]
    fn malformed_timestamp_falls_back_to_day_midnight() {
        let doc = Html::parse_document(BULLETIN_HTML);
        let days = extract_replacements(&doc).unwrap();
        let item = &days[1].groups[0].replacements[0];
        assert_eq!(
            item.created,
            NaiveDate::from_ymd_opt(2024, 2, 6)
                .unwrap()
                .and_time(NaiveTime::MIN)
        );
    }

    #[test]
    fn group_codes_in_captions_are_normalized() {
        let doc = Html::parse_document(BULLETIN_HTML);
        let days = extract_replacements(&doc).unwrap();
        assert_eq!(days[1].groups[0].group, "0-21");
    }

    #[test]
    fn dateless_header_is_fatal() {
        let html = r#"
            <div class="content">
                <h2>Изменения в расписании</h2>
                <h3>Замены на завтра</h3>
            </div>
        "#;
        let doc = Html::parse_document(html);
        let err = extract_replacements(&doc).unwrap_err();
        assert_eq!(err.code, ErrorCode::DateNotFound);
    }

    #[test]
    fn preamble_blocks_before_first_header_are_ignored() {
        let html = r#"
            <div class="content">
                <h2>Изменения в расписании</h2>
                <div><table><caption>Группа А-11</caption>
                    <tr><th>№</th></tr><tr><td>1</td><td>a</td><td>b</td></tr>
                </table></div>
                <h3>Замены на 05.02.2024</h3>
            </div>
        "#;
        let doc = Html::parse_document(html);
        let days = extract_replacements(&doc).unwrap();
        assert_eq!(days.len(), 1);
        assert!(days[0].groups.is_empty());
    }

    #[test]
    fn printable_page_uses_supplied_date() {
        let html = r#"
            <html><body>
                <h3>Замены на 1 марта</h3>
                <table>
                    <caption>Группа А-11</caption>
                    <tr><th>№</th><th>Вместо</th><th>Замена</th></tr>
                    <tr><td>4</td><td>Математика Иванов И.И.</td><td>Физика Петров П.П.</td></tr>
                </table>
                <table>
                    <caption>Группа О-31, О-32</caption>
                    <tr><th>№</th><th>Вместо</th><th>Замена</th></tr>
                    <tr><td>1</td><td>Право Смирнов С.С.</td><td>Экономика Смирнов С.С.</td></tr>
                </table>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let groups = extract_replacements_on(&doc, date);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].group, "А-11");
        assert_eq!(groups[1].group, "0-31");
        assert_eq!(groups[2].group, "0-32");
        assert!(Arc::ptr_eq(&groups[1].replacements, &groups[2].replacements));
        assert_eq!(groups[0].replacements[0].created, date.and_time(NaiveTime::MIN));
    }
}
