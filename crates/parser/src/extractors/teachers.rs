// ABOUTME: Extractor for the staff directory, recovering full names from inconsistent markup.
// ABOUTME: Ordered fallback chain: alt text, forward siblings, grandparent run-on boundary.

//! Staff directory extraction.
//!
//! Every entry hangs off a photo element, but the full name next to it has
//! moved between page revisions: sometimes it is the image's alt text,
//! sometimes a sibling node, sometimes glued to surrounding text inside the
//! card container. Recovery is an ordered list of strategies, applied
//! first-success and never interleaved; each one is independently testable.
//!
//! A photo whose name cannot be recovered by any strategy is skipped —
//! tolerated data loss, not a failure.

use scraper::{ElementRef, Html};

use crate::dom::{all, attr_of, following_sibling_texts, grandparent, text_of};
use crate::models::Teacher;
use crate::text::{normalize_whitespace, unnbsp};

/// Structural marker of a staff photo.
const STAFF_PHOTO: &str = "div.sotrudnik img";

/// Parses the staff directory into teacher records, one per recoverable
/// photo element. Order follows the document; the page promises none.
pub fn extract_teachers(doc: &Html, base_url: &str) -> Vec<Teacher> {
    all(doc, STAFF_PHOTO)
        .into_iter()
        .filter_map(|img| extract_teacher(doc, img, base_url))
        .collect()
}

fn extract_teacher(doc: &Html, img: ElementRef<'_>, base_url: &str) -> Option<Teacher> {
    let candidate = alt_candidate(img)
        .or_else(|| sibling_candidate(img))
        .or_else(|| container_candidate(img));

    let Some(full_name) = candidate else {
        log::debug!("skipping staff photo without a recoverable name");
        return None;
    };

    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let surname = tokens[0].to_string();
    let name = tokens[1].to_string();
    let patronymic = tokens[2..].join(" ");

    let photo = attr_of(img, "src")
        .map(|src| {
            if src.starts_with('/') {
                format!("{}{}", base_url.trim_end_matches('/'), src)
            } else {
                src
            }
        })
        .unwrap_or_default();

    Some(Teacher {
        surname,
        name,
        patronymic,
        photo,
        link: profile_link(doc, &full_name),
    })
}

/// A candidate is valid iff it tokenizes to 2–4 whitespace-separated parts:
/// surname, given name, and an optional one-or-two-token patronymic/suffix.
fn is_valid_candidate(s: &str) -> bool {
    (2..=4).contains(&s.split_whitespace().count())
}

/// Strategy 1: the photo's own alt text.
fn alt_candidate(img: ElementRef<'_>) -> Option<String> {
    let alt = normalize_whitespace(&unnbsp(&attr_of(img, "alt")?));
    is_valid_candidate(&alt).then_some(alt)
}

/// Strategy 2: walk forward through sibling nodes until a valid candidate.
fn sibling_candidate(img: ElementRef<'_>) -> Option<String> {
    following_sibling_texts(img)
        .into_iter()
        .find(|text| is_valid_candidate(text))
}

/// Strategy 3: the grandparent container's full text, cut at the first
/// position where a lowercase Cyrillic letter runs straight into an
/// uppercase one - the most likely start of a "surrounding text + full
/// name" concatenation.
fn container_candidate(img: ElementRef<'_>) -> Option<String> {
    let text = text_of(grandparent(img)?);
    let boundary = runon_boundary(&text)?;
    let candidate = text[boundary..].trim().to_string();
    is_valid_candidate(&candidate).then_some(candidate)
}

/// Byte offset of the first uppercase Cyrillic letter immediately preceded
/// by a lowercase Cyrillic letter.
fn runon_boundary(text: &str) -> Option<usize> {
    let mut prev: Option<char> = None;
    for (idx, ch) in text.char_indices() {
        if let Some(p) = prev {
            if is_lower_cyrillic(p) && is_upper_cyrillic(ch) {
                return Some(idx);
            }
        }
        prev = Some(ch);
    }
    None
}

fn is_lower_cyrillic(c: char) -> bool {
    ('а'..='я').contains(&c) || c == 'ё'
}

fn is_upper_cyrillic(c: char) -> bool {
    ('А'..='Я').contains(&c) || c == 'Ё'
}

/// Opportunistic profile link: the first anchor whose text contains the
/// recovered full name.
fn profile_link(doc: &Html, full_name: &str) -> Option<String> {
    all(doc, "a")
        .into_iter()
        .find(|a| text_of(*a).contains(full_name))
        .and_then(|a| attr_of(a, "href"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STAFF_HTML: &str = r#"
        <html><body>
            <div class="card">
                <div class="sotrudnik">
                    <img src="/upload/ivanov.jpg" alt="Иванов Иван Иванович">
                </div>
            </div>
            <div class="card">
                <div class="sotrudnik">
                    <img src="/upload/petrova.jpg" alt="Фото сотрудника учебного отдела колледжа">
                    <b>Петрова&nbsp;Анна Сергеевна</b>
                </div>
            </div>
            <div class="card">
                Преподаватель высшей категорииСидорова Мария Петровна
                <div class="sotrudnik">
                    <img src="https://cdn.mpt.ru/sidorova.jpg" alt="">
                </div>
            </div>
            <div class="card">
                <div class="sotrudnik">
                    <img src="/upload/nameless.jpg" alt="фото">
                </div>
            </div>
            <a href="/sotrudniki/ivanov/">Страница: Иванов Иван Иванович</a>
        </body></html>
    "#;

    fn parse() -> Html {
        Html::parse_document(STAFF_HTML)
    }

    #[test]
    fn alt_text_with_three_tokens_splits_positionally() {
        let teachers = extract_teachers(&parse(), "https://mpt.ru");
        let t = teachers
            .iter()
            .find(|t| t.surname == "Иванов")
            .expect("Иванов should be extracted");
        assert_eq!(t.name, "Иван");
        assert_eq!(t.patronymic, "Иванович");
        assert_eq!(t.photo, "https://mpt.ru/upload/ivanov.jpg");
    }

    #[test]
    fn invalid_alt_falls_back_to_siblings() {
        let teachers = extract_teachers(&parse(), "https://mpt.ru");
        let t = teachers
            .iter()
            .find(|t| t.surname == "Петрова")
            .expect("Петрова should be extracted");
        assert_eq!(t.name, "Анна");
        assert_eq!(t.patronymic, "Сергеевна");
    }

    #[test]
    fn container_runon_boundary_recovers_name() {
        let teachers = extract_teachers(&parse(), "https://mpt.ru");
        let t = teachers
            .iter()
            .find(|t| t.surname == "Сидорова")
            .expect("Сидорова should be extracted");
        assert_eq!(t.name, "Мария");
        assert_eq!(t.patronymic, "Петровна");
        // Already absolute, left untouched.
        assert_eq!(t.photo, "https://cdn.mpt.ru/sidorova.jpg");
    }

    #[test]
    fn unrecoverable_photo_is_skipped() {
        let teachers = extract_teachers(&parse(), "https://mpt.ru");
        assert_eq!(teachers.len(), 3);
        assert!(teachers.iter().all(|t| t.photo != "https://mpt.ru/upload/nameless.jpg"));
    }

    #[test]
    fn profile_link_is_resolved_opportunistically() {
        let teachers = extract_teachers(&parse(), "https://mpt.ru");
        let ivanov = teachers.iter().find(|t| t.surname == "Иванов").unwrap();
        assert_eq!(ivanov.link.as_deref(), Some("/sotrudniki/ivanov/"));
        let petrova = teachers.iter().find(|t| t.surname == "Петрова").unwrap();
        assert_eq!(petrova.link, None);
    }

    #[test]
    fn two_token_name_has_empty_patronymic() {
        let html = r#"
            <div class="sotrudnik"><img src="/x.jpg" alt="Козлова Ксения"></div>
        "#;
        let teachers = extract_teachers(&Html::parse_document(html), "https://mpt.ru");
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].surname, "Козлова");
        assert_eq!(teachers[0].name, "Ксения");
        assert_eq!(teachers[0].patronymic, "");
    }

    #[test]
    fn strategies_apply_first_success_without_interleaving() {
        // Valid alt must win even when a sibling also holds a valid name.
        let html = r#"
            <div class="sotrudnik">
                <img src="/x.jpg" alt="Иванов Иван Иванович">
                <b>Петров Петр Петрович</b>
            </div>
        "#;
        let teachers = extract_teachers(&Html::parse_document(html), "https://mpt.ru");
        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].surname, "Иванов");
    }

    #[test]
    fn boundary_scan_finds_lower_upper_junction() {
        assert_eq!(runon_boundary("категорииИванов"), Some("категории".len()));
        assert_eq!(runon_boundary("Иванов Иван"), None);
        assert_eq!(runon_boundary(""), None);
    }
}
