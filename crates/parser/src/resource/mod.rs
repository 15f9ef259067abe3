// ABOUTME: Fetch collaborator: logical page keys, HTTP requests, charset decoding.
// ABOUTME: Attaches the per-request anti-throttling session cookie the publisher expects.

//! Resource handling: turning a logical page key into a decoded HTML string.
//!
//! The extractors never issue requests themselves; they receive a parsed
//! document and stay pure. Everything transport-shaped lives here: URL
//! construction, the anti-throttling cookie, response limits and charset
//! decoding (older page revisions still serve windows-1251).

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use chrono::NaiveDate;

use crate::error::ParseError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Logical page keys the parser understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Weekly schedule for every specialty and group.
    Schedule,
    /// Multi-day replacement bulletin.
    Replacements,
    /// Printable replacements for a single calendar date.
    ReplacementsOn(NaiveDate),
    /// Specialty directory listing.
    Specialties,
    /// A specialty micro-site, addressed by its resolved URL.
    SpecialtySite(String),
    /// Staff directory.
    Teachers,
}

impl Page {
    /// Resolves the page key to a concrete URL against `base`.
    pub fn url(&self, base: &str) -> String {
        match self {
            Page::Schedule => format!("{}/studentu/raspisanie-zanyatiy/", base),
            Page::Replacements => format!("{}/studentu/izmeneniya-v-raspisanii/", base),
            Page::ReplacementsOn(date) => format!(
                "{}/rasp-management/print-replaces.php?date={}",
                base,
                date.format("%Y-%m-%d")
            ),
            Page::Specialties => format!("{}/studentu/spetsialnosti/", base),
            Page::SpecialtySite(url) => url.clone(),
            Page::Teachers => format!("{}/sotrudniki/", base),
        }
    }
}

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub parse_non_200: bool,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using charset hints from content-type header.
    pub fn text_utf8(&self, content_type_hint: Option<&str>) -> Result<String, ParseError> {
        let ct = content_type_hint.or(self.content_type.as_deref());
        Ok(decode_body(&self.body, ct))
    }
}

/// Per-request session cookie.
///
/// The publisher rejects bursts of anonymous requests from one IP; a fresh
/// PHPSESSID per request keeps it answering.
fn session_cookie() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("PHPSESSID=mpt_parser_{:x}", nanos)
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ParseError> {
    if url.is_empty() {
        return Err(ParseError::invalid_url(url, "Fetch", None));
    }

    let parsed_url = url::Url::parse(url).map_err(|e| {
        ParseError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ParseError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    let mut request = client.get(url).header("Cookie", session_cookie());
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    log::debug!("fetching {}", url);

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ParseError::timeout(url, "Fetch", Some(e.into()))
        } else {
            ParseError::fetch(url, "Fetch", Some(e.into()))
        }
    })?;

    let status = response.status();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    if !status.is_success() && !opts.parse_non_200 {
        return Err(ParseError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("unexpected status {}", status)),
        ));
    }

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            ParseError::timeout(url, "Fetch", Some(e.into()))
        } else {
            ParseError::fetch(url, "Fetch", Some(e.into()))
        }
    })?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ParseError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!(
                "content length {} exceeds limit {}",
                body.len(),
                MAX_CONTENT_LENGTH
            )),
        ));
    }

    Ok(FetchResult {
        status: status.as_u16(),
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_urls_resolve_against_base() {
        let base = "https://mpt.ru";
        assert_eq!(
            Page::Schedule.url(base),
            "https://mpt.ru/studentu/raspisanie-zanyatiy/"
        );
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            Page::ReplacementsOn(date).url(base),
            "https://mpt.ru/rasp-management/print-replaces.php?date=2024-01-02"
        );
        assert_eq!(
            Page::SpecialtySite("https://mpt.ru/sites/09-02-07/".to_string()).url(base),
            "https://mpt.ru/sites/09-02-07/"
        );
    }

    #[test]
    fn session_cookie_has_expected_shape() {
        let cookie = session_cookie();
        assert!(cookie.starts_with("PHPSESSID=mpt_parser_"));
    }

    #[test]
    fn charset_parsed_from_content_type() {
        assert_eq!(
            extract_charset("text/html; charset=windows-1251"),
            Some("windows-1251".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"UTF-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn decodes_windows_1251_body() {
        // "Среда" in windows-1251.
        let body = [0xD1, 0xF0, 0xE5, 0xE4, 0xE0];
        let decoded = decode_body(&body, Some("text/html; charset=windows-1251"));
        assert_eq!(decoded, "Среда");
    }

    #[test]
    fn detection_handles_missing_charset() {
        let decoded = decode_body("Привет".as_bytes(), None);
        assert_eq!(decoded, "Привет");
    }
}
