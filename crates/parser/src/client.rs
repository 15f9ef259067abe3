// ABOUTME: The main Client struct: one async entry point per page kind.
// ABOUTME: Fetches a page, decodes it, and hands the parsed document to the matching extractor.

use chrono::NaiveDate;
use futures::stream::{self, Stream};
use scraper::Html;

use crate::error::ParseError;
use crate::extractors::{replacements, schedule, specialties, teachers};
use crate::models::{
    ReplacementDay, ReplacementGroup, Specialty, SpecialtyEntry, SpecialtySite, Teacher, Week,
};
use crate::options::{ClientBuilder, Options};
use crate::resource::{fetch, FetchOptions, Page};

/// The main client for fetching and parsing publisher pages.
///
/// Each method performs at most one upstream fetch (the only suspension
/// point), then runs purely in-memory extraction. The client holds no
/// mutable state, so one instance may serve concurrent callers.
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        Self { opts, http_client }
    }

    /// Fetch a page and decode it to an HTML string.
    async fn fetch_html(&self, page: Page) -> Result<String, ParseError> {
        let url = page.url(&self.opts.base_url);
        let fetch_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            parse_non_200: false,
        };
        let result = fetch(&self.http_client, &url, &fetch_opts).await?;
        result.text_utf8(None)
    }

    /// Current phase of the two-week alternation cycle.
    pub async fn current_week(&self) -> Result<Week, ParseError> {
        let html = self.fetch_html(Page::Schedule).await?;
        schedule::extract_week(&Html::parse_document(&html))
    }

    /// Full weekly timetable: every specialty, group, day and lesson.
    pub async fn schedule(&self) -> Result<Vec<Specialty>, ParseError> {
        let html = self.fetch_html(Page::Schedule).await?;
        Ok(schedule::extract_schedule(&Html::parse_document(&html)))
    }

    /// Multi-day replacement bulletin.
    pub async fn replacements(&self) -> Result<Vec<ReplacementDay>, ParseError> {
        let html = self.fetch_html(Page::Replacements).await?;
        replacements::extract_replacements(&Html::parse_document(&html))
    }

    /// Replacements for one calendar date, from the printable page.
    pub async fn replacements_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ReplacementGroup>, ParseError> {
        let html = self.fetch_html(Page::ReplacementsOn(date)).await?;
        Ok(replacements::extract_replacements_on(
            &Html::parse_document(&html),
            date,
        ))
    }

    /// Lazy per-day replacement batches for `[min, max)`.
    ///
    /// One fetch per date, strictly increasing, never overlapping: the next
    /// fetch starts only after the previous day has been yielded. The cursor
    /// advances by exactly one day per step, so the stream always terminates;
    /// `min >= max` yields nothing.
    pub fn replacements_range(
        &self,
        min: NaiveDate,
        max: NaiveDate,
    ) -> impl Stream<Item = Result<ReplacementDay, ParseError>> + '_ {
        stream::try_unfold(min, move |date| async move {
            if date >= max {
                return Ok(None);
            }
            let groups = self.replacements_on(date).await?;
            let next = date.succ_opt().ok_or_else(|| {
                ParseError::extract(
                    "",
                    "ReplacementsRange",
                    Some(anyhow::anyhow!("calendar overflow after {}", date)),
                )
            })?;
            Ok(Some((ReplacementDay { date, groups }, next)))
        })
    }

    /// Specialty directory listing.
    pub async fn specialties(&self) -> Result<Vec<SpecialtyEntry>, ParseError> {
        let html = self.fetch_html(Page::Specialties).await?;
        Ok(specialties::extract_specialties(&Html::parse_document(
            &html,
        )))
    }

    /// Resolves a specialty by fuzzy name (case-insensitive substring) or
    /// exact code, then fetches and parses its micro-site.
    ///
    /// No matching directory entry is one of the fatal page-shape
    /// conditions: the caller asked for something the directory no longer
    /// lists.
    pub async fn specialty_site(&self, query: &str) -> Result<SpecialtySite, ParseError> {
        let entries = self.specialties().await?;

        let needle = query.trim().to_lowercase();
        let entry = entries
            .into_iter()
            .find(|e| e.name.to_lowercase().contains(&needle) || e.code == query.trim())
            .ok_or_else(|| ParseError::specialty_not_found("SpecialtySite", query))?;

        let url = if entry.url.starts_with('/') {
            format!("{}{}", self.opts.base_url, entry.url)
        } else {
            entry.url.clone()
        };

        log::debug!("resolved specialty {:?} to {}", query, url);

        let html = self.fetch_html(Page::SpecialtySite(url)).await?;
        Ok(specialties::extract_specialty_site(
            &entry,
            &Html::parse_document(&html),
            &self.opts.base_url,
        ))
    }

    /// Staff directory.
    pub async fn teachers(&self) -> Result<Vec<Teacher>, ParseError> {
        let html = self.fetch_html(Page::Teachers).await?;
        Ok(teachers::extract_teachers(
            &Html::parse_document(&html),
            &self.opts.base_url,
        ))
    }
}
