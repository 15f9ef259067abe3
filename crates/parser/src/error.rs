// ABOUTME: Error types for the mpt parser including ErrorCode enum and ParseError struct.
// ABOUTME: Categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of parse failures.
///
/// The three page-shape codes (`UnknownWeek`, `DateNotFound`,
/// `SpecialtyNotFound`) are the only fatal extraction conditions; every other
/// missing field degrades to a sentinel instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    /// The current-week badge matched neither phase label.
    UnknownWeek,
    /// A bulletin header block carried no recognizable date.
    DateNotFound,
    /// No directory entry matched a fuzzy specialty query.
    SpecialtyNotFound,
    Extract,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::UnknownWeek => "unknown week label",
            ErrorCode::DateNotFound => "date not found",
            ErrorCode::SpecialtyNotFound => "specialty not found",
            ErrorCode::Extract => "extraction error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for parse operations.
#[derive(Debug, thiserror::Error)]
pub struct ParseError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mpt: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ParseError {
    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::InvalidUrl,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Fetch,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Timeout,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an UnknownWeek error.
    pub fn unknown_week(op: impl Into<String>, label: impl fmt::Display) -> Self {
        Self {
            code: ErrorCode::UnknownWeek,
            url: String::new(),
            op: op.into(),
            source: Some(anyhow::anyhow!(
                "unrecognized week label: {:?}",
                label.to_string()
            )),
        }
    }

    /// Create a DateNotFound error.
    pub fn date_not_found(op: impl Into<String>, header: impl fmt::Display) -> Self {
        Self {
            code: ErrorCode::DateNotFound,
            url: String::new(),
            op: op.into(),
            source: Some(anyhow::anyhow!(
                "no date in bulletin header: {:?}",
                header.to_string()
            )),
        }
    }

    /// Create a SpecialtyNotFound error.
    pub fn specialty_not_found(op: impl Into<String>, query: impl fmt::Display) -> Self {
        Self {
            code: ErrorCode::SpecialtyNotFound,
            url: String::new(),
            op: op.into(),
            source: Some(anyhow::anyhow!(
                "no specialty matching {:?}",
                query.to_string()
            )),
        }
    }

    /// Create an Extract error.
    pub fn extract(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code: ErrorCode::Extract,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this error means the page's shape drifted too far to
    /// keep parsing (one of the three fatal extraction conditions).
    pub fn is_page_shape(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnknownWeek | ErrorCode::DateNotFound | ErrorCode::SpecialtyNotFound
        )
    }
}
