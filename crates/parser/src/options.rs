// ABOUTME: Configuration options for the mpt parser client and its fluent builder.
// ABOUTME: Host, timeout, user agent, extra headers and an optional preconfigured HTTP client.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::Client;

/// Default publisher host.
pub const DEFAULT_BASE_URL: &str = "https://mpt.ru";

/// Configuration options for the [`Client`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Origin the logical page keys resolve against.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub http_client: Option<reqwest::Client>,
    /// Extra headers attached to every request.
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "mpt-parser/0.1".to_string(),
            http_client: None,
            headers: HashMap::new(),
        }
    }
}

/// Builder for constructing [`Client`] instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Override the publisher origin (useful for mirrors and tests).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        self.opts.base_url = base;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let b = ClientBuilder::new().base_url("http://127.0.0.1:9000/");
        assert_eq!(b.opts.base_url, "http://127.0.0.1:9000");
    }
}
