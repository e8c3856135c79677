use std::{io::Read, time::Duration};

use tracing::debug;

use crate::error::{Error, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const SITE_URL: &str = "https://www.bilibili.com";

/// Per-request headers, built fresh for every call
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestHeaders<'a> {
    /// Raw `Cookie` header value
    pub cookie: Option<&'a str>,
    /// Defaults to the site root
    pub referer: Option<&'a str>,
}

/// An opened response body, not read yet
pub struct Body {
    /// As reported by the server, if at all
    pub content_length: Option<u64>,
    pub reader: Box<dyn Read + Send>,
}

/// Blocking HTTP GET, the only verb the platform API needs
pub trait HttpClient: Send + Sync {
    /// Fetch the whole body as text
    fn get_text(&self, url: &str, headers: RequestHeaders<'_>) -> Result<String>;

    /// Open the body for streaming
    fn open(&self, url: &str, headers: RequestHeaders<'_>) -> Result<Body>;
}

pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(USER_AGENT)
            .timeout_connect(Duration::from_secs(15))
            .timeout_read(Duration::from_secs(30))
            .build();

        Self { agent }
    }

    fn call(&self, url: &str, headers: RequestHeaders<'_>, api: bool) -> Result<ureq::Response> {
        let mut request = self
            .agent
            .get(url)
            .set("Referer", headers.referer.unwrap_or(SITE_URL));

        if api {
            request = request.set("Origin", SITE_URL);
        } else {
            // Byte counts must match what lands on disk
            request = request.set("Accept-Encoding", "identity");
        }
        if let Some(cookie) = headers.cookie.filter(|c| !c.is_empty()) {
            request = request.set("Cookie", cookie);
        }

        debug!("GET {url}");
        request.call().map_err(|err| {
            let reason = match err {
                ureq::Error::Status(code, response) => {
                    format!("HTTP status {code} {}", response.status_text())
                }
                ureq::Error::Transport(transport) => transport.to_string(),
            };
            Error::Transport {
                url: url.to_owned(),
                reason,
            }
        })
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn get_text(&self, url: &str, headers: RequestHeaders<'_>) -> Result<String> {
        self.call(url, headers, true)?
            .into_string()
            .map_err(|err| Error::Transport {
                url: url.to_owned(),
                reason: format!("could not read body: {err}"),
            })
    }

    fn open(&self, url: &str, headers: RequestHeaders<'_>) -> Result<Body> {
        let response = self.call(url, headers, false)?;

        // A decoded body is longer than its announced length
        let encoded = response
            .header("Content-Encoding")
            .is_some_and(|encoding| !encoding.trim().eq_ignore_ascii_case("identity"));
        let content_length = response
            .header("Content-Length")
            .filter(|_| !encoded)
            .and_then(|len| len.trim().parse().ok());
        debug!("Content-Length: {content_length:?}");

        Ok(Body {
            content_length,
            reader: response.into_reader(),
        })
    }
}
