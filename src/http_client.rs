use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument};

use crate::config::FetchConfig;
use crate::error::{Result, ScraperError};

/// Source of page bodies; the pipeline only ever needs GET-as-text.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking reqwest client carrying the identifying header and timeout.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            ScraperError::Config(format!("Invalid user agent '{}': {}", config.user_agent, e))
        })?;
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
