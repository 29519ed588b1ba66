use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_ENCODING;
use reqwest::Client;

use crate::app::{FedicatError, Result};
use crate::config::HttpConfig;
use crate::fetcher::{FetchResponse, Fetcher};

pub struct HttpFetcher {
    client: Client,
    trace: bool,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            trace: config.trace,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        if self.trace {
            tracing::debug!("GET {}", url);
        }

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        if self.trace {
            tracing::debug!("{} {}", response.status(), url);
            for (name, value) in &headers {
                tracing::debug!("  {}: {}", name, value);
            }
        }

        // The client strips this header for encodings it decoded itself.
        if let Some(encoding) = headers.get(CONTENT_ENCODING.as_str()) {
            if !encoding.eq_ignore_ascii_case("identity") {
                return Err(FedicatError::UnexpectedEncoding(encoding.clone()));
            }
        }

        let body = response.bytes().await?.to_vec();

        Ok(FetchResponse {
            url: url.to_string(),
            body,
            headers,
        })
    }
}
