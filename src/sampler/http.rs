//! HTTP dump source.

use std::time::Duration;

use reqwest::blocking::Client;

use super::{DumpSource, SampleError};

/// Upper bound for a whole request, independent of the refresh interval.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Fetches dumps with a blocking GET against a fixed URL.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self, SampleError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SampleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl DumpSource for HttpSource {
    fn fetch(&mut self) -> Result<String, SampleError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| SampleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SampleError::Status(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| SampleError::Transport(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
