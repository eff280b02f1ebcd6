use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::HarnessError;

use super::method::HttpMethod;
use super::request::{BaseConfig, RequestInput};
use super::response::ResponseOutcome;

/// Sends one request per call and captures the response. Holds a single
/// pooled client plus the shared base configuration, so it is cheap to share
/// across concurrently running cases.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    base: Arc<BaseConfig>,
}

impl HttpExecutor {
    pub fn new(base: Arc<BaseConfig>) -> Result<Self, HarnessError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(HarnessError::Transport)?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }

    /// Perform exactly one HTTP call. Transport failures and elapsed
    /// deadlines are returned as errors, never retried.
    pub async fn execute(&self, request: &RequestInput) -> Result<ResponseOutcome, HarnessError> {
        let url = request.config.url()?;
        let deadline = request.deadline.or(self.base.deadline);

        let mut req_builder = self.client.request(request.method.into(), url.clone());
        if let Some(deadline) = deadline {
            req_builder = req_builder.timeout(deadline);
        }
        if request.method == HttpMethod::Post {
            req_builder = req_builder.header(CONTENT_TYPE, request.config.content_type.as_str());
            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.clone());
            }
        }

        debug!(method = %request.method, %url, "sending request");
        let started = Instant::now();
        let response = req_builder
            .send()
            .await
            .map_err(|e| classify(e, deadline))?;

        let status = response.status();
        // hyper only records the phrase when it differs from the canonical one.
        let reason = match response.extensions().get::<hyper::ext::ReasonPhrase>() {
            Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
            None => status.canonical_reason().unwrap_or("Unknown").to_string(),
        };
        let status_line = format!("{:?} {} {reason}", response.version(), status.as_u16());
        let bytes = response.bytes().await.map_err(|e| classify(e, deadline))?;
        let elapsed = started.elapsed().as_millis();
        debug!(
            status = status.as_u16(),
            duration_ms = elapsed,
            size_bytes = bytes.len(),
            "received response"
        );

        Ok(ResponseOutcome {
            status_code: status.as_u16(),
            status_line,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            duration_ms: elapsed,
        })
    }
}

fn classify(err: reqwest::Error, deadline: Option<Duration>) -> HarnessError {
    match deadline {
        Some(after) if err.is_timeout() => HarnessError::Timeout { after },
        _ => HarnessError::Transport(err),
    }
}
