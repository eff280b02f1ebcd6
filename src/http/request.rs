use std::time::Duration;

use serde::Serialize;

use super::method::HttpMethod;
use crate::error::HarnessError;

/// Host every endpoint of the message service hangs off.
pub const DEFAULT_BASE_URI: &str = "https://run.mocky.io/v3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Json,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
        }
    }
}

/// Settings shared by every call in a run. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseConfig {
    pub base_uri: String,
    pub content_type: ContentType,
    /// Upper bound on a single round trip. `None` waits for as long as the
    /// HTTP client allows.
    pub deadline: Option<Duration>,
}

impl BaseConfig {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            content_type: ContentType::Json,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Derive the per-call configuration for one endpoint path.
    pub fn endpoint(&self, base_path: impl Into<String>) -> RequestConfig {
        RequestConfig {
            base_uri: self.base_uri.clone(),
            content_type: self.content_type,
            base_path: base_path.into(),
            query_param: None,
        }
    }
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URI)
    }
}

/// How to reach one endpoint variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub base_uri: String,
    pub content_type: ContentType,
    pub base_path: String,
    pub query_param: Option<String>,
}

impl RequestConfig {
    pub fn with_query(mut self, param: impl Into<String>) -> Self {
        self.query_param = Some(param.into());
        self
    }

    /// Join base URI and path with a single `/` and append the query
    /// parameter as a bare key (`?1005`).
    pub fn url(&self) -> Result<reqwest::Url, HarnessError> {
        let base = self.base_uri.trim_end_matches('/');
        let path = self.base_path.trim_start_matches('/');
        let raw = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        let mut url = reqwest::Url::parse(&raw).map_err(|e| HarnessError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if let Some(param) = &self.query_param {
            url.query_pairs_mut().append_key_only(param);
        }

        Ok(url)
    }
}

/// One fully described HTTP call: POST with a JSON body or GET with a query.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub method: HttpMethod,
    pub config: RequestConfig,
    pub body: Option<String>,
    /// Overrides [`BaseConfig::deadline`] for this call only.
    pub deadline: Option<Duration>,
}

impl RequestInput {
    pub fn post_json<T: Serialize>(config: RequestConfig, payload: &T) -> Result<Self, HarnessError> {
        Ok(Self {
            method: HttpMethod::Post,
            config,
            body: Some(serde_json::to_string(payload)?),
            deadline: None,
        })
    }

    pub fn get(config: RequestConfig) -> Self {
        Self {
            method: HttpMethod::Get,
            config,
            body: None,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
