use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use std::time::Duration;

use crate::config::{FetchConfig, GitHubConfig, RetryConfig};
use crate::error::{FetchError, Result};
use crate::query;
use crate::retry::send_with_retry;
use crate::types::{Discussion, Repository};

pub struct DiscussionClient {
    http: reqwest::Client,
    token: String,
    github: GitHubConfig,
    retry: RetryConfig,
}

impl DiscussionClient {
    pub fn new(token: impl Into<String>, config: FetchConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.github.timeout_seconds);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            token: token.into(),
            github: config.github,
            retry: config.retry,
        })
    }

    pub fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .map_err(|e| FetchError::ConfigError(format!("Invalid token: {}", e)))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.github.user_agent)
                .map_err(|e| FetchError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_str(&self.github.api_version)
                .map_err(|e| FetchError::ConfigError(format!("Invalid API version: {}", e)))?,
        );
        Ok(headers)
    }

    /// POST the discussions query and return the first page of nodes in API
    /// order. Transient statuses (429 and the retryable 5xx set) are retried
    /// with backoff before the response is classified.
    pub async fn fetch_discussions(&self, repo: &Repository) -> Result<Vec<Discussion>> {
        info!("Fetching discussions for {}", repo.full_name);

        let headers = self.build_headers()?;
        let request_body = query::request_body(repo);

        let response = send_with_retry(
            &self.retry,
            || {
                self.http
                    .post(&self.github.graphql_url)
                    .headers(headers.clone())
                    .json(&request_body)
                    .send()
            },
            |resp: &reqwest::Response| self.retry.should_retry(resp.status().as_u16()),
        )
        .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if status != 200 {
            return Err(FetchError::ApiError { status, body });
        }

        let response_json: serde_json::Value = serde_json::from_str(&body)?;

        // A GraphQL-level failure (bad credential, unknown repository) comes
        // back as HTTP 200 with an `errors` key and no `data`.
        if response_json.get("data").is_none() {
            return Err(FetchError::QueryError { status, body });
        }

        self.parse_discussion_nodes(response_json, repo)
    }

    fn parse_discussion_nodes(
        &self,
        response_json: serde_json::Value,
        repo: &Repository,
    ) -> Result<Vec<Discussion>> {
        let nodes = response_json
            .get("data")
            .and_then(|d| d.get("repository"))
            .and_then(|r| r.get("discussions"))
            .and_then(|d| d.get("nodes"))
            .cloned()
            .ok_or_else(|| {
                FetchError::NotFound(format!("No discussions found in {}", repo.full_name))
            })?;

        let discussions: Vec<Discussion> = serde_json::from_value(nodes)?;
        debug!(
            "Parsed {} discussion nodes from {}",
            discussions.len(),
            repo.full_name
        );

        Ok(discussions)
    }
}
