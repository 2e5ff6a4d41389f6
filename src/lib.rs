pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod output;
pub mod query;
pub mod retry;
pub mod types;

pub use client::DiscussionClient;
pub use config::{FetchConfig, GitHubConfig, RetryConfig};
pub use error::{FetchError, Result};
pub use filters::filter_answered;
pub use output::write_pretty_json;
pub use types::{Answer, Discussion, Repository};

/// Resolve the API credential: the environment variable, when set, wins over
/// a value passed on the command line.
pub fn resolve_token(env_var: &str, flag: Option<String>) -> Option<String> {
    std::env::var(env_var).ok().or(flag)
}

pub struct DiscussionFetcher {
    client: DiscussionClient,
}

impl DiscussionFetcher {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(token, FetchConfig::default())
    }

    pub fn with_config(token: impl Into<String>, config: FetchConfig) -> Result<Self> {
        Ok(Self {
            client: DiscussionClient::new(token, config)?,
        })
    }

    /// Fetch the first page of discussions in API order, answered or not.
    pub async fn fetch_discussions(&self, repo: &Repository) -> Result<Vec<Discussion>> {
        self.client.fetch_discussions(repo).await
    }

    /// Fetch discussions and keep only those with an accepted answer.
    pub async fn fetch_answered(&self, repo: &Repository) -> Result<Vec<Discussion>> {
        let discussions = self.client.fetch_discussions(repo).await?;
        Ok(filters::filter_answered(discussions))
    }
}

pub struct DiscussionFetcherBuilder {
    token: Option<String>,
    config: FetchConfig,
}

impl DiscussionFetcherBuilder {
    pub fn new() -> Self {
        Self {
            token: None,
            config: FetchConfig::default(),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token_env_var(mut self, var_name: impl Into<String>) -> Self {
        self.config.github.token_env_var = var_name.into();
        self
    }

    pub fn graphql_url(mut self, url: impl Into<String>) -> Self {
        self.config.github.graphql_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.github.user_agent = agent.into();
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.github.timeout_seconds = seconds;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    pub fn initial_delay_ms(mut self, millis: u64) -> Self {
        self.config.retry.initial_delay_ms = millis;
        self
    }

    pub fn build(self) -> Result<DiscussionFetcher> {
        let token = match self.token {
            Some(token) => token,
            None => std::env::var(&self.config.github.token_env_var).map_err(|_| {
                FetchError::AuthError(format!(
                    "{} environment variable not set",
                    self.config.github.token_env_var
                ))
            })?,
        };

        DiscussionFetcher::with_config(token, self.config)
    }
}

impl Default for DiscussionFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
