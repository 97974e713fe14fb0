use std::{borrow::Cow, sync::Arc};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_tracing::TracingMiddleware;

use crate::adapter_github::entity::Repository;

pub(crate) mod entity;
mod method;
mod releases;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_REPOSITORY: &str = "helsky-labs/tokencentric";
const DEFAULT_USER_AGENT: &str = "tokencentric-site";

pub struct Config {
    base_url: Cow<'static, str>,
    repository: Cow<'static, str>,
    user_agent: Cow<'static, str>,
    max_retry: u32,
    timeout: u64,
    token: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            base_url: crate::with_env_or("GITHUB_BASE_URL", DEFAULT_BASE_URL),
            repository: crate::with_env_or("GITHUB_REPOSITORY", DEFAULT_REPOSITORY),
            user_agent: crate::with_env_or("GITHUB_USER_AGENT", DEFAULT_USER_AGENT),
            token: crate::maybe_env("GITHUB_TOKEN"),
            max_retry: crate::with_env_as_or("GITHUB_MAX_RETRY", 0)?,
            timeout: crate::with_env_as_or("GITHUB_TIMEOUT", 20)?,
        })
    }

    /// Point the client to another API host, like GitHub Enterprise.
    pub fn with_base_url(mut self, base_url: impl Into<Cow<'static, str>>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_repository(mut self, repository: impl Into<Cow<'static, str>>) -> Self {
        self.repository = repository.into();
        self
    }

    pub fn build(self) -> anyhow::Result<Client> {
        let repository = Repository::parse(&self.repository)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "Accept",
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = self.token {
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {token}"))?,
            );
        }
        headers.insert("User-Agent", HeaderValue::from_str(&self.user_agent)?);
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(self.timeout))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .build()?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(self.max_retry);
        let inner = reqwest_middleware::ClientBuilder::new(client)
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let base_url = self.base_url.trim_end_matches('/');
        let endpoint = Arc::from(format!(
            "{base_url}/repos/{}/{}/releases/latest",
            repository.owner, repository.name
        ));
        let repository = Arc::from(format!("{}/{}", repository.owner, repository.name));
        Ok(Client {
            endpoint,
            repository,
            inner,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    endpoint: Arc<str>,
    repository: Arc<str>,
    inner: reqwest_middleware::ClientWithMiddleware,
}

impl Client {
    /// Repository the releases are fetched from, as `owner/name`.
    pub fn repository(&self) -> &str {
        &self.repository
    }
}
