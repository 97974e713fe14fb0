use std::borrow::Cow;

use anyhow::Context;

pub mod adapter_github;
pub mod adapter_http_server;
pub mod domain;
pub mod tracing;

fn with_env_as_or<T>(name: &str, default_value: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    <T as std::str::FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(with_env_as_opt(name)?.unwrap_or(default_value))
}

fn with_env_as_opt<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    <T as std::str::FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    parse_value(name, maybe_env(name))
}

fn parse_value<T>(name: &str, value: Option<String>) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    <T as std::str::FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(value) = non_empty(value) else {
        return Ok(None);
    };
    value
        .parse::<T>()
        .map(Some)
        .with_context(|| format!("unable to parse value from {name:?}"))
}

fn with_env_or(name: &str, default_value: &'static str) -> Cow<'static, str> {
    maybe_env(name)
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed(default_value))
}

fn maybe_env(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

/// Blank values count as unset.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

pub struct Config {
    pub github: adapter_github::Config,
    pub resolver: domain::Config,
    pub http_server: adapter_http_server::Config,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            github: adapter_github::Config::from_env()?,
            resolver: domain::Config::from_env()?,
            http_server: adapter_http_server::Config::from_env()?,
        })
    }

    pub fn build(self) -> anyhow::Result<Application> {
        let github = self.github.build()?;
        let repository = github.repository().to_owned();
        let resolver = self
            .resolver
            .builder()
            .with_source(github)
            .with_repository(repository)
            .build()?;
        let server = self.http_server.build(resolver)?;
        Ok(Application { server })
    }
}

pub struct Application {
    server: adapter_http_server::Server<domain::ReleaseResolverService<adapter_github::Client>>,
}

impl Application {
    pub async fn run(self) -> anyhow::Result<()> {
        self.server.run().await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        self.server.serve(listener).await
    }
}
