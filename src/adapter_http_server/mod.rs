use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;

mod handler;
mod middleware;

const DEFAULT_ADDRESS: std::net::IpAddr = std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CACHE_MAX_AGE: u64 = 300;

pub struct Config {
    address: std::net::IpAddr,
    port: u16,
    cache_max_age: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Ok(Self {
            address: crate::with_env_as_or("ADDRESS", DEFAULT_ADDRESS)?,
            port: crate::with_env_as_or("PORT", DEFAULT_PORT)?,
            cache_max_age: crate::with_env_as_or("HTTP_CACHE_MAX_AGE", DEFAULT_CACHE_MAX_AGE)?,
        })
    }

    /// Let intermediaries reuse release responses for the given number of seconds,
    /// zero disables the hint.
    pub fn with_cache_max_age(mut self, seconds: u64) -> Self {
        self.cache_max_age = seconds;
        self
    }

    pub fn build<RR>(self, release_resolver: RR) -> anyhow::Result<Server<RR>>
    where
        RR: crate::domain::prelude::ReleaseResolver + Clone,
    {
        Ok(Server {
            address: std::net::SocketAddr::from((self.address, self.port)),
            state: ServerState {
                release_resolver,
                cache: CachePolicy::from_secs(self.cache_max_age),
            },
        })
    }
}

/// Freshness hint attached to release responses.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CachePolicy {
    max_age: Option<Duration>,
}

impl CachePolicy {
    /// A zero duration disables the hint.
    fn from_secs(seconds: u64) -> Self {
        Self {
            max_age: (seconds > 0).then(|| Duration::from_secs(seconds)),
        }
    }

    fn header_value(&self) -> Option<HeaderValue> {
        let max_age = self.max_age?;
        HeaderValue::from_str(&format!("public, max-age={}", max_age.as_secs())).ok()
    }
}

#[derive(Clone)]
pub(crate) struct ServerState<RR> {
    release_resolver: RR,
    cache: CachePolicy,
}

pub struct Server<RR> {
    address: std::net::SocketAddr,
    state: ServerState<RR>,
}

impl<RR> Server<RR>
where
    RR: crate::domain::prelude::ReleaseResolver + Clone,
{
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.address)
            .await
            .with_context(|| format!("unable to bind {}", self.address))?;
        self.serve(listener).await
    }

    pub async fn serve(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        let app = handler::build::<RR>()
            .layer(middleware::tracing::layer())
            .with_state(self.state);
        tracing::info!(address = ?listener.local_addr().ok(), "starting server");
        axum::serve(listener, app).await.context("server crashed")
    }
}
