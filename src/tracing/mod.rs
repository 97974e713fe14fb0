use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Console subscriber, filtered through `TRACING_LEVEL`.
pub struct Config {
    color: bool,
    target: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            color: crate::with_env_as_or("TRACING_CONSOLE_COLOR", true)?,
            target: crate::with_env_as_or("TRACING_CONSOLE_TARGET", false)?,
        })
    }

    pub fn install(self) -> anyhow::Result<()> {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(self.color)
                    .with_target(self.target),
            )
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .with_env_var("TRACING_LEVEL")
                    .from_env_lossy(),
            )
            .try_init()?;
        Ok(())
    }
}
