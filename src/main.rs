#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tokencentric_releases::tracing::Config::from_env()?.install()?;

    let config = tokencentric_releases::Config::from_env()?;
    let app = config.build()?;
    app.run().await
}
