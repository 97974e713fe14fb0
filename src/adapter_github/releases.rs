impl crate::domain::prelude::ReleaseSource for super::Client {
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint), err(Debug))]
    async fn latest_release(&self) -> anyhow::Result<crate::domain::entity::PublishedRelease> {
        let release = self.get_latest_release().await?;
        tracing::debug!(
            tag_name = %release.tag_name,
            assets = release.assets.len(),
            "latest release fetched"
        );
        Ok(release.into())
    }
}
