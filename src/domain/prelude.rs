use super::entity::*;

/// Abstracts where releases come from (e.g., GitHub Releases).
pub trait ReleaseSource: Send + Sync + 'static {
    /// Fetch the latest published release.
    fn latest_release(&self) -> impl Future<Output = anyhow::Result<PublishedRelease>> + Send;
}

#[cfg(test)]
mockall::mock! {
    pub ReleaseSource {}

    impl Clone for ReleaseSource {
        fn clone(&self) -> Self;
    }

    impl ReleaseSource for ReleaseSource {
        fn latest_release(&self) -> impl Future<Output = anyhow::Result<PublishedRelease>> + Send;
    }
}

/// Resolves the release to advertise on the website.
///
/// Implementations never fail: when the upstream can't be reached or understood,
/// the configured fallback is returned instead.
pub trait ReleaseResolver: Send + Sync + 'static {
    /// Resolve the latest release for the given platform, or the default one.
    fn resolve_latest_release(
        &self,
        platform: Option<Platform>,
    ) -> impl Future<Output = ReleaseInfo> + Send;

    /// Page listing the releases, used when no installer can be pointed at.
    fn release_page_url(&self) -> &str;
}

#[cfg(test)]
mockall::mock! {
    pub ReleaseResolverService {}

    impl Clone for ReleaseResolverService {
        fn clone(&self) -> Self;
    }

    impl ReleaseResolver for ReleaseResolverService {
        fn resolve_latest_release(
            &self,
            platform: Option<Platform>,
        ) -> impl Future<Output = ReleaseInfo> + Send;

        fn release_page_url(&self) -> &str;
    }
}
