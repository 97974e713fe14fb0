use std::borrow::Cow;
use std::sync::Arc;

use entity::{AssetMatcher, FallbackAsset, FallbackRelease, Platform, PublishedRelease, ReleaseInfo};

pub mod entity;
pub mod prelude;

const DEFAULT_FALLBACK_VERSION: &str = "2.0.0";
const DEFAULT_MAC_FILE_NAME: &str = "Tokencentric-{version}-arm64.dmg";
const DEFAULT_WINDOWS_FILE_NAME: &str = "Tokencentric-Setup-{version}.exe";
const DEFAULT_MAC_SUFFIX: &str = ".dmg";
const DEFAULT_WINDOWS_SUFFIX: &str = ".exe";
const GITHUB_WEB_URL: &str = "https://github.com";
const FALLBACK_ERROR: &str = "unable to fetch the latest release";

pub struct Config {
    fallback_version: Cow<'static, str>,
    mac_file_name: Cow<'static, str>,
    windows_file_name: Cow<'static, str>,
    mac_suffix: Cow<'static, str>,
    windows_suffix: Cow<'static, str>,
    default_platform: Platform,
    error_marker: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fallback_version: Cow::Borrowed(DEFAULT_FALLBACK_VERSION),
            mac_file_name: Cow::Borrowed(DEFAULT_MAC_FILE_NAME),
            windows_file_name: Cow::Borrowed(DEFAULT_WINDOWS_FILE_NAME),
            mac_suffix: Cow::Borrowed(DEFAULT_MAC_SUFFIX),
            windows_suffix: Cow::Borrowed(DEFAULT_WINDOWS_SUFFIX),
            default_platform: Platform::Mac,
            error_marker: true,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            fallback_version: crate::with_env_or("FALLBACK_VERSION", DEFAULT_FALLBACK_VERSION),
            mac_file_name: crate::with_env_or("FALLBACK_MAC_FILE_NAME", DEFAULT_MAC_FILE_NAME),
            windows_file_name: crate::with_env_or(
                "FALLBACK_WINDOWS_FILE_NAME",
                DEFAULT_WINDOWS_FILE_NAME,
            ),
            mac_suffix: crate::with_env_or("ASSET_SUFFIX_MAC", DEFAULT_MAC_SUFFIX),
            windows_suffix: crate::with_env_or("ASSET_SUFFIX_WINDOWS", DEFAULT_WINDOWS_SUFFIX),
            default_platform: crate::with_env_as_or("DEFAULT_PLATFORM", Platform::Mac)?,
            error_marker: crate::with_env_as_or("FALLBACK_ERROR_MARKER", true)?,
        })
    }

    pub fn with_fallback_version(mut self, version: impl Into<Cow<'static, str>>) -> Self {
        self.fallback_version = version.into();
        self
    }

    pub fn builder<S>(self) -> ResolverBuilder<S> {
        ResolverBuilder {
            config: self,
            repository: None,
            source: None,
        }
    }
}

pub struct ResolverBuilder<S> {
    config: Config,
    repository: Option<String>,
    source: Option<S>,
}

impl<S> ResolverBuilder<S>
where
    S: prelude::ReleaseSource,
{
    /// Repository hosting the releases, as `owner/name`.
    pub fn with_repository(self, repository: impl Into<String>) -> Self {
        Self {
            repository: Some(repository.into()),
            ..self
        }
    }

    pub fn with_source(self, source: S) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    pub fn build(self) -> anyhow::Result<ReleaseResolverService<S>> {
        let source = self
            .source
            .ok_or_else(|| anyhow::anyhow!("release source not specified"))?;
        let repository = self
            .repository
            .ok_or_else(|| anyhow::anyhow!("repository not specified"))?;

        let version = self
            .config
            .fallback_version
            .strip_prefix('v')
            .unwrap_or(&self.config.fallback_version)
            .to_owned();
        if version.trim().is_empty() {
            anyhow::bail!("fallback version can't be empty");
        }
        let tag_name = format!("v{version}");
        let fallback_asset = |template: &str| {
            let file_name = template.replace("{version}", &version);
            FallbackAsset {
                download_url: format!(
                    "{GITHUB_WEB_URL}/{repository}/releases/download/{tag_name}/{file_name}"
                ),
                file_name,
            }
        };
        let fallback = FallbackRelease {
            assets: vec![
                (Platform::Mac, fallback_asset(&*self.config.mac_file_name)),
                (
                    Platform::Windows,
                    fallback_asset(&*self.config.windows_file_name),
                ),
            ],
            release_page_url: format!("{GITHUB_WEB_URL}/{repository}/releases/latest"),
            version,
            tag_name,
        };
        let matchers = vec![
            AssetMatcher::new(Platform::Mac, self.config.mac_suffix),
            AssetMatcher::new(Platform::Windows, self.config.windows_suffix),
        ];

        Ok(ReleaseResolverService {
            source,
            settings: Arc::new(Settings {
                fallback,
                matchers,
                default_platform: self.config.default_platform,
                error_marker: self.config.error_marker,
            }),
        })
    }
}

struct Settings {
    fallback: FallbackRelease,
    matchers: Vec<AssetMatcher>,
    default_platform: Platform,
    error_marker: bool,
}

impl Settings {
    fn matcher(&self, platform: Platform) -> Option<&AssetMatcher> {
        self.matchers.iter().find(|item| item.platform == platform)
    }

    fn fallback(&self, platform: Platform) -> ReleaseInfo {
        let mut info = self.fallback.to_release_info(platform);
        if self.error_marker {
            info.error = Some(FALLBACK_ERROR.into());
        }
        info
    }
}

#[derive(Clone)]
pub struct ReleaseResolverService<S> {
    source: S,
    settings: Arc<Settings>,
}

impl<S> ReleaseResolverService<S>
where
    S: prelude::ReleaseSource,
{
    async fn fetch(&self, platform: Platform) -> anyhow::Result<ReleaseInfo> {
        let release = self.source.latest_release().await?;
        normalize(release, self.settings.matcher(platform))
    }
}

impl<S> prelude::ReleaseResolver for ReleaseResolverService<S>
where
    S: prelude::ReleaseSource,
{
    #[tracing::instrument(skip(self))]
    async fn resolve_latest_release(&self, platform: Option<Platform>) -> ReleaseInfo {
        let target = platform.unwrap_or(self.settings.default_platform);
        let mut info = match self.fetch(target).await {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(error = ?err, "unable to resolve latest release, using fallback");
                self.settings.fallback(target)
            }
        };
        info.platform = platform;
        info
    }

    fn release_page_url(&self) -> &str {
        &self.settings.fallback.release_page_url
    }
}

/// Turns an upstream release into the record served to the website.
fn normalize(
    release: PublishedRelease,
    matcher: Option<&AssetMatcher>,
) -> anyhow::Result<ReleaseInfo> {
    let version = release
        .tag_name
        .strip_prefix('v')
        .unwrap_or(&release.tag_name)
        .to_owned();
    if version.trim().is_empty() {
        anyhow::bail!("release tag {:?} doesn't hold a version", release.tag_name);
    }
    let asset = matcher.and_then(|matcher| matcher.find(&release.assets));
    Ok(ReleaseInfo {
        version,
        download_url: asset.map(|item| item.download_url.clone()),
        file_name: asset.map(|item| item.name.clone()),
        download_count: asset.map(|item| item.download_count).unwrap_or_default(),
        tag_name: release.tag_name,
        published_at: release.published_at,
        release_name: release.name,
        release_notes: release.body,
        platform: None,
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::entity::{Platform, PublishedRelease, ReleaseAsset, ReleaseInfo};
    use super::prelude::{MockReleaseSource, ReleaseResolver};

    fn sample_release(tag_name: &str) -> PublishedRelease {
        PublishedRelease {
            tag_name: tag_name.into(),
            name: Some("Tokencentric 1.2.3".into()),
            body: Some("- faster startup".into()),
            published_at: chrono::DateTime::from_timestamp(1_700_000_000, 0),
            assets: vec![
                ReleaseAsset {
                    name: "latest-mac.yml".into(),
                    download_url: "https://example.com/latest-mac.yml".into(),
                    download_count: 3,
                },
                ReleaseAsset {
                    name: "App-1.2.3.dmg".into(),
                    download_url: "https://example.com/App-1.2.3.dmg".into(),
                    download_count: 42,
                },
                ReleaseAsset {
                    name: "App-Setup-1.2.3.exe".into(),
                    download_url: "https://example.com/App-Setup-1.2.3.exe".into(),
                    download_count: 7,
                },
            ],
        }
    }

    fn build(source: MockReleaseSource) -> super::ReleaseResolverService<MockReleaseSource> {
        super::Config::default()
            .builder()
            .with_source(source)
            .with_repository("owner/app")
            .build()
            .unwrap()
    }

    fn expected_fallback() -> ReleaseInfo {
        ReleaseInfo {
            version: "2.0.0".into(),
            tag_name: "v2.0.0".into(),
            download_url: Some(
                "https://github.com/owner/app/releases/download/v2.0.0/Tokencentric-2.0.0-arm64.dmg"
                    .into(),
            ),
            file_name: Some("Tokencentric-2.0.0-arm64.dmg".into()),
            download_count: 0,
            published_at: None,
            release_name: None,
            release_notes: None,
            platform: None,
            error: Some(super::FALLBACK_ERROR.into()),
        }
    }

    #[tokio::test]
    async fn should_resolve_release() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().once().return_once(|| {
            let release = sample_release("v1.2.3");
            Box::pin(async move { Ok(release) })
        });
        let info = build(source).resolve_latest_release(None).await;
        assert_eq!(info.version, "1.2.3");
        assert_eq!(info.tag_name, "v1.2.3");
        assert_eq!(
            info.download_url.as_deref(),
            Some("https://example.com/App-1.2.3.dmg")
        );
        assert_eq!(info.file_name.as_deref(), Some("App-1.2.3.dmg"));
        assert_eq!(info.download_count, 42);
        assert_eq!(info.release_name.as_deref(), Some("Tokencentric 1.2.3"));
        assert_eq!(info.release_notes.as_deref(), Some("- faster startup"));
        assert!(info.published_at.is_some());
        assert!(info.platform.is_none());
        assert!(info.error.is_none());
    }

    #[tokio::test]
    async fn should_resolve_requested_platform() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().once().return_once(|| {
            let release = sample_release("v1.2.3");
            Box::pin(async move { Ok(release) })
        });
        let info = build(source)
            .resolve_latest_release(Some(Platform::Windows))
            .await;
        assert_eq!(info.file_name.as_deref(), Some("App-Setup-1.2.3.exe"));
        assert_eq!(info.download_count, 7);
        assert_eq!(info.platform, Some(Platform::Windows));
    }

    #[tokio::test]
    async fn should_keep_version_when_no_asset_matches() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().once().return_once(|| {
            let mut release = sample_release("v1.2.3");
            release.assets.retain(|asset| !asset.name.ends_with(".dmg"));
            Box::pin(async move { Ok(release) })
        });
        let info = build(source).resolve_latest_release(None).await;
        assert_eq!(info.version, "1.2.3");
        assert_eq!(info.tag_name, "v1.2.3");
        assert!(info.download_url.is_none());
        assert!(info.file_name.is_none());
        assert_eq!(info.download_count, 0);
        assert!(info.error.is_none());
    }

    #[tokio::test]
    async fn should_fallback_when_source_fails() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().once().return_once(|| {
            Box::pin(async move { Err(anyhow::anyhow!("connection refused")) })
        });
        let info = build(source).resolve_latest_release(None).await;
        assert_eq!(info, expected_fallback());
    }

    #[tokio::test]
    async fn should_fallback_without_marker_when_disabled() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().once().return_once(|| {
            Box::pin(async move { Err(anyhow::anyhow!("500 Internal Server Error")) })
        });
        let resolver = super::Config {
            error_marker: false,
            ..Default::default()
        }
        .builder()
        .with_source(source)
        .with_repository("owner/app")
        .build()
        .unwrap();
        let info = resolver.resolve_latest_release(None).await;
        assert_eq!(
            info,
            ReleaseInfo {
                error: None,
                ..expected_fallback()
            }
        );
    }

    #[tokio::test]
    async fn should_fallback_when_tag_is_only_a_prefix() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().once().return_once(|| {
            let release = sample_release("v");
            Box::pin(async move { Ok(release) })
        });
        let info = build(source).resolve_latest_release(None).await;
        assert_eq!(info, expected_fallback());
    }

    #[tokio::test]
    async fn should_fallback_for_requested_platform() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().once().return_once(|| {
            Box::pin(async move { Err(anyhow::anyhow!("timeout")) })
        });
        let info = build(source)
            .resolve_latest_release(Some(Platform::Windows))
            .await;
        assert_eq!(info.file_name.as_deref(), Some("Tokencentric-Setup-2.0.0.exe"));
        assert_eq!(info.platform, Some(Platform::Windows));
        assert!(info.error.is_some());
    }

    #[tokio::test]
    async fn should_return_same_record_when_called_twice() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().times(2).returning(|| {
            let release = sample_release("v1.2.3");
            Box::pin(async move { Ok(release) })
        });
        let resolver = build(source);
        let first = resolver.resolve_latest_release(None).await;
        let second = resolver.resolve_latest_release(None).await;
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn should_strip_tag_prefix_only_once() {
        for (tag, version) in [("v1.2.3", "1.2.3"), ("1.2.3", "1.2.3"), ("vv1.0", "v1.0")] {
            let info = super::normalize(sample_release(tag), None).unwrap();
            assert_eq!(info.version, version);
            assert_eq!(info.tag_name, tag);
        }
    }

    #[test]
    fn should_build_fallback_from_prefixed_version() {
        let resolver = super::Config::default()
            .with_fallback_version("v3.1.0")
            .builder()
            .with_source(MockReleaseSource::new())
            .with_repository("owner/app")
            .build()
            .unwrap();
        assert_eq!(resolver.settings.fallback.version, "3.1.0");
        assert_eq!(resolver.settings.fallback.tag_name, "v3.1.0");
        assert_eq!(
            resolver.release_page_url(),
            "https://github.com/owner/app/releases/latest"
        );
    }

    #[test]
    fn should_fail_building_without_source() {
        let err = super::Config::default()
            .builder::<MockReleaseSource>()
            .with_repository("owner/app")
            .build()
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "release source not specified");
    }
}
