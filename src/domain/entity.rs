use std::borrow::Cow;

use chrono::{DateTime, Utc};

/// Installer family an asset is matched for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    Windows,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform {0:?}")]
pub struct UnknownPlatform(String);

impl std::str::FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "mac" | "macos" | "darwin" => Ok(Self::Mac),
            "windows" | "win" => Ok(Self::Windows),
            _ => Err(UnknownPlatform(value.to_owned())),
        }
    }
}

/// Selects the installer of a platform among the assets of a release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetMatcher {
    pub platform: Platform,
    pub suffix: Cow<'static, str>,
}

impl AssetMatcher {
    pub fn new(platform: Platform, suffix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            platform,
            suffix: suffix.into(),
        }
    }

    /// First asset, in list order, whose name ends with the suffix.
    pub fn find<'a>(&self, assets: &'a [ReleaseAsset]) -> Option<&'a ReleaseAsset> {
        assets
            .iter()
            .find(|asset| asset.name.ends_with(&*self.suffix))
    }
}

/// A file attached to a published release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub download_url: String,
    pub download_count: u64,
}

/// The latest published release, as reported by the upstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedRelease {
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub assets: Vec<ReleaseAsset>,
}

/// Release information handed to the website.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    /// version without the tag prefix, like `1.2.3`
    pub version: String,
    /// upstream tag, like `v1.2.3`
    pub tag_name: String,
    pub download_url: Option<String>,
    pub file_name: Option<String>,
    pub download_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Set when the record comes from the fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Installer used in place of a live asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackAsset {
    pub download_url: String,
    pub file_name: String,
}

/// Last known good release, served whenever the upstream can't be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackRelease {
    pub version: String,
    pub tag_name: String,
    pub release_page_url: String,
    pub assets: Vec<(Platform, FallbackAsset)>,
}

impl FallbackRelease {
    pub fn asset(&self, platform: Platform) -> Option<&FallbackAsset> {
        self.assets
            .iter()
            .find(|(item, _)| *item == platform)
            .map(|(_, asset)| asset)
    }

    pub fn to_release_info(&self, platform: Platform) -> ReleaseInfo {
        let (download_url, file_name) = match self.asset(platform) {
            Some(asset) => (asset.download_url.clone(), Some(asset.file_name.clone())),
            None => (self.release_page_url.clone(), None),
        };
        ReleaseInfo {
            version: self.version.clone(),
            tag_name: self.tag_name.clone(),
            download_url: Some(download_url),
            file_name,
            download_count: 0,
            published_at: None,
            release_name: None,
            release_notes: None,
            platform: None,
            error: None,
        }
    }
}
