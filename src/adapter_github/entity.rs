use chrono::{DateTime, Utc};

use crate::domain::entity::{PublishedRelease, ReleaseAsset};

#[derive(Debug, serde::Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub download_count: u64,
}

#[derive(Debug, serde::Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl From<Release> for PublishedRelease {
    fn from(value: Release) -> Self {
        Self {
            tag_name: value.tag_name,
            name: value.name,
            body: value.body,
            published_at: value.published_at,
            assets: value
                .assets
                .into_iter()
                .map(|asset| ReleaseAsset {
                    name: asset.name,
                    download_url: asset.browser_download_url,
                    download_count: asset.download_count,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repository<'a> {
    pub owner: &'a str,
    pub name: &'a str,
}

impl<'a> Repository<'a> {
    /// Parse a "owner/name" repo string into its two parts.
    pub fn parse(repo: &'a str) -> anyhow::Result<Self> {
        match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self { owner, name })
            }
            _ => Err(anyhow::anyhow!(
                "invalid repository {repo:?}, expected owner/name"
            )),
        }
    }
}
