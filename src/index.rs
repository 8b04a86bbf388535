//! Board-manager package indexes.
//!
//! Third-party cores are published as `package_<vendor>_index.json` files and
//! registered through `board_manager.additional_urls`. This module checks that
//! those URLs parse and serve a readable index.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("ardcli/", env!("CARGO_PKG_VERSION"));

const FETCH_TIMEOUT_SECS: u64 = 30;

/// A package index document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIndex {
    pub packages: Vec<Package>,
}

/// One vendor package in an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default)]
    pub maintainer: String,
    #[serde(rename = "websiteURL", default)]
    pub website_url: String,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

/// A released platform (core) version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub architecture: String,
    pub version: String,
}

impl PackageIndex {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Core identifiers offered by the index, as `package:architecture@version`.
    pub fn cores(&self) -> Vec<String> {
        self.packages
            .iter()
            .flat_map(|package| {
                package.platforms.iter().map(move |platform| {
                    format!(
                        "{}:{}@{}",
                        package.name, platform.architecture, platform.version
                    )
                })
            })
            .collect()
    }
}

/// Parse a package index URL.
pub fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| Error::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// Download and decode the package index at `url`.
///
/// # Errors
/// - `Fetch` on transport failures and non-success HTTP statuses
/// - `Json` if the body is not a package index
pub fn fetch(url: &Url) -> Result<PackageIndex> {
    tracing::debug!(%url, "fetching package index");

    let response = ureq::get(url.as_str())
        .set("User-Agent", USER_AGENT)
        .set("Accept", "application/json")
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .call();

    match response {
        Ok(resp) => resp.into_json::<PackageIndex>().map_err(|e| {
            // ureq reports a malformed body as InvalidData
            if e.kind() == io::ErrorKind::InvalidData {
                Error::Json(serde::de::Error::custom(e))
            } else {
                Error::Fetch {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        }),
        Err(ureq::Error::Status(code, _)) => Err(Error::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", code),
        }),
        Err(e) => Err(Error::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        }),
    }
}
