//! Deploy models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status value the platform reports once a deploy is serving traffic
pub const LIVE_STATUS: &str = "live";

/// A deploy as known to the platform.
///
/// Each status query returns a fresh value; a `Deploy` is never updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deploy {
    /// Platform-assigned deploy ID, authoritative for polling
    pub id: String,

    /// Last status reported for this deploy
    pub status: DeployStatus,
}

/// Platform-defined deploy status.
///
/// Only `live` is terminal; everything else (`created`, `build_in_progress`,
/// `update_in_progress`, ...) counts as still in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployStatus(String);

impl DeployStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_live(&self) -> bool {
        self.0 == LIVE_STATUS
    }
}

impl fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("unknown")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// Cache behaviour requested for a direct API deploy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearCache {
    Clear,
    #[default]
    DoNotClear,
}

impl From<bool> for ClearCache {
    fn from(clear: bool) -> Self {
        if clear {
            ClearCache::Clear
        } else {
            ClearCache::DoNotClear
        }
    }
}

/// Body of `POST /v1/services/{serviceId}/deploys`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeployRequest {
    pub image_url: String,
    pub clear_cache: ClearCache,
}

/// Deploy object as returned by the REST API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployPayload {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub status: Option<DeployStatus>,
}

/// Body returned when a deploy hook is fetched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookResponse {
    #[serde(default)]
    pub deploy: Option<DeployPayload>,
}
