//! Application configuration options

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::deploy::poller;
use crate::models::deploy::ClearCache;

/// Default REST API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.render.com";

/// Smallest accepted wait budget, in seconds
pub const MIN_MAX_WAIT_SECS: u64 = 60;

/// Wait budget used when `max-wait-time` is not supplied, in seconds
pub const DEFAULT_MAX_WAIT_SECS: u64 = 600;

/// Process-level options, independent of a particular deploy
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// REST API base URL
    pub api_base_url: String,

    /// Per-request timeout
    pub http_timeout: Duration,

    /// Delay between two status queries
    pub poll_interval: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Where a deploy is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    /// Authenticated REST API call against a known service
    DirectApi { service_id: String },

    /// Deploy hook; the service ID was parsed out of the hook URL
    WebhookUrl { hook_url: Url, service_id: String },
}

impl DeployTarget {
    /// Service the deploy belongs to; used for status queries
    pub fn service_id(&self) -> &str {
        match self {
            DeployTarget::DirectApi { service_id } => service_id,
            DeployTarget::WebhookUrl { service_id, .. } => service_id,
        }
    }
}

/// Validated configuration of a single run. Built once, never mutated.
#[derive(Debug)]
pub struct RunConfig {
    /// Fully qualified image reference, prefixed exactly once
    pub image_reference: String,

    /// Poll until the deploy is live
    pub wait_for_deployment: bool,

    /// Wait budget for polling
    pub max_wait: Duration,

    /// API key; required for direct deploys and for polling
    pub credentials: Option<SecretString>,

    /// Cache behaviour for direct deploys
    pub clear_cache: ClearCache,

    /// Deploy mechanism and service
    pub target: DeployTarget,
}

impl RunConfig {
    /// Poller options for this run
    pub fn poller_options(&self, app: &AppOptions) -> poller::Options {
        poller::Options {
            interval: app.poll_interval,
            max_wait: self.max_wait,
        }
    }
}
