//! Command-line and GitHub Actions inputs
//!
//! Every action input is also a long flag. When running as an action step the
//! runner exposes inputs as `INPUT_<NAME>` environment variables, which clap
//! reads as fallbacks. Values are kept raw; [`crate::app::resolve`] validates them.

use std::time::Duration;

use clap::{Args, Parser};

use crate::app::options::{AppOptions, DEFAULT_API_BASE_URL};
use crate::logs::{LogLevel, LogOptions};

#[derive(Debug, Clone, Parser)]
#[command(name = "render-deployer")]
#[command(about = "Trigger a Render deploy and optionally wait for it to go live")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub inputs: Inputs,

    #[command(flatten)]
    pub settings: Settings,
}

/// Raw action inputs
#[derive(Debug, Clone, Default, Args)]
pub struct Inputs {
    /// Service to deploy through the REST API
    #[arg(long, env = "INPUT_SERVICE-ID")]
    pub service_id: Option<String>,

    /// Deploy hook URL (`https://api.render.com/deploy/<serviceId>?key=...`)
    #[arg(long, env = "INPUT_DEPLOY-HOOK", hide_env_values = true)]
    pub deploy_hook: Option<String>,

    /// API key used for direct deploys and status polling
    #[arg(long, env = "INPUT_RENDER-API-KEY", hide_env_values = true)]
    pub render_api_key: Option<String>,

    /// Registry path prepended to the image
    #[arg(long, env = "INPUT_DOCKER-REPO-PREFIX")]
    pub docker_repo_prefix: Option<String>,

    /// Image to deploy, with or without the registry prefix
    #[arg(long, env = "INPUT_IMAGE-URL")]
    pub image_url: Option<String>,

    /// Poll until the deploy is live (`true`/`false`)
    #[arg(long, env = "INPUT_WAIT-FOR-DEPLOYMENT")]
    pub wait_for_deployment: Option<String>,

    /// Wait budget in seconds
    #[arg(long, env = "INPUT_MAX-WAIT-TIME")]
    pub max_wait_time: Option<String>,

    /// Clear the build cache on direct deploys (`true`/`false`)
    #[arg(long, env = "INPUT_CLEAR-CACHE")]
    pub clear_cache: Option<String>,
}

/// Process settings that are not action inputs
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// REST API base URL
    #[arg(long, env = "RENDER_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "RENDER_DEPLOYER_LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Include the module path in each log line
    #[arg(long)]
    pub log_target: bool,

    /// Seconds between two status queries
    #[arg(long, default_value_t = 10, hide = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_secs: u64,
}

impl Settings {
    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            api_base_url: self.api_base_url.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            ..Default::default()
        }
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_level: self.log_level,
            json_format: self.log_json,
            with_target: self.log_target,
        }
    }
}
