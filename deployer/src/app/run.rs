//! Run orchestration: resolve inputs, trigger the deploy, optionally wait for it

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::app::inputs::Inputs;
use crate::app::options::{AppOptions, RunConfig};
use crate::app::resolve::resolve;
use crate::deploy::poller::{self, wait_until_live};
use crate::deploy::trigger::trigger;
use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::http::deploys::DeployApi;
use crate::models::deploy::Deploy;

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployResult {
    Success { deploy: Deploy },
    Failure { reason: String },
}

impl DeployResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DeployResult::Success { .. })
    }
}

impl From<Result<Deploy, DeployError>> for DeployResult {
    fn from(result: Result<Deploy, DeployError>) -> Self {
        match result {
            Ok(deploy) => DeployResult::Success { deploy },
            Err(e) => DeployResult::Failure {
                reason: e.to_string(),
            },
        }
    }
}

/// Run a deploy from raw inputs against the real API
pub async fn run(inputs: &Inputs, options: &AppOptions) -> DeployResult {
    execute(inputs, options).await.into()
}

async fn execute(inputs: &Inputs, options: &AppOptions) -> Result<Deploy, DeployError> {
    let config = resolve(inputs)?;
    info!(
        "Deploying {} to service {}",
        config.image_reference,
        config.target.service_id()
    );

    let client = match &config.credentials {
        Some(key) => HttpClient::with_api_key(&options.api_base_url, options.http_timeout, key)?,
        None => HttpClient::new(&options.api_base_url, options.http_timeout)?,
    };

    let poller_options = config.poller_options(options);
    deploy(&config, &client, &poller_options, tokio::time::sleep).await
}

/// Trigger the configured deploy and, if requested, wait for it to go live.
///
/// The first error aborts the remaining steps.
pub async fn deploy<A, S, F>(
    config: &RunConfig,
    api: &A,
    poller_options: &poller::Options,
    sleep_fn: S,
) -> Result<Deploy, DeployError>
where
    A: DeployApi + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let deploy = trigger(
        api,
        &config.target,
        &config.image_reference,
        config.clear_cache,
    )
    .await?;
    let triggered_at = Instant::now();

    if !config.wait_for_deployment {
        return Ok(deploy);
    }

    wait_until_live(
        api,
        config.target.service_id(),
        deploy,
        poller_options,
        triggered_at,
        sleep_fn,
    )
    .await
}
