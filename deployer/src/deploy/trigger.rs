//! Deploy trigger
//!
//! A deploy is started through exactly one mechanism, chosen by the
//! [`DeployTarget`] variant: the authenticated REST API or a deploy hook.

use tracing::info;
use url::Url;

use crate::app::options::DeployTarget;
use crate::errors::DeployError;
use crate::http::deploys::DeployApi;
use crate::models::deploy::{ClearCache, CreateDeployRequest, Deploy};

/// Trigger a deploy of `image_reference` on `target`
pub async fn trigger<A>(
    api: &A,
    target: &DeployTarget,
    image_reference: &str,
    clear_cache: ClearCache,
) -> Result<Deploy, DeployError>
where
    A: DeployApi + ?Sized,
{
    info!("Triggering deploy of {}", image_reference);

    let deploy = match target {
        DeployTarget::DirectApi { service_id } => {
            trigger_direct(api, service_id, image_reference, clear_cache).await?
        }
        DeployTarget::WebhookUrl { hook_url, .. } => {
            trigger_webhook(api, hook_url, image_reference).await?
        }
    };

    info!(
        "Deploy {} created for service {} ({})",
        deploy.id,
        target.service_id(),
        deploy.status
    );
    Ok(deploy)
}

/// Create a deploy through the REST API
pub async fn trigger_direct<A>(
    api: &A,
    service_id: &str,
    image_reference: &str,
    clear_cache: ClearCache,
) -> Result<Deploy, DeployError>
where
    A: DeployApi + ?Sized,
{
    let request = CreateDeployRequest {
        image_url: image_reference.to_string(),
        clear_cache,
    };
    api.create_deploy(service_id, &request).await
}

/// Create a deploy by fetching a deploy hook
pub async fn trigger_webhook<A>(
    api: &A,
    hook_url: &Url,
    image_reference: &str,
) -> Result<Deploy, DeployError>
where
    A: DeployApi + ?Sized,
{
    api.trigger_hook(hook_url, image_reference).await
}
