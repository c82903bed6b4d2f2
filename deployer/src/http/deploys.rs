//! Deploy API client

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::errors::DeployError;
use crate::http::client::{ApiResponse, HttpClient};
use crate::models::deploy::{CreateDeployRequest, Deploy, DeployPayload, HookResponse};

/// Query parameter a deploy hook reads the image reference from
pub const HOOK_IMAGE_PARAM: &str = "imgURL";

/// Deploy operations used by the trigger and the poller.
///
/// Implemented by [`HttpClient`]; tests substitute scripted fakes.
#[async_trait]
pub trait DeployApi: Send + Sync {
    /// Create a deploy through the authenticated REST API
    async fn create_deploy(
        &self,
        service_id: &str,
        request: &CreateDeployRequest,
    ) -> Result<Deploy, DeployError>;

    /// Create a deploy by fetching a deploy hook
    async fn trigger_hook(&self, hook_url: &Url, image_reference: &str)
        -> Result<Deploy, DeployError>;

    /// Fetch the current state of a deploy
    async fn retrieve_deploy(&self, service_id: &str, deploy_id: &str)
        -> Result<Deploy, DeployError>;
}

/// Append the image reference to a hook URL, keeping its existing query
pub fn hook_request_url(hook_url: &Url, image_reference: &str) -> Url {
    let mut url = hook_url.clone();
    url.query_pairs_mut()
        .append_pair(HOOK_IMAGE_PARAM, image_reference);
    url
}

fn into_deploy(payload: Option<DeployPayload>, context: &str) -> Result<Deploy, DeployError> {
    let payload = payload.unwrap_or_default();
    match payload.id {
        Some(id) if !id.trim().is_empty() => Ok(Deploy {
            id,
            status: payload.status.unwrap_or_default(),
        }),
        _ => Err(DeployError::MalformedResponse(format!(
            "{} response did not contain a deploy id",
            context
        ))),
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    response: &ApiResponse,
    context: &str,
) -> Result<T, DeployError> {
    response.json().map_err(|e| {
        DeployError::MalformedResponse(format!("{} response is not valid JSON: {}", context, e))
    })
}

#[async_trait]
impl DeployApi for HttpClient {
    async fn create_deploy(
        &self,
        service_id: &str,
        request: &CreateDeployRequest,
    ) -> Result<Deploy, DeployError> {
        let response = self
            .post(&["v1", "services", service_id, "deploys"], request)
            .await
            .map_err(|e| DeployError::Trigger {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        if response.status != StatusCode::CREATED {
            return Err(DeployError::Trigger {
                status: Some(response.status.as_u16()),
                message: response.error_message(),
            });
        }

        let payload: DeployPayload = parse(&response, "create deploy")?;
        into_deploy(Some(payload), "create deploy")
    }

    async fn trigger_hook(
        &self,
        hook_url: &Url,
        image_reference: &str,
    ) -> Result<Deploy, DeployError> {
        let url = hook_request_url(hook_url, image_reference);
        let response = self
            .get_url(&url)
            .await
            .map_err(|e| DeployError::Trigger {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        if response.status != StatusCode::OK {
            return Err(DeployError::Trigger {
                status: Some(response.status.as_u16()),
                message: response.body.trim().to_string(),
            });
        }

        let body: HookResponse = parse(&response, "deploy hook")?;
        into_deploy(body.deploy, "deploy hook")
    }

    async fn retrieve_deploy(
        &self,
        service_id: &str,
        deploy_id: &str,
    ) -> Result<Deploy, DeployError> {
        let response = self
            .get(&["v1", "services", service_id, "deploys", deploy_id])
            .await
            .map_err(|e| DeployError::QueryFailed {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        if response.status != StatusCode::OK {
            return Err(DeployError::QueryFailed {
                status: Some(response.status.as_u16()),
                message: response.error_message(),
            });
        }

        let payload: DeployPayload = parse(&response, "retrieve deploy")?;
        match payload.status {
            Some(status) => Ok(Deploy {
                id: payload.id.unwrap_or_else(|| deploy_id.to_string()),
                status,
            }),
            None => Err(DeployError::MalformedResponse(
                "retrieve deploy response did not contain a status".to_string(),
            )),
        }
    }
}
