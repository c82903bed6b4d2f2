//! Input resolution
//!
//! Turns raw [`Inputs`] into a validated [`RunConfig`]. Rules are applied in a
//! fixed order and the first failure is reported:
//!
//! 1. a deploy target (service ID with API key, or a well-formed deploy hook)
//! 2. a non-empty image reference, prefixed with the registry prefix once
//! 3. credentials when waiting for the deploy
//! 4. a wait budget of at least [`MIN_MAX_WAIT_SECS`]

use std::time::Duration;

use secrecy::SecretString;

use crate::app::inputs::Inputs;
use crate::app::options::{DeployTarget, RunConfig, DEFAULT_MAX_WAIT_SECS, MIN_MAX_WAIT_SECS};
use crate::deploy::hook::parse_deploy_hook;
use crate::errors::ValidationError;
use crate::models::deploy::ClearCache;

/// Validate raw inputs and build the run configuration
pub fn resolve(inputs: &Inputs) -> Result<RunConfig, ValidationError> {
    let service_id = non_empty(&inputs.service_id);
    let deploy_hook = non_empty(&inputs.deploy_hook);
    let api_key = non_empty(&inputs.render_api_key);

    let target = resolve_target(service_id, deploy_hook, api_key.is_some())?;

    let raw_image = non_empty(&inputs.image_url).ok_or(ValidationError::MissingImage)?;
    let prefix = non_empty(&inputs.docker_repo_prefix).unwrap_or_default();
    let image_reference = normalize_image_reference(prefix, raw_image);

    let wait_for_deployment = parse_bool_input(
        "wait-for-deployment",
        inputs.wait_for_deployment.as_deref(),
        false,
    )?;
    if wait_for_deployment && (api_key.is_none() || target.service_id().is_empty()) {
        return Err(ValidationError::WaitRequiresCredentials);
    }

    let max_wait = parse_max_wait(inputs.max_wait_time.as_deref())?;

    let clear_cache = parse_bool_input("clear-cache", inputs.clear_cache.as_deref(), false)?;

    Ok(RunConfig {
        image_reference,
        wait_for_deployment,
        max_wait,
        credentials: api_key.map(|key| SecretString::from(key.to_string())),
        clear_cache: ClearCache::from(clear_cache),
        target,
    })
}

fn resolve_target(
    service_id: Option<&str>,
    deploy_hook: Option<&str>,
    has_api_key: bool,
) -> Result<DeployTarget, ValidationError> {
    match (service_id, deploy_hook) {
        (Some(service_id), _) if has_api_key => Ok(DeployTarget::DirectApi {
            service_id: service_id.to_string(),
        }),
        (_, Some(hook)) => {
            let hook = parse_deploy_hook(hook)?;
            Ok(DeployTarget::WebhookUrl {
                hook_url: hook.url,
                service_id: hook.service_id,
            })
        }
        (Some(_), None) => Err(ValidationError::MissingApiKey),
        (None, None) => Err(ValidationError::MissingDeployTarget),
    }
}

/// Qualify `raw` with the registry `prefix` unless it already carries it.
///
/// The prefix must match whole path segments: `myorg` does not cover `myorg-api`.
pub fn normalize_image_reference(prefix: &str, raw: &str) -> String {
    let prefix = prefix.trim().trim_end_matches('/');
    let raw = raw.trim();

    let prefixed = raw
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
    if prefix.is_empty() || prefixed {
        raw.to_string()
    } else {
        format!("{}/{}", prefix, raw)
    }
}

/// Parse a boolean input the way the Actions toolkit does (YAML 1.2 core schema)
pub fn parse_bool_input(
    input: &'static str,
    value: Option<&str>,
    default: bool,
) -> Result<bool, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some("true" | "True" | "TRUE") => Ok(true),
        Some("false" | "False" | "FALSE") => Ok(false),
        Some(other) => Err(ValidationError::InvalidBoolean {
            input,
            value: other.to_string(),
        }),
    }
}

fn parse_max_wait(value: Option<&str>) -> Result<Duration, ValidationError> {
    let secs = match value.map(str::trim) {
        None | Some("") => DEFAULT_MAX_WAIT_SECS,
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidMaxWait(raw.to_string()))?,
    };

    if secs < MIN_MAX_WAIT_SECS {
        return Err(ValidationError::MaxWaitTooSmall {
            value: secs,
            minimum: MIN_MAX_WAIT_SECS,
        });
    }

    Ok(Duration::from_secs(secs))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
