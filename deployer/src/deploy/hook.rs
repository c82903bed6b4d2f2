//! Deploy hook parsing
//!
//! A deploy hook has the shape `https://<host>/deploy/<serviceId>?key=<secret>`.
//! The service identifier is needed to poll the deploy the hook creates.

use url::Url;

use crate::errors::ValidationError;

/// A parsed deploy hook and the service it deploys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployHook {
    pub url: Url,
    pub service_id: String,
}

/// Parse a deploy hook URL and extract its service identifier.
///
/// Fails when the URL has no `/deploy/<id>` path or no `key` query parameter;
/// never returns an empty identifier.
pub fn parse_deploy_hook(raw: &str) -> Result<DeployHook, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidDeployHook(reason.to_string());

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&format!("not a valid URL ({})", e)))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    let service_id = segments
        .iter()
        .position(|segment| *segment == "deploy")
        .and_then(|idx| segments.get(idx + 1))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| invalid("expected a `/deploy/<serviceId>` path"))?
        .to_string();

    let has_key = url
        .query_pairs()
        .any(|(name, value)| name == "key" && !value.is_empty());
    if !has_key {
        return Err(invalid("expected a `?key=` query parameter"));
    }

    Ok(DeployHook { url, service_id })
}
