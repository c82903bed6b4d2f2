//! Deploy status poller

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::deploy::fsm::{PollEvent, PollFsm, PollState};
use crate::errors::DeployError;
use crate::http::deploys::DeployApi;
use crate::models::deploy::Deploy;

/// Poller options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between two status queries
    pub interval: Duration,

    /// Wait budget measured from the moment the deploy was triggered
    pub max_wait: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Poll `deploy` until it is live or the wait budget runs out.
///
/// The deadline is checked right after each status query and before the next
/// delay, so a timeout always reports the last observed status and never sleeps
/// past the deadline. Failed queries are not retried.
pub async fn wait_until_live<A, S, F>(
    api: &A,
    service_id: &str,
    deploy: Deploy,
    options: &Options,
    triggered_at: Instant,
    sleep_fn: S,
) -> Result<Deploy, DeployError>
where
    A: DeployApi + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Waiting for deployment to complete...");

    let mut fsm = PollFsm::new(deploy.status.clone());
    let mut current = deploy;

    loop {
        match api.retrieve_deploy(service_id, &current.id).await {
            Ok(latest) => {
                fsm.process(PollEvent::StatusObserved(latest.status.clone()))
                    .map_err(DeployError::Internal)?;
                current = latest;
            }
            Err(e) => {
                fsm.process(PollEvent::QueryError(e.to_string()))
                    .map_err(DeployError::Internal)?;
                return Err(e);
            }
        }

        if fsm.state() == &PollState::Live {
            info!("Deployment complete!");
            return Ok(current);
        }

        let elapsed = triggered_at.elapsed();
        if elapsed > options.max_wait {
            fsm.process(PollEvent::DeadlineExceeded)
                .map_err(DeployError::Internal)?;
            warn!(
                "Deploy {} still {} after {}s",
                current.id,
                fsm.last_status(),
                elapsed.as_secs()
            );
            return Err(DeployError::TimedOut {
                max_wait_secs: options.max_wait.as_secs(),
                last_status: fsm.last_status().to_string(),
            });
        }

        info!("Current deploy status: {}", current.status);
        debug!(
            "Poll {} for deploy {}, {}s elapsed",
            fsm.polls(),
            current.id,
            elapsed.as_secs()
        );
        sleep_fn(options.interval).await;
    }
}
