//! Reporting the outcome of a run to the CI runner
//!
//! Failures go out as an `::error::` workflow command and a nonzero exit code.
//! On success the deploy ID and status are written as step outputs.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info, warn};

use crate::app::run::DeployResult;

/// Environment variable naming the step output file
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Exit status for `result`
pub fn exit_status(result: &DeployResult) -> u8 {
    if result.is_success() {
        0
    } else {
        1
    }
}

/// Report `result` and map it to the process exit code
pub fn report(result: &DeployResult) -> ExitCode {
    match result {
        DeployResult::Success { deploy } => {
            info!("Deploy {} finished with status {}", deploy.id, deploy.status);

            if let Some(path) = env::var_os(GITHUB_OUTPUT_ENV).filter(|p| !p.is_empty()) {
                let outputs = [
                    ("deploy-id", deploy.id.as_str()),
                    ("deploy-status", deploy.status.as_str()),
                ];
                if let Err(e) = write_outputs(Path::new(&path), &outputs) {
                    warn!("Unable to write step outputs: {:#}", e);
                }
            }
        }
        DeployResult::Failure { reason } => {
            error!("{}", reason);
            println!("::error::{}", escape_data(reason));
        }
    }
    ExitCode::from(exit_status(result))
}

/// Append `name=value` lines to the step output file
pub fn write_outputs(path: &Path, outputs: &[(&str, &str)]) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    for (name, value) in outputs {
        writeln!(file, "{}={}", name, value)
            .with_context(|| format!("failed to write output `{}`", name))?;
    }
    Ok(())
}

/// Escape a message for use as workflow command data
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
