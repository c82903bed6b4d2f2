//! render-deployer - Entry Point
//!
//! Single-shot CI step: trigger a deploy, optionally wait for it to go live,
//! and report the outcome through the exit code.

use std::process::ExitCode;

use clap::Parser;

use render_deployer::app::inputs::Cli;
use render_deployer::app::report::report;
use render_deployer::app::run::run;
use render_deployer::logs::init_logging;
use render_deployer::utils::version_info;

use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.settings.log_options()) {
        eprintln!("Failed to initialize logging: {e}");
    }
    debug!("{}", version_info());

    let options = cli.settings.app_options();
    let result = run(&cli.inputs, &options).await;
    report(&result)
}
