//! Render deployer library
//!
//! Triggers a deploy of a container image on Render, either through the REST
//! API or a deploy hook, and optionally polls until the deploy is live.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod utils;
