//! HTTP access to the deploy API and deploy hooks

pub mod client;
pub mod deploys;
