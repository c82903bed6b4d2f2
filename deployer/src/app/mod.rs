//! Run configuration, orchestration and reporting

pub mod inputs;
pub mod options;
pub mod report;
pub mod resolve;
pub mod run;
