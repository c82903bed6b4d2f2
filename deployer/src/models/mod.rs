//! Wire models for the deploy API

pub mod deploy;
