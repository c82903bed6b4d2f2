//! Deploy trigger and poll protocol

pub mod fsm;
pub mod hook;
pub mod poller;
pub mod trigger;
