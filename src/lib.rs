//! `fx-cortex` library crate.
//!
//! The binary (`fxc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or hitting the network
//! - the rate provider, return model and audit store can be swapped in tests

pub mod app;
pub mod audit;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod model;
pub mod plot;
pub mod report;
