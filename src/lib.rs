//! Black-box contract checks for a message-processing HTTP service.
//!
//! A [`scenarios::Scenario`] pairs a case provider with one request shape and
//! the response the service must give back. [`scenarios::ScenarioRunner`]
//! sends each case once and checks it with the assertions in [`testing`].

pub mod cases;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod scenarios;
pub mod testing;

pub use error::HarnessError;
