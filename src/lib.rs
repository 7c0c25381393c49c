// src/lib.rs
// Round-trip interoperability harness for SOAP services

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod builder;
pub mod client;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod fault;
pub mod http;
pub mod invoker;
pub mod scenario;
pub mod schema;
pub mod server;
pub mod utils;
pub mod value;
pub mod wsdl;

pub use error::{HarnessError, Result};
