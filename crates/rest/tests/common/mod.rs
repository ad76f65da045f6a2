//! Common test utilities for API testing.
//!
//! - [`harness`] - test server with a scripted AI client
//! - [`fixtures`] - resource builders
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod harness;
