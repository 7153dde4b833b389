//! services/api/src/lib.rs
//!
//! Library half of the `api` service, shared by the server and the
//! OpenAPI generator binaries.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
