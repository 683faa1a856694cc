//! Farm question answering server (library crate).
//!
//! Exposes the pipeline, query builder, formatter and router so the binary
//! (`main.rs`) and `fq-e2e-tests` share the same wiring.

pub mod builder;
pub mod config;
pub mod error;
pub mod formatter;
pub mod pipeline;
pub mod routes;
pub mod state;
