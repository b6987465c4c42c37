//! PingDirectory Core
//!
//! Resource model, schemas and change planning shared by the provider and
//! the command line host. Nothing in this crate performs I/O.

pub mod diagnostics;
pub mod differ;
pub mod effect;
pub mod interpreter;
pub mod operations;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
