//! HTTP server for the QCall admin panel.
//!
//! The binary in `main.rs` wires configuration, logging and the MongoDB
//! repositories into the router built by [`api::create_router`].

pub mod api;
pub mod config;
pub mod logging;
pub mod seed;
