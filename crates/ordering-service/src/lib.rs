//! HTTP service crate for the ordering system.
//!
//! Exposes the router and handler modules so integration tests can drive
//! the API without binding a socket; the `orderd` binary wires configured
//! backends into the same router.

/// Request handlers for the order endpoints.
pub mod apis;
/// HTTP server assembly and shared application state.
pub mod server;
