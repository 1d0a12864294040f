//! Integration tests - the real `PluginClient` against a mock of the plugin run route
//!
//! The mock is an axum server bound to an ephemeral local port.

mod run_route_tests;
