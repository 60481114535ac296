//! Potentiostat firmware library.
//!
//! Exposes the protocol, device and dispatch logic for integration testing
//! and host simulation.  ESP-IDF-specific code is behind the `espidf`
//! feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod transport;
