//! Instrument core: command classification and dispatch.
//!
//! All interaction with hardware happens through the **port traits** in
//! [`ports`], so this layer runs unchanged against the simulated bus and
//! recording mocks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod reply;
pub mod service;
