//! Kettle bridge firmware library.
//!
//! Exposes the pure-logic modules for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(feature = "espidf")]`
//! within each module, with a simulation backend otherwise.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod pins;
pub mod scheduler;
pub mod sensors;

pub mod adapters;
pub mod drivers;
