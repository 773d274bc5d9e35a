//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the kettle bridge: the
//! attribute store, report throttling, command decoding and the service
//! that wires them to the state machine and sensor pipeline.  All
//! interaction with hardware and the wireless stack happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod attributes;
pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod report;
pub mod service;
