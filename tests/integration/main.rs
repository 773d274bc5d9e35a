//! Integration test driver for `tests/integration/`.
//!
//! Each `mod` below maps to a file that exercises the service against
//! recording mock adapters on a virtual clock.  All tests run on the host
//! with no real hardware required.

mod kettle_flow_tests;
mod mock_hw;
mod rig;
mod sensor_flow_tests;
