//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters or the simulated bus.  All tests run on the host
//! with no real hardware required.

mod dispatcher_tests;
mod mock_hw;
mod transaction_tests;
