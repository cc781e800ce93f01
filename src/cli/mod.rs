//! Command Line Interface (CLI) layer for RADGRID.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that opens the inputs, loads them,
//! applies no-data handling and conversion, and writes or summarizes the result.
//!
//! If you are embedding RADGRID into another application, use `radgrid::Grid`
//! directly instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
