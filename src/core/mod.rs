//! Core building blocks: the `Grid` and its array state, radiometric math and
//! the conversion engine, and the parameter structs that drive them.
pub mod conversion;
pub mod grid;
pub mod params;
pub mod radiometry;
pub mod state;
