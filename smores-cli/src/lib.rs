//! smores CLI library: argument definitions and command implementations.
//!
//! Every command returns the text to print so it can be exercised without
//! spawning the binary.

pub mod cli;
pub mod complete;
pub mod render;
pub mod schemas;
pub mod setup;

pub use cli::{Cli, Commands};
