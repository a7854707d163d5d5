//! Side-effecting operations: configuration, workspace lifecycle, process
//! execution.

pub mod config;
pub mod process;
pub mod workdir;
