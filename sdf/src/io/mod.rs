//! I/O adapters for profile commands.

pub mod config;
pub mod confirm;
pub mod git;
pub mod process;
pub mod profile;
