//! Side-effecting helpers: process invocation and config files.

pub mod command;
pub mod config;
pub mod encoding;
pub mod pipe;
pub mod process;
