//! Command handlers for procpatch CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod configure;
pub mod maps;
pub mod patch;
