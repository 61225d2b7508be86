//! medproto-cli
//!
//! Library side of the `medproto` binary: the config file and the
//! subcommand implementations.

pub mod commands;
pub mod config;
