//! CLI module for wacloud - list, inspect and call Cloud API tools.

pub mod commands;

pub use commands::Cli;
