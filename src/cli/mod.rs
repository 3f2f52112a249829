//! CLI command definitions and argument parsing.

pub mod args;
