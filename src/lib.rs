//! prbot: AI pull-request bots (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod analyzer;
pub mod config;
pub mod constants;
pub mod context;
pub mod coverage;
pub mod diff;
pub mod env;
pub mod filter;
pub mod github;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod rules;
pub mod testmap;
pub mod testwriter;
