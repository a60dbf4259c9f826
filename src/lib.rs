// ABOUTME: Library root for voyage - incremental monorepo sync and selective compose redeploys.
// ABOUTME: The main binary is in main.rs.

pub mod compose;
pub mod config;
pub mod deploy;
pub mod error;
pub mod events;
pub mod output;
pub mod process;
pub mod types;
pub mod vcs;
