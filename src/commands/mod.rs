// ABOUTME: Command module aggregator for the voyage CLI.
// ABOUTME: Re-exports the deploy command handler.

mod deploy;

pub use deploy::deploy;
