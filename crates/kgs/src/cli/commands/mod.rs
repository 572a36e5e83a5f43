//! Command implementations and dispatch.

pub mod config;
pub mod facets;
pub mod parse;
pub mod payload;
pub mod sanitize;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Sanitize(cmd) => sanitize::run(ctx, &cmd),
        Commands::Parse(cmd) => parse::run(&cmd),
        Commands::Facets(cmd) => facets::run(ctx, &cmd),
        Commands::Payload(cmd) => payload::run(ctx, &cmd),
        Commands::Config => config::run(ctx),
    }
}
