//! Implementation of `kgs sanitize`.

use std::process::ExitCode;

use crate::cli::{args::SanitizeCommand, context::CommandContext};

/// Prints each query as the search engine would receive it.
pub fn run(ctx: &CommandContext, cmd: &SanitizeCommand) -> ExitCode {
    let sanitizer = ctx.sanitizer();
    for query in &cmd.queries {
        println!("{}", sanitizer.sanitize(query));
    }
    ExitCode::SUCCESS
}
