//! Implementation of `kgs config`.

use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use kgs_highlight::{Highlighter, muted};

use crate::cli::context::CommandContext;

/// Shows effective configuration settings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let toml = match ctx.config.settings_to_toml() {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if io::stdout().is_terminal() {
        if let Some(root) = &ctx.config.config_root {
            println!("{}", muted(&format!("# nearest config: {}", root.display())));
        }
        print!("{}", Highlighter::new().toml(&toml));
    } else {
        print!("{toml}");
    }
    ExitCode::SUCCESS
}
