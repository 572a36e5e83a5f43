//! Implementation of `kgs parse`.

use std::process::ExitCode;

use kgs_compiler::{capitalize_operators, extract_terms, normalize};
use kgs_highlight::{heading, muted};

use crate::cli::args::ParseCommand;

/// Prints the query tree the sanitizer works from.
pub fn run(cmd: &ParseCommand) -> ExitCode {
    let normalized = capitalize_operators(&normalize(&cmd.query));
    println!("{} {normalized}", heading("Normalized:"));

    let expr = match kgs_query::parse(&normalized) {
        Ok(Some(expr)) => expr,
        Ok(None) => {
            println!("{}", muted("(empty query)"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", heading("Tree:"));
    print!("{expr}");

    let terms = extract_terms(&expr);
    println!("{}", heading("Augmentable terms:"));
    if terms.is_empty() {
        println!("  {}", muted("(none)"));
    }
    for term in terms {
        println!("  {term}");
    }
    ExitCode::SUCCESS
}
