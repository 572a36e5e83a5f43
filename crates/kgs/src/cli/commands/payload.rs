//! Implementation of `kgs payload`.

use std::{
    fs,
    io::{self, IsTerminal},
    path::Path,
    process::ExitCode,
};

use kgs_compiler::{FacetKind, Schema, SearchState, SortChoice, TYPE_FACET_ID, sort_options};
use kgs_highlight::Highlighter;
use tracing::debug;

use crate::cli::{args::PayloadCommand, context::CommandContext};

/// Prints the request body for the described search state.
pub fn run(ctx: &CommandContext, cmd: &PayloadCommand) -> ExitCode {
    let schema = match ctx.schema(&cmd.schema.schema) {
        Ok(schema) => schema,
        Err(code) => return code,
    };
    match build(ctx, cmd, &schema) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Compiles the payload and renders it for output.
fn build(ctx: &CommandContext, cmd: &PayloadCommand, schema: &Schema) -> Result<String, String> {
    let compiler = ctx.compiler(schema);

    let mut state = match &cmd.state {
        Some(path) => read_state(&ctx.cwd.join(path))?,
        None => SearchState {
            hits_per_page: ctx.config.search.hits_per_page,
            ..SearchState::default()
        },
    };
    if state.facets.is_empty() {
        state.facets = compiler.schema().all_facets();
    }

    if let Some(query) = &cmd.query {
        state.query_string.clone_from(query);
    }
    if let Some(category) = &cmd.category {
        state.selected_type = Some(category.clone());
    }
    if let Some(key) = &cmd.sort {
        state.sort = Some(SortChoice::for_key(&sort_options(schema), key));
    }
    if let Some(page) = cmd.page {
        state.set_page(page);
    }
    for selection in &cmd.selections {
        apply_selection(&mut state, selection)?;
    }

    let payload = compiler.compile(&state);
    let json = if cmd.raw {
        serde_json::to_string(&payload)
    } else {
        serde_json::to_string_pretty(&payload)
    }
    .map_err(|e| format!("failed to serialize payload: {e}"))?;

    if !cmd.raw && io::stdout().is_terminal() {
        return Ok(Highlighter::new().json(&json));
    }
    Ok(json)
}

/// Loads a search state JSON file.
fn read_state(path: &Path) -> Result<SearchState, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read state file {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("failed to parse state file {}: {e}", path.display()))
}

/// Applies one `FACET_ID=VALUE` selection.
fn apply_selection(state: &mut SearchState, selection: &str) -> Result<(), String> {
    let (id, value) = selection
        .split_once('=')
        .ok_or_else(|| format!("selection must be FACET_ID=VALUE: {selection}"))?;

    if id == TYPE_FACET_ID {
        state.selected_type = Some(value.to_string());
        return Ok(());
    }

    let facet = state
        .facet_mut(id)
        .ok_or_else(|| format!("unknown facet: {id}"))?;

    match facet.filter_type {
        FacetKind::List => {
            facet.select([value]);
        }
        FacetKind::Exists => {
            let on = value
                .parse::<bool>()
                .map_err(|_| format!("exists facet {id} takes true or false, got {value}"))?;
            facet.set_exists(on);
        }
        FacetKind::Type => {
            return Err(format!("category facet {id} is selected with --type"));
        }
    }
    debug!(facet = %id, %value, "applied selection");
    Ok(())
}
