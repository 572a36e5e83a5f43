//! Clap argument definitions for the `kgs` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "kgs")]
#[command(about = "Compile faceted search state into search-engine requests")]
pub struct Cli {
    /// Log compiler decisions to stderr (-v debug, -vv trace). Overrides KGS_LOG.
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Location of the field schema.
#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Field schema JSON, keyed by category
    #[arg(short = 's', long)]
    pub schema: PathBuf,
}

/// Arguments for `kgs sanitize`.
#[derive(Args, Debug, Clone)]
pub struct SanitizeCommand {
    /// Raw query strings
    #[arg(required = true)]
    pub queries: Vec<String>,
}

/// Arguments for `kgs parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query string
    pub query: String,
}

/// Arguments for `kgs facets`.
#[derive(Args, Debug, Clone)]
pub struct FacetsCommand {
    #[command(flatten)]
    /// Schema location.
    pub schema: SchemaArgs,

    /// Only show facets of this category
    #[arg(short = 't', long = "type")]
    pub category: Option<String>,

    /// Output descriptors as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `kgs payload`.
#[derive(Args, Debug, Clone)]
pub struct PayloadCommand {
    #[command(flatten)]
    /// Schema location.
    pub schema: SchemaArgs,

    /// Search state JSON to start from
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Free-text query
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Selected category
    #[arg(short = 't', long = "type")]
    pub category: Option<String>,

    /// Sort option key or param (e.g. newestFirst, title.value.keyword_asc)
    #[arg(long)]
    pub sort: Option<String>,

    /// 1-based result page
    #[arg(short = 'p', long)]
    pub page: Option<usize>,

    /// Facet selection, FACET_ID=VALUE (repeatable; VALUE true/false for exists facets)
    #[arg(long = "select", value_name = "FACET_ID=VALUE")]
    pub selections: Vec<String>,

    /// Print compact JSON without colour
    #[arg(long)]
    pub raw: bool,
}

/// Supported `kgs` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Sanitize free-text queries and show the augmented result
    #[command(after_help = "\
EXAMPLES:
  kgs sanitize brain
  kgs sanitize 'brain and hippocampus'
  kgs sanitize 'title:cortex~0.8 \"visual cortex\"'")]
    Sanitize(SanitizeCommand),

    /// Show the parsed query tree and the terms eligible for augmentation
    #[command(after_help = "\
QUERY SYNTAX:
  term              Bare word, may end in * or ?
  \"phrase\"          Exact phrase, \"a b\"~3 for proximity
  field:term        Field-scoped term or group
  term^2            Boost
  term~ term~0.8    Fuzzy match
  +term -term       Required / prohibited
  AND OR NOT        Boolean operators (also && || !)
  [a TO b] {a TO b} Inclusive / exclusive range")]
    Parse(ParseCommand),

    /// List the facets a field schema yields
    Facets(FacetsCommand),

    /// Print the search request body for a search state
    Payload(PayloadCommand),

    /// Show effective configuration settings
    Config,
}
