//! Implementation of `kgs facets`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use kgs_compiler::{FacetDescriptor, FacetOrder, FacetShape, SortChoice, sort_options};
use kgs_highlight::{heading, muted};
use serde::Serialize;

use crate::cli::{args::FacetsCommand, context::CommandContext};

/// JSON output for `kgs facets --json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFacetsOutput<'a> {
    /// Category selected when the user has picked none.
    default_type: Option<&'a str>,
    /// Facet descriptors.
    facets: Vec<&'a FacetDescriptor>,
    /// Sort options the schema offers.
    sort_options: Vec<SortChoice>,
}

/// Lists the facet descriptors derived from a schema.
pub fn run(ctx: &CommandContext, cmd: &FacetsCommand) -> ExitCode {
    let schema = match ctx.schema(&cmd.schema.schema) {
        Ok(schema) => schema,
        Err(code) => return code,
    };

    if let Some(category) = &cmd.category
        && schema.get(category).is_none()
    {
        eprintln!("error: unknown category: {category}");
        return ExitCode::FAILURE;
    }

    let flat = ctx.flatten(&schema);
    let facets: Vec<&FacetDescriptor> = flat
        .facets_by_type
        .iter()
        .filter(|(category, _)| cmd.category.as_ref().is_none_or(|c| c == *category))
        .flat_map(|(_, facets)| facets)
        .collect();

    if cmd.json {
        let output = JsonFacetsOutput {
            default_type: schema.default_selected_type(),
            facets,
            sort_options: sort_options(&schema),
        };
        return match serde_json::to_string_pretty(&output) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to serialize facets: {e}");
                ExitCode::FAILURE
            }
        };
    }

    println!("{}", heading("Facets:"));
    if facets.is_empty() {
        println!("  {}", muted("(none)"));
    } else {
        println!("{}", facet_table(&facets));
    }
    println!();

    println!("{}", heading("Sort options:"));
    for choice in sort_options(&schema) {
        let marker = if choice.default_option { " (default)" } else { "" };
        println!("  {} {}{}", choice.param, muted(&choice.label), marker);
    }

    if let Some(category) = schema.default_selected_type() {
        println!();
        println!("{} {category}", heading("Default category:"));
    }
    ExitCode::SUCCESS
}

/// One row per facet.
fn facet_table(facets: &[&FacetDescriptor]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Id", "Kind", "Shape", "Field", "Size", "Order", "Select"]);

    for facet in facets {
        let shape = match &facet.shape {
            FacetShape::Flat => "flat".to_string(),
            FacetShape::NestedChild { path, .. } => format!("nested ({path})"),
            FacetShape::HierarchicalChild { missing_term, .. } => {
                format!("hierarchical (missing: {missing_term})")
            }
        };
        let order = match facet.filter_order {
            FacetOrder::ByValue => "value",
            FacetOrder::ByCount => "count",
        };
        let select = if facet.exclusive_selection { "AND" } else { "OR" };
        table.add_row(vec![
            Cell::new(&facet.id),
            Cell::new(format!("{:?}", facet.filter_type).to_lowercase()),
            Cell::new(shape),
            Cell::new(facet.facet_key()),
            Cell::new(facet.size.to_string()),
            Cell::new(order),
            Cell::new(select),
        ]);
    }
    table
}
