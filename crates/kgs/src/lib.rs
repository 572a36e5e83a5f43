//! kgs: faceted search query compiler
//!
//! The `kgs` binary exercises the compiler from the shell: it sanitizes free-text queries,
//! shows how the query grammar reads them, lists the facets a field schema yields, and prints
//! the search-engine request body for a given search state.

#![warn(missing_docs)]

pub mod cli;
