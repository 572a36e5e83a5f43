//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use kgs_compiler::{FlattenedSchema, QueryCompiler, Sanitizer, Schema, flatten};
use kgs_config::Config;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (default if no config files were found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = env::current_dir().map_err(|e| {
            eprintln!("error: could not determine current directory: {e}");
            ExitCode::FAILURE
        })?;
        let config = Config::load(&cwd).map_err(|e| {
            eprintln!("error: failed to load configuration: {e}");
            ExitCode::FAILURE
        })?;
        Ok(Self { cwd, config })
    }

    /// A sanitizer with the configured thresholds.
    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.config.tweaking.clone())
    }

    /// Reads a schema file, resolved against the working directory.
    pub fn schema(&self, path: &Path) -> Result<Schema, ExitCode> {
        Schema::load(&self.cwd.join(path)).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Flattens a schema with the configured facet sizes and highlight fields.
    pub fn flatten(&self, schema: &Schema) -> FlattenedSchema {
        flatten(
            schema,
            &self.config.facets,
            &self.config.search.highlight_fields,
        )
    }

    /// A compiler for the given schema.
    pub fn compiler(&self, schema: &Schema) -> QueryCompiler {
        QueryCompiler::new(
            self.flatten(schema),
            self.sanitizer(),
            self.config.facets.clone(),
        )
    }
}
