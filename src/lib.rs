//! rust-sqlmigrate: a schema migration compiler for SQL Server
//!
//! This library turns two schema snapshots, or a pre-diffed list of operations, into an
//! ordered list of T-SQL batches. Along the way it names default constraints, expands
//! changes to system-versioned (temporal) tables into the statement sequences SQL Server
//! requires, and orders everything so each batch is legal when it runs.

pub mod context;
pub mod error;
pub mod model;
pub mod naming;
pub mod operations;
pub mod project;
pub mod sequencer;
pub mod sql;
pub mod temporal;
mod util;

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::info;

pub use error::MigrationError;
pub use project::SqlServerVersion;
pub use sql::{MigrationCommand, MigrationScript};

use context::CompileContext;
use model::SchemaModel;
use operations::MigrationOperation;
use sql::SqlGenerator;

/// Options for one compilation
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Wrap statements that depend on runtime state so the script can be re-run
    pub idempotent: bool,
    /// Overrides the models' naming convention flag when set
    pub use_named_default_constraints: Option<bool>,
    /// Schema the connection defaults to; it is never created by the script
    pub default_schema: Option<String>,
    pub target_platform: SqlServerVersion,
}

/// Compile a migration.
///
/// With `operations`, the list is used as authored and `new` (when given) only supplies
/// explicit constraint names to route around. Without it, `old` and `new` are diffed; a
/// missing `old` means an empty database.
pub fn compile(
    old: Option<&SchemaModel>,
    new: Option<&SchemaModel>,
    operations: Option<Vec<MigrationOperation>>,
    options: &CompileOptions,
) -> Result<MigrationScript, MigrationError> {
    if let Some(model) = old {
        model.validate()?;
    }
    if let Some(model) = new {
        model.validate()?;
    }

    let mut context = CompileContext::new();
    if let Some(schema) = &options.default_schema {
        context.mark_schema_known(schema);
    }
    if let Some(model) = old {
        context.seed_schemas(model);
    }

    let operations = match operations {
        Some(operations) => {
            let use_convention = options
                .use_named_default_constraints
                .or(new.map(|m| m.use_named_default_constraints))
                .unwrap_or(false);
            let current = match (old, options.use_named_default_constraints) {
                (Some(model), Some(flag)) => Some(with_convention(model.clone(), flag)),
                (model, _) => model.cloned(),
            };
            naming::annotate_operations(
                operations,
                &mut context.constraint_names,
                current.as_ref(),
                new,
                use_convention,
            )
        }
        None => {
            let new = new.ok_or_else(|| {
                MigrationError::invalid_model("nothing to compile: no target model or operations")
            })?;
            let old = old.cloned().unwrap_or_default();
            let (old, new) = match options.use_named_default_constraints {
                Some(flag) => (with_convention(old, flag), with_convention(new.clone(), flag)),
                None => (old, new.clone()),
            };
            operations::diff_models(&old, &new)
        }
    };
    info!("Compiling {} operations", operations.len());

    let steps = sequencer::sequence(operations, &mut context, old)?;
    let commands = SqlGenerator::new(options, &mut context).generate(&steps);
    info!("Generated {} batches", commands.len());

    Ok(MigrationScript::new(commands))
}

fn with_convention(mut model: SchemaModel, flag: bool) -> SchemaModel {
    model.use_named_default_constraints = flag;
    model
}

/// Operations that migrate the `source` snapshot (or an empty database) to `target`
pub fn diff_snapshots(
    source: Option<&Path>,
    target: &Path,
) -> Result<Vec<MigrationOperation>, MigrationError> {
    let old = match source {
        Some(path) => model::load_snapshot(path)?,
        None => SchemaModel::new(),
    };
    let new = model::load_snapshot(target)?;
    Ok(operations::diff_models(&old, &new))
}

/// Options for generating a migration script file
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Project file naming snapshots and settings
    pub project_path: Option<PathBuf>,
    /// Snapshot paths; these win over the project's items
    pub source_model: Option<PathBuf>,
    pub target_model: Option<PathBuf>,
    pub operations: Option<PathBuf>,
    /// Output path for the script (defaults to bin/<project>.sql next to the project)
    pub output_path: Option<PathBuf>,
    pub idempotent: bool,
    pub use_named_default_constraints: Option<bool>,
    pub target_platform: Option<SqlServerVersion>,
}

/// Generate a migration script file and return its path
pub fn generate_migration(options: GenerateOptions) -> Result<PathBuf> {
    // Step 1: Parse the project file, if any
    let project = match &options.project_path {
        Some(path) => {
            info!("Reading project: {}", path.display());
            Some(project::parse_project(path)?)
        }
        None => None,
    };

    // Step 2: Merge command line settings over project settings
    let source_path = options
        .source_model
        .clone()
        .or_else(|| project.as_ref().and_then(|p| p.source_model.clone()));
    let target_path = options
        .target_model
        .clone()
        .or_else(|| project.as_ref().and_then(|p| p.target_model.clone()));
    let operations_path = options
        .operations
        .clone()
        .or_else(|| project.as_ref().and_then(|p| p.operations.clone()));
    let compile_options = CompileOptions {
        idempotent: options.idempotent || project.as_ref().is_some_and(|p| p.idempotent),
        use_named_default_constraints: options
            .use_named_default_constraints
            .or_else(|| project.as_ref().and_then(|p| p.use_named_default_constraints)),
        default_schema: project.as_ref().map(|p| p.default_schema.clone()),
        target_platform: options
            .target_platform
            .or_else(|| project.as_ref().map(|p| p.target_platform))
            .unwrap_or_default(),
    };

    // Step 3: Load snapshots and operations
    let old = source_path
        .as_deref()
        .map(model::load_snapshot)
        .transpose()?;
    let new = target_path
        .as_deref()
        .map(model::load_snapshot)
        .transpose()?;
    let operations = operations_path
        .as_deref()
        .map(model::load_operations)
        .transpose()?;

    // Step 4: Compile
    let script = compile(old.as_ref(), new.as_ref(), operations, &compile_options)?;

    // Step 5: Determine output path
    let output_path = options.output_path.clone().unwrap_or_else(|| match &project {
        Some(project) => project
            .project_dir
            .join("bin")
            .join(format!("{}.sql", project.name)),
        None => PathBuf::from("migration.sql"),
    });

    // Step 6: Write the script
    write_script(&script, &compile_options, &output_path)?;
    info!(
        "Wrote {} batches to {} (checksum {})",
        script.len(),
        output_path.display(),
        script.checksum()
    );

    Ok(output_path)
}

fn write_script(
    script: &MigrationScript,
    options: &CompileOptions,
    path: &Path,
) -> Result<(), MigrationError> {
    let header = format!(
        "-- Migration script generated by rust-sqlmigrate\n\
         -- Target platform: {} (compatibility level {})\n\
         -- Checksum: {}\n\n",
        options.target_platform,
        options.target_platform.compatibility_mode(),
        script.checksum()
    );
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, format!("{}{}", header, script.to_sql()))
    };
    write().map_err(|e| MigrationError::ScriptWriteError {
        path: path.to_path_buf(),
        source: e,
    })
}
