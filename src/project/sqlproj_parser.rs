//! Parser for migration project files
//!
//! A project is MSBuild-style XML in the manner of a `.sqlproj`:
//!
//! ```xml
//! <Project>
//!   <PropertyGroup>
//!     <DSP>Microsoft.Data.Tools.Schema.Sql.Sql160DatabaseSchemaProvider</DSP>
//!     <DefaultSchema>dbo</DefaultSchema>
//!     <UseNamedDefaultConstraints>true</UseNamedDefaultConstraints>
//!     <Idempotent>false</Idempotent>
//!   </PropertyGroup>
//!   <ItemGroup>
//!     <SourceModel Include="snapshots\v1.json" />
//!     <TargetModel Include="snapshots\v2.json" />
//!     <Operations Include="operations.json" />
//!   </ItemGroup>
//! </Project>
//! ```

use std::path::{Path, PathBuf};

use log::warn;
use roxmltree::Document;

use crate::error::MigrationError;
use crate::model::DBO_SCHEMA;

/// SQL Server version target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlServerVersion {
    Sql130, // SQL Server 2016
    Sql140, // SQL Server 2017
    Sql150, // SQL Server 2019
    #[default]
    Sql160, // SQL Server 2022
}

impl std::str::FromStr for SqlServerVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql130" | "130" => Ok(SqlServerVersion::Sql130),
            "sql140" | "140" => Ok(SqlServerVersion::Sql140),
            "sql150" | "150" => Ok(SqlServerVersion::Sql150),
            "sql160" | "160" => Ok(SqlServerVersion::Sql160),
            _ => Err(format!("Unknown SQL Server version: {}", s)),
        }
    }
}

impl std::fmt::Display for SqlServerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sql{}", self.compatibility_mode())
    }
}

impl SqlServerVersion {
    /// Database compatibility level of the target
    pub fn compatibility_mode(&self) -> u16 {
        match self {
            SqlServerVersion::Sql130 => 130,
            SqlServerVersion::Sql140 => 140,
            SqlServerVersion::Sql150 => 150,
            SqlServerVersion::Sql160 => 160,
        }
    }
}

/// Parsed migration project
#[derive(Debug, Clone)]
pub struct MigrationProject {
    /// Project name, from the file stem
    pub name: String,
    pub target_platform: SqlServerVersion,
    pub default_schema: String,
    /// Model-level naming convention override (`None` keeps the snapshot's own flag)
    pub use_named_default_constraints: Option<bool>,
    pub idempotent: bool,
    /// Snapshot the database is migrated from; absent for an initial migration
    pub source_model: Option<PathBuf>,
    pub target_model: Option<PathBuf>,
    /// Pre-diffed operation list, used instead of diffing the two snapshots
    pub operations: Option<PathBuf>,
    pub project_dir: PathBuf,
}

/// Parse a migration project file
pub fn parse_project(path: &Path) -> Result<MigrationProject, MigrationError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| MigrationError::ProjectReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    let doc = Document::parse(&content).map_err(|e| MigrationError::ProjectParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let project_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

    let project_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Migration")
        .to_string();

    let root = doc.root_element();

    // Parse target platform
    let target_platform = find_property_value(&root, "DSP")
        .and_then(|dsp| extract_version_from_dsp(&dsp))
        .unwrap_or_default();

    // Parse default schema
    let default_schema =
        find_property_value(&root, "DefaultSchema").unwrap_or_else(|| DBO_SCHEMA.to_string());

    let use_named_default_constraints = find_property_value(&root, "UseNamedDefaultConstraints")
        .map(|v| v.eq_ignore_ascii_case("true"));

    let idempotent = find_property_value(&root, "Idempotent")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let source_model = find_item(&root, "SourceModel", &project_dir);
    let target_model = find_item(&root, "TargetModel", &project_dir);
    let operations = find_item(&root, "Operations", &project_dir);

    if target_model.is_none() && operations.is_none() {
        return Err(MigrationError::InvalidProjectFormat {
            message: format!(
                "{} names neither a TargetModel nor an Operations list",
                path.display()
            ),
        });
    }

    Ok(MigrationProject {
        name: project_name,
        target_platform,
        default_schema,
        use_named_default_constraints,
        idempotent,
        source_model,
        target_model,
        operations,
        project_dir,
    })
}

fn find_property_value(root: &roxmltree::Node, property_name: &str) -> Option<String> {
    for node in root.descendants() {
        if node.tag_name().name() == property_name {
            return node.text().map(|s| s.trim().to_string());
        }
    }
    None
}

/// First `<item Include="..."/>` of a kind, resolved against the project directory
fn find_item(root: &roxmltree::Node, item_name: &str, project_dir: &Path) -> Option<PathBuf> {
    let mut includes = root
        .descendants()
        .filter(|n| n.tag_name().name() == item_name)
        .filter_map(|n| n.attribute("Include"));

    let first = includes.next()?;
    if includes.next().is_some() {
        warn!("Multiple {} items specified, using first one", item_name);
    }
    Some(project_dir.join(first.replace('\\', "/")))
}

fn extract_version_from_dsp(dsp: &str) -> Option<SqlServerVersion> {
    if dsp.contains("Sql160") {
        Some(SqlServerVersion::Sql160)
    } else if dsp.contains("Sql150") {
        Some(SqlServerVersion::Sql150)
    } else if dsp.contains("Sql140") {
        Some(SqlServerVersion::Sql140)
    } else if dsp.contains("Sql130") {
        Some(SqlServerVersion::Sql130)
    } else {
        None
    }
}
