//! Rendering of sequenced steps into T-SQL batches
//!
//! Each operation becomes one batch. Statements that depend on facts only known when the
//! script runs (the name of an engine-generated default constraint, the connection's
//! default schema) are rendered as `DECLARE` + dynamic `EXEC` inside the same batch.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::builder::CommandBuilder;
use super::identifier::*;
use super::{same_expression, MigrationCommand};
use crate::context::CompileContext;
use crate::model::{
    ColumnElement, ColumnValue, DataCompression, ForeignKeyElement, IdentitySpec, ObjectName,
    PrimaryKeyElement, ReferentialAction, TableAnnotations, DBO_SCHEMA,
};
use crate::operations::*;
use crate::sequencer::MigrationStep;
use crate::util::eq_ci;
use crate::CompileOptions;

/// `GO` batch separator lines inside raw SQL
static BATCH_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*GO\s*$").expect("valid batch separator regex"));

const DESCRIPTION_PROPERTY: &str = "'MS_Description'";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeriodRole {
    Start,
    End,
}

pub struct SqlGenerator<'a> {
    idempotent: bool,
    context: &'a mut CompileContext,
    builder: CommandBuilder,
    /// Variables already declared in the current batch
    declared_description: bool,
    declared_default_schema: bool,
}

impl<'a> SqlGenerator<'a> {
    pub fn new(options: &CompileOptions, context: &'a mut CompileContext) -> Self {
        Self {
            idempotent: options.idempotent,
            context,
            builder: CommandBuilder::new(),
            declared_description: false,
            declared_default_schema: false,
        }
    }

    /// Render every step, in order
    pub fn generate(mut self, steps: &[MigrationStep]) -> Vec<MigrationCommand> {
        for step in steps {
            self.step(step);
        }
        let commands = self.builder.into_commands();
        debug!("Generated {} commands", commands.len());
        commands
    }

    fn end(&mut self, suppress_transaction: bool) {
        self.builder.end_command(suppress_transaction);
        self.declared_description = false;
        self.declared_default_schema = false;
    }

    /// Append a statement, wrapped in `EXEC` when generating an idempotent script
    fn guarded(&mut self, statement: &str) {
        if self.idempotent {
            let body = statement.trim_end_matches(';');
            self.builder
                .append_line(&format!("{};", exec_literal(body)));
        } else {
            self.builder.append_lines(statement);
        }
    }

    fn step(&mut self, step: &MigrationStep) {
        match step {
            MigrationStep::Operation(operation) => self.operation(operation),
            MigrationStep::DisableVersioning { table } => {
                self.builder.append(&format!(
                    "ALTER TABLE {} SET (SYSTEM_VERSIONING = OFF)",
                    delimit_object(table)
                ));
                self.end(true);
            }
            MigrationStep::EnableVersioning { table, history } => {
                self.enable_versioning(table, history);
                self.end(true);
            }
            MigrationStep::AddPeriod { table, start, end } => {
                self.period_statement(&format!(
                    "ALTER TABLE {} ADD PERIOD FOR SYSTEM_TIME ({}, {})",
                    delimit_object(table),
                    delimit_identifier(start),
                    delimit_identifier(end)
                ));
                self.end(false);
            }
            MigrationStep::DropPeriod { table } => {
                self.builder.append(&format!(
                    "ALTER TABLE {} DROP PERIOD FOR SYSTEM_TIME",
                    delimit_object(table)
                ));
                self.end(false);
            }
            MigrationStep::HidePeriodColumn { table, column } => {
                self.period_statement(&format!(
                    "ALTER TABLE {} ALTER COLUMN {} ADD HIDDEN",
                    delimit_object(table),
                    delimit_identifier(column)
                ));
                self.end(false);
            }
        }
    }

    fn period_statement(&mut self, statement: &str) {
        if self.idempotent {
            self.builder.append(&exec_literal(statement));
        } else {
            self.builder.append(statement);
        }
    }

    fn enable_versioning(&mut self, table: &ObjectName, history: &ObjectName) {
        match &history.schema {
            Some(_) => {
                self.builder.append(&format!(
                    "ALTER TABLE {} SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = {}))",
                    delimit_object(table),
                    delimit_object(history)
                ));
            }
            None => {
                self.builder
                    .append_line("DECLARE @historyTableSchema sysname = SCHEMA_NAME()")
                    .append(&format!(
                        "EXEC(N'ALTER TABLE {} SET (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [' + @historyTableSchema + '].{}))')",
                        escape_string(&delimit_object(table)),
                        escape_string(&delimit_identifier(&history.name))
                    ));
            }
        }
    }

    fn operation(&mut self, operation: &MigrationOperation) {
        match operation {
            MigrationOperation::EnsureSchema(op) => self.ensure_schema(&op.name),
            MigrationOperation::CreateTable(op) => self.create_table(op),
            MigrationOperation::DropTable(op) => {
                self.builder
                    .append_line(&format!("DROP TABLE {};", delimit_object(&op.table)));
            }
            MigrationOperation::RenameTable(op) => self.rename_table(op),
            MigrationOperation::AlterTable(op) => self.alter_table(op),
            MigrationOperation::AddColumn(op) => self.add_column(&op.table, &op.column),
            MigrationOperation::DropColumn(op) => {
                self.drop_column(&op.table, &op.name, op.default_constraint_name.as_deref())
            }
            MigrationOperation::AlterColumn(op) => self.alter_column(op),
            MigrationOperation::RenameColumn(op) => self.sp_rename(
                &format!(
                    "{}.{}",
                    delimit_object(&op.table),
                    delimit_identifier(&op.name)
                ),
                &op.new_name,
                "COLUMN",
            ),
            MigrationOperation::AddPrimaryKey(op) => {
                self.builder.append_line(&format!(
                    "ALTER TABLE {} ADD {};",
                    delimit_object(&op.table),
                    primary_key_definition(&op.primary_key)
                ));
            }
            MigrationOperation::DropPrimaryKey(op) => self.drop_constraint(&op.table, &op.name),
            MigrationOperation::AddIndex(op) => self.add_index(op),
            MigrationOperation::DropIndex(op) => {
                self.builder.append_line(&format!(
                    "DROP INDEX {} ON {};",
                    delimit_identifier(&op.name),
                    delimit_object(&op.table)
                ));
            }
            MigrationOperation::RenameIndex(op) => self.sp_rename(
                &format!(
                    "{}.{}",
                    delimit_object(&op.table),
                    delimit_identifier(&op.name)
                ),
                &op.new_name,
                "INDEX",
            ),
            MigrationOperation::AddForeignKey(op) => {
                self.builder.append_line(&format!(
                    "ALTER TABLE {} ADD {};",
                    delimit_object(&op.table),
                    foreign_key_definition(&op.foreign_key)
                ));
            }
            MigrationOperation::DropForeignKey(op) => self.drop_constraint(&op.table, &op.name),
            MigrationOperation::AddCheckConstraint(op) => {
                let statement = format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({});",
                    delimit_object(&op.table),
                    delimit_identifier(&op.check.name),
                    op.check.sql
                );
                self.guarded(&statement);
            }
            MigrationOperation::DropCheckConstraint(op) => {
                self.drop_constraint(&op.table, &op.name)
            }
            MigrationOperation::Sql(op) => {
                self.sql(op);
                return;
            }
        }
        self.end(false);
    }

    fn ensure_schema(&mut self, schema: &str) {
        if eq_ci(schema, DBO_SCHEMA) {
            return;
        }
        self.builder.append_line(&format!(
            "IF SCHEMA_ID({}) IS NULL {};",
            string_literal(schema),
            exec_literal(&format!("CREATE SCHEMA {};", delimit_identifier(schema)))
        ));
    }

    fn sql(&mut self, op: &SqlOperation) {
        for batch in BATCH_SEPARATOR.split(&op.sql) {
            if batch.trim().is_empty() {
                continue;
            }
            self.builder.append_lines(batch.trim_matches('\n'));
            self.end(op.suppress_transaction);
        }
    }

    fn create_table(&mut self, op: &CreateTableOperation) {
        let table = &op.table;
        let name = table.object_name();
        let annotations = &table.annotations;

        let mut definitions: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let role = period_role(annotations, &column.name);
                self.column_definition(column, role, false)
            })
            .collect();
        if let Some(pk) = &table.primary_key {
            definitions.push(primary_key_definition(pk));
        }
        definitions.extend(table.foreign_keys.iter().map(foreign_key_definition));
        definitions.extend(table.check_constraints.iter().map(|check| {
            format!(
                "CONSTRAINT {} CHECK ({})",
                delimit_identifier(&check.name),
                check.sql
            )
        }));
        if annotations.is_temporal {
            definitions.push(format!(
                "PERIOD FOR SYSTEM_TIME({}, {})",
                delimit_identifier(annotations.period_start()),
                delimit_identifier(annotations.period_end())
            ));
        }

        let body = format!(
            "CREATE TABLE {} (\n    {}\n)",
            delimit_object(&name),
            definitions.join(",\n    ")
        );
        let compression = annotations
            .data_compression
            .map(|c| format!("DATA_COMPRESSION = {}", c));

        match table.history_table() {
            Some(history) if history.schema.is_none() => {
                let extra = compression
                    .map(|c| format!(", {}", c))
                    .unwrap_or_default();
                self.builder
                    .append_line("DECLARE @historyTableSchema sysname = SCHEMA_NAME()")
                    .append_lines(&format!(
                        "EXEC(N'{} WITH (SYSTEM_VERSIONING = ON (HISTORY_TABLE = [' + @historyTableSchema + N'].{}){})');",
                        escape_string(&body),
                        escape_string(&delimit_identifier(&history.name)),
                        escape_string(&extra)
                    ));
            }
            Some(history) => {
                let mut options = vec![format!(
                    "SYSTEM_VERSIONING = ON (HISTORY_TABLE = {})",
                    delimit_object(&history)
                )];
                options.extend(compression);
                self.builder
                    .append_lines(&format!("{} WITH ({});", body, options.join(", ")));
            }
            None => match compression {
                Some(c) => {
                    self.builder
                        .append_lines(&format!("{} WITH ({});", body, c));
                }
                None => {
                    self.builder.append_lines(&format!("{};", body));
                }
            },
        }

        if let Some(comment) = &table.comment {
            self.add_description(&name, None, comment);
        }
        for column in &table.columns {
            if let Some(comment) = &column.comment {
                self.add_description(&name, Some(&column.name), comment);
            }
        }
    }

    fn rename_table(&mut self, op: &RenameTableOperation) {
        let (from, to) = (&op.table, &op.new_table);
        if from.name != to.name {
            self.sp_rename(&delimit_object(from), &to.name, "OBJECT");
        }
        if from.schema != to.schema {
            // sp_rename keeps the schema, so the object now sits at old schema + new name
            let renamed = to.with_schema(from.schema.clone());
            self.transfer(&renamed, to.schema.as_deref());
        }
    }

    fn transfer(&mut self, object: &ObjectName, schema: Option<&str>) {
        match schema {
            Some(schema) => {
                self.builder.append_line(&format!(
                    "ALTER SCHEMA {} TRANSFER {};",
                    delimit_identifier(schema),
                    delimit_object(object)
                ));
            }
            None => {
                self.builder
                    .append_line("DECLARE @defaultSchema sysname = SCHEMA_NAME();")
                    .append_line(&format!(
                        "EXEC(N'ALTER SCHEMA [' + @defaultSchema + N'] TRANSFER {};');",
                        escape_string(&delimit_object(object))
                    ));
            }
        }
    }

    fn sp_rename(&mut self, object: &str, new_name: &str, kind: &str) {
        self.builder.append_line(&format!(
            "EXEC sp_rename {}, {}, {};",
            string_literal(object),
            string_literal(new_name),
            ascii_string_literal(kind)
        ));
    }

    fn alter_table(&mut self, op: &AlterTableOperation) {
        let old_compression = op.old_annotations.data_compression;
        let new_compression = op.annotations.data_compression;
        if old_compression != new_compression {
            self.builder.append_line(&format!(
                "ALTER TABLE {} REBUILD PARTITION = ALL WITH (DATA_COMPRESSION = {});",
                delimit_object(&op.table),
                new_compression.unwrap_or(DataCompression::None)
            ));
        }
        if op.old_comment != op.comment {
            if op.old_comment.is_some() {
                self.drop_description(&op.table, None);
            }
            if let Some(comment) = &op.comment {
                self.add_description(&op.table, None, comment);
            }
        }
    }

    fn add_column(&mut self, table: &ObjectName, column: &ColumnElement) {
        let definition = self.column_definition(column, None, true);
        let statement = format!("ALTER TABLE {} ADD {};", delimit_object(table), definition);
        if column.is_computed() {
            self.guarded(&statement);
        } else {
            self.builder.append_line(&statement);
        }
        if let Some(comment) = &column.comment {
            self.add_description(table, Some(&column.name), comment);
        }
    }

    fn drop_column(&mut self, table: &ObjectName, column: &str, constraint: Option<&str>) {
        self.drop_default(table, column, constraint);
        self.builder.append_line(&format!(
            "ALTER TABLE {} DROP COLUMN {};",
            delimit_object(table),
            delimit_identifier(column)
        ));
    }

    fn drop_constraint(&mut self, table: &ObjectName, name: &str) {
        self.builder.append_line(&format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            delimit_object(table),
            delimit_identifier(name)
        ));
    }

    /// Drop a column's default constraint by name, or look the name up when it is not known
    fn drop_default(&mut self, table: &ObjectName, column: &str, constraint: Option<&str>) {
        if let Some(name) = constraint {
            self.drop_constraint(table, name);
            return;
        }
        let variable = self.context.next_variable();
        self.builder
            .append_line(&format!("DECLARE {} sysname;", variable))
            .append_line(&format!("SELECT {} = [d].[name]", variable))
            .append_line("FROM [sys].[default_constraints] [d]")
            .append_line("INNER JOIN [sys].[columns] [c] ON [d].[parent_column_id] = [c].[column_id] AND [d].[parent_object_id] = [c].[object_id]")
            .append_line(&format!(
                "WHERE ([d].[parent_object_id] = OBJECT_ID({}) AND [c].[name] = {});",
                string_literal(&delimit_object(table)),
                string_literal(column)
            ))
            .append_line(&format!(
                "IF {} IS NOT NULL EXEC(N'ALTER TABLE {} DROP CONSTRAINT [' + {} + '];');",
                variable,
                escape_string(&delimit_object(table)),
                variable
            ));
    }

    fn alter_column(&mut self, op: &AlterColumnOperation) {
        let (old, new) = (&op.old_column, &op.column);
        let table = &op.table;

        if computation_changed(old, new) {
            // A computed definition cannot be altered in place
            self.drop_column(table, &new.name, old.default_constraint_name.as_deref());
            self.end(false);
            self.add_column(table, new);
            return;
        }

        let alter = old.store_type != new.store_type
            || old.is_nullable != new.is_nullable
            || old.is_sparse != new.is_sparse
            || old.is_row_version != new.is_row_version;
        let default_changed = old.default() != new.default()
            || old.default_constraint_name != new.default_constraint_name;

        if alter || default_changed {
            self.drop_default(table, &new.name, old.default_constraint_name.as_deref());
        }

        if new.is_sparse && !old.is_sparse {
            self.disable_compression(table);
        }

        if old.is_nullable && !new.is_nullable && !new.is_computed() {
            let fill = new
                .default()
                .and_then(|v| column_value_sql(v, &new.store_type))
                .or_else(|| {
                    op.fill_value
                        .as_ref()
                        .map(|v| default_value_literal(v, &new.store_type))
                })
                .or_else(|| type_default_literal(&new.store_type));
            if let Some(fill) = fill {
                let statement = format!(
                    "UPDATE {} SET {} = {} WHERE {} IS NULL;",
                    delimit_object(table),
                    delimit_identifier(&new.name),
                    fill,
                    delimit_identifier(&new.name)
                );
                self.guarded(&statement);
            }
        }

        if alter {
            self.builder.append_line(&format!(
                "ALTER TABLE {} ALTER COLUMN {} {}{} {};",
                delimit_object(table),
                delimit_identifier(&new.name),
                new.store_type,
                if new.is_sparse { " SPARSE" } else { "" },
                nullability(new.is_nullable)
            ));
        }

        if alter || default_changed {
            if let Some(value) = new.default().and_then(|v| column_value_sql(v, &new.store_type))
            {
                let constraint = new
                    .default_constraint_name
                    .as_deref()
                    .map(|n| format!("CONSTRAINT {} ", delimit_identifier(n)))
                    .unwrap_or_default();
                self.builder.append_line(&format!(
                    "ALTER TABLE {} ADD {}DEFAULT {} FOR {};",
                    delimit_object(table),
                    constraint,
                    value,
                    delimit_identifier(&new.name)
                ));
            }
        }

        if old.comment != new.comment {
            if old.comment.is_some() {
                self.drop_description(table, Some(&new.name));
            }
            if let Some(comment) = &new.comment {
                self.add_description(table, Some(&new.name), comment);
            }
        }
    }

    /// Sparse columns cannot live in compressed partitions
    fn disable_compression(&mut self, table: &ObjectName) {
        let schema_id = match &table.schema {
            Some(schema) => format!("SCHEMA_ID({})", string_literal(schema)),
            None => "SCHEMA_ID()".to_string(),
        };
        self.builder
            .append_line(&format!(
                "IF EXISTS (SELECT 1 FROM [sys].[tables] [t] INNER JOIN [sys].[partitions] [p] ON [t].[object_id] = [p].[object_id] WHERE [t].[name] = {} AND [t].[schema_id] = {} AND [p].[data_compression] <> 0)",
                string_literal(&table.name),
                schema_id
            ))
            .append_line(&format!(
                "{};",
                exec_literal(&format!(
                    "ALTER TABLE {} REBUILD PARTITION = ALL WITH (DATA_COMPRESSION = NONE);",
                    delimit_object(table)
                ))
            ));
    }

    fn add_index(&mut self, op: &AddIndexOperation) {
        let index = &op.index;
        let mut statement = String::from("CREATE ");
        if index.is_unique {
            statement.push_str("UNIQUE ");
        }
        statement.push_str(clustering(index.clustered));
        statement.push_str(&format!(
            "INDEX {} ON {} ({})",
            delimit_identifier(&index.name),
            delimit_object(&op.table),
            column_list(&index.columns)
        ));
        if !index.include.is_empty() {
            statement.push_str(&format!(" INCLUDE ({})", column_list(&index.include)));
        }
        match &index.filter {
            Some(filter) => {
                statement.push_str(&format!(" WHERE {};", filter));
                self.guarded(&statement);
            }
            None => {
                statement.push(';');
                self.builder.append_line(&statement);
            }
        }
    }

    /// `fill_missing` gives a NOT NULL column without a default the type's zero value, so
    /// the column can be added to a table that already has rows
    fn column_definition(
        &self,
        column: &ColumnElement,
        period: Option<PeriodRole>,
        fill_missing: bool,
    ) -> String {
        let mut definition = delimit_identifier(&column.name);

        if let Some(ColumnValue::Computed { sql, stored }) = &column.value {
            definition.push_str(&format!(" AS {}", sql));
            if *stored {
                definition.push_str(" PERSISTED");
            }
            return definition;
        }

        definition.push(' ');
        definition.push_str(&column.store_type);
        match period {
            Some(PeriodRole::Start) => definition.push_str(" GENERATED ALWAYS AS ROW START HIDDEN"),
            Some(PeriodRole::End) => definition.push_str(" GENERATED ALWAYS AS ROW END HIDDEN"),
            None => {}
        }
        if column.is_sparse {
            definition.push_str(" SPARSE");
        }
        definition.push(' ');
        definition.push_str(nullability(column.is_nullable));

        if period.is_none() {
            let value = column
                .default()
                .and_then(|v| column_value_sql(v, &column.store_type))
                .or_else(|| fill_missing.then(|| implicit_fill(column)).flatten());
            if let Some(value) = value {
                if let Some(name) = &column.default_constraint_name {
                    definition.push_str(&format!(" CONSTRAINT {}", delimit_identifier(name)));
                }
                definition.push_str(&format!(" DEFAULT {}", value));
            }
        }

        if let Some(identity) = &column.identity {
            definition.push_str(&identity_clause(identity));
        }
        definition
    }

    fn declare_default_schema(&mut self) {
        if !self.declared_default_schema {
            self.builder
                .append_line("DECLARE @defaultSchema AS sysname;")
                .append_line("SET @defaultSchema = SCHEMA_NAME();");
            self.declared_default_schema = true;
        }
    }

    fn description_target(&mut self, table: &ObjectName, column: Option<&str>) -> String {
        let schema = match &table.schema {
            Some(schema) => string_literal(schema),
            None => {
                self.declare_default_schema();
                "@defaultSchema".to_string()
            }
        };
        let mut target = format!("'SCHEMA', {}, 'TABLE', {}", schema, string_literal(&table.name));
        if let Some(column) = column {
            target.push_str(&format!(", 'COLUMN', {}", string_literal(column)));
        }
        target
    }

    fn add_description(&mut self, table: &ObjectName, column: Option<&str>, description: &str) {
        let target = self.description_target(table, column);
        if !self.declared_description {
            self.builder
                .append_line("DECLARE @description AS sql_variant;");
            self.declared_description = true;
        }
        self.builder
            .append_line(&format!("SET @description = {};", string_literal(description)))
            .append_line(&format!(
                "EXEC sp_addextendedproperty {}, @description, {};",
                DESCRIPTION_PROPERTY, target
            ));
    }

    fn drop_description(&mut self, table: &ObjectName, column: Option<&str>) {
        let target = self.description_target(table, column);
        self.builder.append_line(&format!(
            "EXEC sp_dropextendedproperty {}, {};",
            DESCRIPTION_PROPERTY, target
        ));
    }
}

/// Type default for a NOT NULL column added without a default of its own
fn implicit_fill(column: &ColumnElement) -> Option<String> {
    if column.is_nullable || !column.accepts_default() {
        return None;
    }
    let fill = type_default_literal(&column.store_type);
    if fill.is_none() {
        warn!(
            "Column {} ({}) is NOT NULL without a default and has no type default",
            column.name, column.store_type
        );
    }
    fill
}

fn period_role(annotations: &TableAnnotations, column: &str) -> Option<PeriodRole> {
    if !annotations.is_temporal {
        None
    } else if column == annotations.period_start() {
        Some(PeriodRole::Start)
    } else if column == annotations.period_end() {
        Some(PeriodRole::End)
    } else {
        None
    }
}

fn computation_changed(old: &ColumnElement, new: &ColumnElement) -> bool {
    match (&old.value, &new.value) {
        (
            Some(ColumnValue::Computed { sql: a, stored: x }),
            Some(ColumnValue::Computed { sql: b, stored: y }),
        ) => x != y || !same_expression(a, b),
        _ => old.is_computed() || new.is_computed(),
    }
}

fn nullability(is_nullable: bool) -> &'static str {
    if is_nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

fn identity_clause(identity: &IdentitySpec) -> String {
    if *identity == IdentitySpec::default() {
        " IDENTITY".to_string()
    } else {
        format!(" IDENTITY({}, {})", identity.seed, identity.increment)
    }
}

fn clustering(clustered: Option<bool>) -> &'static str {
    match clustered {
        Some(true) => "CLUSTERED ",
        Some(false) => "NONCLUSTERED ",
        None => "",
    }
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| delimit_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn primary_key_definition(pk: &PrimaryKeyElement) -> String {
    format!(
        "CONSTRAINT {} PRIMARY KEY {}({})",
        delimit_identifier(&pk.name),
        clustering(pk.clustered),
        column_list(&pk.columns)
    )
}

fn foreign_key_definition(fk: &ForeignKeyElement) -> String {
    let mut definition = format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        delimit_identifier(&fk.name),
        column_list(&fk.columns),
        delimit_object(&fk.principal_table),
        column_list(&fk.principal_columns)
    );
    if fk.on_delete != ReferentialAction::NoAction {
        definition.push_str(&format!(" ON DELETE {}", fk.on_delete));
    }
    definition
}
