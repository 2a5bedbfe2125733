//! T-SQL identifier delimiting and literal generation.
//!
//! ```ignore
//! use crate::sql::identifier::*;
//!
//! assert_eq!(delimit_identifier("My]Table"), "[My]]Table]");
//! assert_eq!(string_literal("O'Brien"), "N'O''Brien'");
//! assert_eq!(default_value_literal(&DefaultValue::Int(7), "int"), "7");
//! ```

use chrono::Timelike;

use crate::model::{ColumnValue, DefaultValue, ObjectName};
use crate::util::base_store_type;

/// Wrap an identifier in brackets, doubling any closing bracket inside it.
pub fn delimit_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// `[schema].[name]`, or `[name]` when the schema is left to the connection default.
pub fn delimit_object(name: &ObjectName) -> String {
    match &name.schema {
        Some(schema) => format!(
            "{}.{}",
            delimit_identifier(schema),
            delimit_identifier(&name.name)
        ),
        None => delimit_identifier(&name.name),
    }
}

/// Double single quotes for embedding in a string literal.
pub fn escape_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Unicode string literal: `N'...'`
pub fn string_literal(value: &str) -> String {
    format!("N'{}'", escape_string(value))
}

/// Non-unicode string literal: `'...'`
pub fn ascii_string_literal(value: &str) -> String {
    format!("'{}'", escape_string(value))
}

/// Wrap a complete statement for dynamic execution: `EXEC(N'...')`
pub fn exec_literal(statement: &str) -> String {
    format!("EXEC({})", string_literal(statement))
}

fn is_ascii_string_type(store_type: &str) -> bool {
    matches!(
        base_store_type(store_type).to_ascii_lowercase().as_str(),
        "varchar" | "char" | "text"
    )
}

/// Render a typed default value as a literal suited to `store_type`.
pub fn default_value_literal(value: &DefaultValue, store_type: &str) -> String {
    let base = base_store_type(store_type).to_ascii_lowercase();
    match value {
        DefaultValue::Null => "NULL".to_string(),
        DefaultValue::Bool(true) => "CAST(1 AS bit)".to_string(),
        DefaultValue::Bool(false) => "CAST(0 AS bit)".to_string(),
        DefaultValue::Int(v) => v.to_string(),
        DefaultValue::Decimal(v) => v.clone(),
        DefaultValue::Float(v) => format!("{:E}", v),
        DefaultValue::String(v) if is_ascii_string_type(store_type) => ascii_string_literal(v),
        DefaultValue::String(v) => string_literal(v),
        DefaultValue::Binary(bytes) => format!("0x{}", hex::encode_upper(bytes)),
        DefaultValue::Date(v) => format!("'{}'", v.format("%Y-%m-%d")),
        DefaultValue::DateTime(v) => match base.as_str() {
            "date" => format!("'{}'", v.format("%Y-%m-%d")),
            "smalldatetime" => format!("'{}'", v.format("%Y-%m-%dT%H:%M:%S")),
            "datetime" => format!("'{}'", v.format("%Y-%m-%dT%H:%M:%S%.3f")),
            _ => format!(
                "'{}.{:07}'",
                v.format("%Y-%m-%dT%H:%M:%S"),
                ticks(v.nanosecond())
            ),
        },
        DefaultValue::DateTimeOffset(v) => format!(
            "'{}.{:07}{}'",
            v.format("%Y-%m-%dT%H:%M:%S"),
            ticks(v.nanosecond()),
            v.format("%:z")
        ),
        DefaultValue::Guid(v) => format!("'{}'", v.hyphenated()),
    }
}

/// 100ns units, the precision of `datetime2(7)`. Leap-second nanos are folded back.
fn ticks(nanosecond: u32) -> u32 {
    (nanosecond % 1_000_000_000) / 100
}

/// Render a column default: literals as-is, SQL expressions parenthesized.
pub fn column_value_sql(value: &ColumnValue, store_type: &str) -> Option<String> {
    match value {
        ColumnValue::Default(v) => Some(default_value_literal(v, store_type)),
        ColumnValue::DefaultSql(sql) => Some(format!("({})", sql)),
        ColumnValue::Computed { .. } => None,
    }
}

/// The zero value of a store type, used to fill NOT NULL columns.
pub fn type_default_literal(store_type: &str) -> Option<String> {
    let literal = match base_store_type(store_type).to_ascii_lowercase().as_str() {
        "bit" => "CAST(0 AS bit)",
        "tinyint" | "smallint" | "int" | "bigint" => "0",
        "decimal" | "numeric" | "money" | "smallmoney" => "0.0",
        "float" | "real" => "0.0E0",
        "nvarchar" | "nchar" | "ntext" | "sysname" | "xml" => "N''",
        "varchar" | "char" | "text" => "''",
        "uniqueidentifier" => "'00000000-0000-0000-0000-000000000000'",
        "datetime2" => "'0001-01-01T00:00:00.0000000'",
        "datetime" | "smalldatetime" => "'1900-01-01T00:00:00.000'",
        "date" => "'0001-01-01'",
        "time" => "'00:00:00'",
        "datetimeoffset" => "'0001-01-01T00:00:00.0000000+00:00'",
        "binary" | "varbinary" | "image" => "0x",
        _ => return None,
    };
    Some(literal.to_string())
}
