//! Schema model element types

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::annotations::TableAnnotations;

/// A schema-qualified object name. A missing schema means the connection's default schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}

impl ObjectName {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Same name, different schema
    pub fn with_schema(&self, schema: Option<String>) -> Self {
        Self {
            schema,
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Table element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKeyElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check_constraints: Vec<CheckConstraintElement>,
    #[serde(default)]
    pub annotations: TableAnnotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Previous location of this table, used to diff a rename instead of drop + create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<ObjectName>,
}

impl TableElement {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            check_constraints: Vec::new(),
            annotations: TableAnnotations::default(),
            comment: None,
            renamed_from: None,
        }
    }

    pub fn object_name(&self) -> ObjectName {
        ObjectName::new(self.schema.as_deref(), &self.name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnElement> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the column participates in the primary key
    pub fn is_key_column(&self, name: &str) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|pk| pk.columns.iter().any(|c| c == name))
    }

    /// Location of the history table when this table is system-versioned
    pub fn history_table(&self) -> Option<ObjectName> {
        self.annotations.history_table(&self.object_name())
    }
}

/// Column element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnElement {
    pub name: String,
    pub store_type: String,
    #[serde(default)]
    pub is_nullable: bool,
    /// Literal default, default expression or computed expression; never more than one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ColumnValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_constraint_name: Option<String>,
    #[serde(default)]
    pub is_sparse: bool,
    #[serde(default)]
    pub is_row_version: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentitySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
}

impl ColumnElement {
    pub fn new(name: &str, store_type: &str, is_nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            store_type: store_type.to_string(),
            is_nullable,
            value: None,
            default_constraint_name: None,
            is_sparse: false,
            is_row_version: false,
            identity: None,
            comment: None,
            renamed_from: None,
        }
    }

    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.value = Some(ColumnValue::Default(value));
        self
    }

    pub fn with_default_sql(mut self, sql: &str) -> Self {
        self.value = Some(ColumnValue::DefaultSql(sql.to_string()));
        self
    }

    pub fn with_computed_sql(mut self, sql: &str, stored: bool) -> Self {
        self.value = Some(ColumnValue::Computed {
            sql: sql.to_string(),
            stored,
        });
        self
    }

    pub fn with_constraint_name(mut self, name: &str) -> Self {
        self.default_constraint_name = Some(name.to_string());
        self
    }

    /// The default literal or expression, if the column has one
    pub fn default(&self) -> Option<&ColumnValue> {
        match &self.value {
            Some(ColumnValue::Computed { .. }) | None => None,
            Some(value) => Some(value),
        }
    }

    pub fn computed_sql(&self) -> Option<&str> {
        match &self.value {
            Some(ColumnValue::Computed { sql, .. }) => Some(sql),
            _ => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.computed_sql().is_some()
    }

    pub fn is_identity(&self) -> bool {
        self.identity.is_some()
    }

    /// Identity, row-version and computed columns never carry a default constraint
    pub fn accepts_default(&self) -> bool {
        !self.is_identity() && !self.is_row_version && !self.is_computed()
    }
}

/// Where a column's value comes from when not supplied by the writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ColumnValue {
    Default(DefaultValue),
    DefaultSql(String),
    Computed {
        sql: String,
        #[serde(default)]
        stored: bool,
    },
}

/// Typed literal default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(String),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Guid(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySpec {
    #[serde(default = "one")]
    pub seed: i64,
    #[serde(default = "one")]
    pub increment: i64,
}

impl Default for IdentitySpec {
    fn default() -> Self {
        Self {
            seed: 1,
            increment: 1,
        }
    }
}

fn one() -> i64 {
    1
}

/// Primary key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyElement {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustered: Option<bool>,
}

/// Index element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexElement {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustered: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl IndexElement {
    /// Same definition regardless of name
    pub fn same_definition(&self, other: &IndexElement) -> bool {
        self.columns == other.columns
            && self.is_unique == other.is_unique
            && self.clustered == other.clustered
            && self.include == other.include
            && self.filter == other.filter
    }
}

/// Foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyElement {
    pub name: String,
    pub columns: Vec<String>,
    pub principal_table: ObjectName,
    pub principal_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: ReferentialAction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    SetDefault,
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferentialAction::NoAction => write!(f, "NO ACTION"),
            ReferentialAction::Cascade => write!(f, "CASCADE"),
            ReferentialAction::SetNull => write!(f, "SET NULL"),
            ReferentialAction::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

/// Check constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConstraintElement {
    pub name: String,
    pub sql: String,
}
