//! Table and field metadata handles.
//!
//! The builders treat tables as opaque handles: they need a qualified name,
//! the declared fields, and each field's type descriptor so the renderer can
//! decide how to spell a literal. Handles are cheap to clone and compare by
//! identity.

use std::sync::Arc;

/// Column type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// BOOLEAN / TINYINT(1).
    Boolean,
    /// TINYINT.
    TinyInt,
    /// SMALLINT.
    SmallInt,
    /// INT.
    Int,
    /// BIGINT.
    BigInt,
    /// DECIMAL.
    Decimal,
    /// FLOAT.
    Float,
    /// DOUBLE.
    Double,
    /// CHAR.
    Char,
    /// VARCHAR.
    VarChar,
    /// TEXT.
    Text,
    /// ENUM.
    Enum,
    /// JSON.
    Json,
    /// BINARY.
    Binary,
    /// VARBINARY.
    VarBinary,
    /// BLOB.
    Blob,
    /// DATE.
    Date,
    /// TIME.
    Time,
    /// DATETIME.
    DateTime,
    /// TIMESTAMP.
    Timestamp,
    /// YEAR.
    Year,
}

impl SqlType {
    /// Returns whether values of this type are written as quoted strings.
    #[must_use]
    pub const fn is_string_like(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::VarChar
                | Self::Text
                | Self::Enum
                | Self::Json
                | Self::Date
                | Self::Time
                | Self::DateTime
                | Self::Timestamp
        )
    }

    /// Returns whether values of this type are binary strings.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(self, Self::Binary | Self::VarBinary | Self::Blob)
    }

    /// Returns whether values of this type are numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::Int
                | Self::BigInt
                | Self::Decimal
                | Self::Float
                | Self::Double
                | Self::Year
        )
    }
}

/// A field declared by a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    table: String,
    name: String,
    sql_type: SqlType,
    nullable: bool,
}

impl FieldMeta {
    /// Returns the owning table's name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type descriptor.
    #[must_use]
    pub const fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    /// Returns whether the field accepts NULL.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }
}

#[derive(Debug)]
struct TableInner {
    schema: Option<String>,
    name: String,
    fields: Vec<FieldMeta>,
}

/// A table handle.
///
/// Two handles are equal only when they come from the same
/// [`TableMetaBuilder::build`] call.
#[derive(Debug, Clone)]
pub struct TableMeta(Arc<TableInner>);

impl TableMeta {
    /// Starts describing a table.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableMetaBuilder {
        TableMetaBuilder {
            schema: None,
            name: name.into(),
            fields: vec![],
        }
    }

    /// Returns the schema, if qualified.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.0.schema.as_deref()
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns `schema.name` or `name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.0.schema {
            Some(schema) => format!("{schema}.{}", self.0.name),
            None => self.0.name.clone(),
        }
    }

    /// Returns the declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldMeta] {
        &self.0.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.0.fields.iter().find(|f| f.name == name)
    }
}

impl PartialEq for TableMeta {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Builder for [`TableMeta`].
#[derive(Debug)]
pub struct TableMetaBuilder {
    schema: Option<String>,
    name: String,
    fields: Vec<FieldMeta>,
}

impl TableMetaBuilder {
    /// Qualifies the table with a schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Declares a NOT NULL field.
    #[must_use]
    pub fn field(self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.push(name.into(), sql_type, false)
    }

    /// Declares a nullable field.
    #[must_use]
    pub fn nullable_field(self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.push(name.into(), sql_type, true)
    }

    fn push(mut self, name: String, sql_type: SqlType, nullable: bool) -> Self {
        self.fields.push(FieldMeta {
            table: self.name.clone(),
            name,
            sql_type,
            nullable,
        });
        self
    }

    /// Finishes the handle.
    #[must_use]
    pub fn build(self) -> TableMeta {
        TableMeta(Arc::new(TableInner {
            schema: self.schema,
            name: self.name,
            fields: self.fields,
        }))
    }
}
