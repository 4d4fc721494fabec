use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DataType;

pub const DEFAULT_SCHEMA: &str = "doc";

/// Identifies a table by schema and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableIdent {
    pub schema: String,
    pub name: String,
}

impl TableIdent {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        TableIdent {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Table in the default schema.
    pub fn doc(name: impl Into<String>) -> Self {
        Self::new(DEFAULT_SCHEMA, name)
    }

    pub fn fqn(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Column name, with an optional path into object columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnIdent {
    pub name: String,
    #[serde(default)]
    pub path: Vec<String>,
}

impl ColumnIdent {
    pub fn new(name: impl Into<String>) -> Self {
        ColumnIdent {
            name: name.into(),
            path: Vec::new(),
        }
    }

    pub fn with_path(name: impl Into<String>, path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ColumnIdent {
            name: name.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Dotted name including the object path, e.g. `details.address.city`.
    pub fn fqn(&self) -> String {
        let mut fqn = self.name.clone();
        for part in &self.path {
            fqn.push('.');
            fqn.push_str(part);
        }
        fqn
    }
}

impl fmt::Display for ColumnIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceIdent {
    pub table: TableIdent,
    pub column: ColumnIdent,
}

/// How a column is indexed in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexType {
    /// Plain (keyword) index, usable for grouping and sorting.
    #[default]
    NotAnalyzed,
    /// Fulltext index.
    Analyzed,
    /// Column isn't indexed at all.
    No,
}

/// A symbol bound to a concrete table column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub ident: ReferenceIdent,
    pub value_type: DataType,
    #[serde(default)]
    pub index_type: IndexType,
}

impl Reference {
    pub fn new(table: TableIdent, column: ColumnIdent, value_type: DataType) -> Self {
        Reference {
            ident: ReferenceIdent { table, column },
            value_type,
            index_type: IndexType::NotAnalyzed,
        }
    }

    pub fn with_index_type(mut self, index_type: IndexType) -> Self {
        self.index_type = index_type;
        self
    }

    pub fn column(&self) -> &ColumnIdent {
        &self.ident.column
    }

    pub fn table(&self) -> &TableIdent {
        &self.ident.table
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ident.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_fqn_with_path() {
        let ident = ColumnIdent::with_path("details", ["address", "city"]);
        assert_eq!("details.address.city", ident.fqn());
    }
}
