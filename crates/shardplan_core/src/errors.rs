use crate::types::DataType;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(
        "Number of columns in insert statement and subquery differ (insert columns: {insert_columns}, subquery columns: {subquery_columns})"
    )]
    ColumnCountMismatch {
        insert_columns: usize,
        subquery_columns: usize,
    },

    #[error("Invalid column expression in subquery: '{0}'")]
    InvalidSubqueryExpression(String),

    #[error(
        "Type of subquery column {expression} ({source_type}) does not match / is not convertable to the type of table column {column} ({target_type})"
    )]
    ColumnTypeMismatch {
        expression: String,
        source_type: DataType,
        column: String,
        target_type: DataType,
    },

    #[error("Type {source_type} cannot be converted to {target_type}")]
    IncompatibleType {
        source_type: DataType,
        target_type: DataType,
    },

    #[error("Unsupported constraint: {0}")]
    UnsupportedConstraint(&'static str),

    #[error("Cannot GROUP BY '{expression}': {reason}")]
    InvalidGroupExpression { expression: String, reason: String },

    #[error("column '{0}' must appear in the GROUP BY clause or be used in an aggregation function")]
    UngroupedOutput(String),

    #[error("Cannot ORDER BY '{expression}': {reason}")]
    InvalidOrderByExpression { expression: String, reason: String },

    #[error("Table '{0}' unknown")]
    TableNotFound(String),

    #[error("Column '{column}' unknown in table '{table}'")]
    ColumnUnknown { table: String, column: String },

    #[error("Column '{0}' specified more than once")]
    DuplicateInsertColumn(String),

    #[error("Cannot resolve function: {0}")]
    UnknownFunction(String),

    #[error("No planning strategy accepted relation: {0}")]
    UnsupportedRelation(String),

    #[error("Unknown setting: '{0}'")]
    UnknownSetting(String),

    #[error("Invalid value for setting '{name}': {reason}")]
    InvalidSettingValue { name: &'static str, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = PlanError> = std::result::Result<T, E>;

#[allow(unused_macros)]
macro_rules! internal {
    ($($arg:tt)*) => {
        crate::errors::PlanError::Internal(std::format!($($arg)*))
    };
}
pub(crate) use internal;
