use relocost_core::ParseError;
use relocost_storage::StorageError;

/// Errors raised while evaluating a formula or resolving rates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow: {message}")]
    Overflow { message: String },

    #[error("lookup table not found: {table}")]
    LookupTableNotFound { table: String },

    #[error("column '{column}' not found in table '{table}'")]
    LookupColumnNotFound { table: String, column: String },

    #[error("no row where {key_column} = {key} in table '{table}'")]
    LookupNoMatch {
        table: String,
        key_column: String,
        key: String,
    },

    #[error("value '{value}' in column '{value_column}' of table '{table}' is not numeric")]
    LookupValueNotNumeric {
        table: String,
        value_column: String,
        value: String,
    },

    #[error("rate table not found: {table}")]
    RateTableNotFound { table: String },

    #[error("invalid {field} '{value}' on rate entry {entry_id}")]
    InvalidDate {
        entry_id: String,
        field: String,
        value: String,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

impl EvalError {
    /// Stable kind name, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::Parse(_) => "ParseError",
            EvalError::UnknownVariable { .. } => "UnknownVariable",
            EvalError::DivisionByZero => "DivisionByZero",
            EvalError::Overflow { .. } => "Overflow",
            EvalError::LookupTableNotFound { .. } => "LookupTableNotFound",
            EvalError::LookupColumnNotFound { .. } => "LookupColumnNotFound",
            EvalError::LookupNoMatch { .. } => "LookupNoMatch",
            EvalError::LookupValueNotNumeric { .. } => "LookupValueNotNumeric",
            EvalError::RateTableNotFound { .. } => "RateTableNotFound",
            EvalError::InvalidDate { .. } => "InvalidDate",
            EvalError::Storage(_) => "Storage",
        }
    }
}

impl From<StorageError> for EvalError {
    fn from(e: StorageError) -> Self {
        EvalError::Storage(e.to_string())
    }
}
