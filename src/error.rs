use thiserror::Error;

/// A cell whose text could not be coerced into its field's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "cannot decode '{value}' into field {field} of type {type_name} (row {row}, column {column})"
)]
pub struct TypeMismatchError {
    pub value: String,
    pub type_name: &'static str,
    pub field: &'static str,
    /// 1-based data row, not counting the header.
    pub row: usize,
    /// 0-based column index.
    pub column: usize,
}

/// Failure reported by a [`RowSource`](crate::decoder::RowSource).
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid record type {record}: {reason}")]
    Configuration { record: &'static str, reason: String },
    #[error("input ended before a header row was read")]
    MissingHeader,
    #[error("reading header row: {0}")]
    HeaderRead(#[source] ReadError),
    #[error("reading data row: {0}")]
    RowRead(#[source] ReadError),
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),
}

impl DecodeError {
    pub fn is_header_error(&self) -> bool {
        matches!(self, DecodeError::MissingHeader | DecodeError::HeaderRead(_))
    }

    /// The retained mismatch, if this is the non-fatal outcome of a decode.
    pub fn type_mismatch(&self) -> Option<&TypeMismatchError> {
        match self {
            DecodeError::TypeMismatch(err) => Some(err),
            _ => None,
        }
    }
}
