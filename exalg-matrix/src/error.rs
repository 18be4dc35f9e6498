use thiserror::Error;
use exalg::DivisionByZero;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatError {
    /// Malformed or empty row data passed to a constructor.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Binary operation on incompatible shapes.
    #[error("incompatible dimensions: {0}x{1} and {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    /// Row or column index past its bound.
    #[error("index {0} out of range (< {1})")]
    IndexOutOfRange(usize, usize),

    /// Operation requires a square (or square augmented) matrix.
    #[error("matrix is not square: {0}x{1}")]
    NotSquare(usize, usize),

    #[error("division by zero")]
    DivisionByZero,

    #[error("matrix is singular")]
    Singular,
}

impl From<DivisionByZero> for MatError {
    fn from(_: DivisionByZero) -> Self {
        Self::DivisionByZero
    }
}
