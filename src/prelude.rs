/// Error type for digit_net
#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum Error {
    /// Indicates some dimension is incorrect in a Matrix operation.
    #[error("matrix dimensions are incompatible")]
    DimensionErr,
    /// A checked access landed outside the matrix.
    #[error("index ({row}, {col}) out of range for a {}x{} matrix", dim.0, dim.1)]
    IndexErr {
        row: usize,
        col: usize,
        dim: (usize, usize),
    },
    /// Node counts, learning rate or worker count are unusable.
    #[error("invalid configuration: {0}")]
    ConfigErr(String),
    /// A training row could not be parsed.
    #[error("malformed data: {0}")]
    DataFormatErr(String),
    /// A training worker panicked.
    #[error("a training worker panicked")]
    ThreadErr,
}

pub type Result<T> = std::result::Result<T, Error>;
