use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum SerializedError {
    #[error("Unexpected end of input at byte {0}")]
    UnexpectedEnd(usize),

    #[error("Unexpected byte {found:#04x} at byte {position}")]
    UnexpectedByte { position: usize, found: u8 },

    #[error("Invalid length at byte {0}")]
    InvalidLength(usize),

    #[error("Invalid number at byte {0}")]
    InvalidNumber(usize),

    #[error("Invalid array key at byte {0}")]
    InvalidKey(usize),

    #[error("Nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("Trailing data at byte {0}")]
    TrailingData(usize),
}
