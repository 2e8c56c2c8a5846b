//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug)]
pub enum Error {
    // Configuration
    #[error("{0} is not bounded")]
    Unbounded(String),

    // Integrity
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("declared {declared} entries but decoded {decoded}")]
    CountMismatch { declared: usize, decoded: usize },
    #[error("decoder read past the end of a {0} byte frame")]
    FrameOverrun(usize),
    #[error("negative length: {0}")]
    NegativeLength(i32),
    #[error("invalid length: {0}")]
    InvalidLength(usize),
    #[error("invalid bool: {0:#04x}")]
    InvalidBool(u8),
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("missing string terminator")]
    MissingTerminator,
    #[error("invalid data in {0}: {1}")]
    InvalidData(&'static str, String), // context, message
    #[error("decryption failed")]
    DecryptionFailed,

    // Preconditions and resources
    #[error("string contains a terminator byte")]
    EmbeddedTerminator,
    #[error("character {0:?} cannot be encoded as {1}")]
    Unencodable(char, &'static str),
    #[error("buffer has no writable backing array")]
    NoBackingArray,
    #[error("buffer is read-only")]
    ReadOnly,
    #[error("capacity exceeded: {requested} > {max}")]
    CapacityExceeded { requested: usize, max: usize },
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),
    #[error("length does not fit a size field: {0}")]
    LengthOverflow(usize),
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("pool exhausted")]
    PoolExhausted,
}
