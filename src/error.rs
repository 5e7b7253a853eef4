use crate::protocol::codec::Encoding;
use crate::session::AttributeMap;

/// Result type alias for every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error a [`crate::Session`] operation can fail with.
///
/// A single `call` can fail for exactly one of these three reasons; they are
/// kept as distinct leaf types (`ConnectionError`, `TrapError`,
/// `FatalError`) so callers who only care about one kind can match on it
/// directly, with `Error` as the umbrella returned from the public API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport- or framing-level failure. Always terminal for the session.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// A `!trap` sentence was present in an otherwise well-formed response.
    /// The session remains usable afterward.
    #[error(transparent)]
    Trap(#[from] TrapError),
    /// A `!fatal` sentence was received. Always terminal; the transport has
    /// already been closed by the time this reaches the caller.
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

/// Transport- or framing-level failure.
///
/// Always terminal: after any `ConnectionError`, the owning [`crate::Session`]
/// is considered closed and every further operation fails with
/// [`ConnectionError::Closed`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// The underlying transport reported an I/O error.
    #[error("I/O error communicating with the device")]
    Io(#[from] std::io::Error),
    /// The connect attempt did not complete within the configured timeout.
    #[error("connection attempt timed out")]
    Timeout,
    /// The peer closed the connection (a zero-byte read).
    #[error("connection was closed")]
    Closed,
    /// `encode_length` was asked to encode a length `>= 2^28`.
    #[error("length {length} cannot be encoded (must be < 2^28)")]
    LengthOverflow {
        /// The length that could not be encoded.
        length: u64,
    },
    /// The first byte of a length prefix had its top 5 bits set
    /// (`>= 0xF0`), which this protocol does not define.
    #[error("unknown length control byte 0x{0:02x}")]
    UnknownControlByte(u8),
    /// A word's bytes could not be represented in the session's configured
    /// [`Encoding`] while encoding.
    #[error("word is not representable in the {encoding} encoding")]
    Encoding {
        /// The encoding the word failed to convert into.
        encoding: Encoding,
    },
    /// Bytes read from the wire could not be decoded under the session's
    /// configured [`Encoding`].
    #[error("bytes read from the device are not valid {encoding}")]
    Decoding {
        /// The encoding the bytes failed to decode as.
        encoding: Encoding,
    },
}

/// A `!trap` response: a recoverable, application-level error reported by
/// the device. The session that produced it remains usable.
#[derive(Debug, thiserror::Error)]
#[error("device reported {} trap sentence(s)", .sentences.len())]
pub struct TrapError {
    /// One attribute map per `!trap` sentence seen before the terminating
    /// `!done`, in the order they were received.
    pub sentences: Vec<AttributeMap>,
}

/// A `!fatal` response: the device is terminating the connection.
#[derive(Debug, thiserror::Error)]
#[error("device closed the connection: {reason}")]
pub struct FatalError {
    /// The reason string carried by the `!fatal` sentence.
    pub reason: String,
}
