use std::fmt;
use thiserror::Error;

/// Errors raised while decoding a ClientHello or while feeding packets to the decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ja3Error {
    /// The byte-order reader was handed a buffer whose width is not 1, 2 or 4.
    ///
    /// This is a caller bug, never a property of the captured traffic.
    #[error("Invalid integer width: {0} bytes")]
    InvalidLength(usize),

    /// A length prefix wider than 4 bytes was requested.
    #[error("Invalid length prefix width: {0} bytes")]
    InvalidWidth(usize),

    /// A declared length runs past the end of the available bytes.
    #[error("Truncated buffer: need {needed} bytes, have {available}")]
    TruncatedBuffer { needed: usize, available: usize },

    /// An array length is not a multiple of its element width.
    #[error("Misaligned data: {len} bytes is not a multiple of {width}")]
    MisalignedData { len: usize, width: usize },

    /// An extension body is internally inconsistent.
    #[error("Malformed extension: {0}")]
    MalformedExtension(String),

    /// The handshake message type byte is not ClientHello (1).
    #[error("Not a ClientHello: handshake type {0}")]
    NotAClientHello(u8),

    /// The packet or record framing around the handshake is not usable.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The analyzer or its capture source could not be set up.
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}

impl Ja3Error {
    /// Coarse classification used to count dropped records.
    pub fn kind(&self) -> DropReason {
        match self {
            Ja3Error::InvalidLength(_) | Ja3Error::InvalidWidth(_) => DropReason::Precondition,
            Ja3Error::TruncatedBuffer { .. } => DropReason::Truncated,
            Ja3Error::MisalignedData { .. } => DropReason::Misaligned,
            Ja3Error::MalformedExtension(_) => DropReason::MalformedExtension,
            Ja3Error::NotAClientHello(_) => DropReason::NotAClientHello,
            Ja3Error::Parse(_) | Ja3Error::Misconfiguration(_) => DropReason::Framing,
        }
    }
}

/// Why a record produced no fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DropReason {
    Precondition,
    Truncated,
    Misaligned,
    MalformedExtension,
    NotAClientHello,
    Framing,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Precondition => "precondition",
            DropReason::Truncated => "truncated",
            DropReason::Misaligned => "misaligned",
            DropReason::MalformedExtension => "malformed_extension",
            DropReason::NotAClientHello => "not_client_hello",
            DropReason::Framing => "framing",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
