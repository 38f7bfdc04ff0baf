use crate::client_hello::HANDSHAKE_CLIENT_HELLO;
use crate::error::Ja3Error;
use std::fmt::{self};
use tls_parser::nom::Needed;
use tls_parser::{parse_tls_raw_record, Err};

/// TLS record content type for handshake messages
pub const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;

/// Legacy protocol version as carried in records and ClientHello.
///
/// Only used for display; the JA3 version field is always the raw decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlsVersion {
    V1_3,
    V1_2,
    V1_1,
    V1_0,
    Ssl3_0,
    Unknown(u16),
}

impl From<u16> for TlsVersion {
    fn from(value: u16) -> Self {
        match value {
            0x0304 => TlsVersion::V1_3,
            0x0303 => TlsVersion::V1_2,
            0x0302 => TlsVersion::V1_1,
            0x0301 => TlsVersion::V1_0,
            0x0300 => TlsVersion::Ssl3_0,
            other => TlsVersion::Unknown(other),
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsVersion::V1_3 => write!(f, "TLSv1.3"),
            TlsVersion::V1_2 => write!(f, "TLSv1.2"),
            TlsVersion::V1_1 => write!(f, "TLSv1.1"),
            TlsVersion::V1_0 => write!(f, "TLSv1.0"),
            TlsVersion::Ssl3_0 => write!(f, "SSLv3"),
            TlsVersion::Unknown(v) => write!(f, "unknown(0x{v:04x})"),
        }
    }
}

/// One TLS record sliced out of a TCP payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsRecord<'a> {
    pub content_type: u8,
    pub version: u16,
    pub fragment: &'a [u8],
}

impl<'a> TlsRecord<'a> {
    pub fn is_handshake(&self) -> bool {
        self.content_type == CONTENT_TYPE_HANDSHAKE
    }

    /// The handshake message carried by this record when it starts with a ClientHello.
    ///
    /// Only the first handshake message of the record is considered.
    pub fn client_hello(&self) -> Option<&'a [u8]> {
        match self.fragment.first() {
            Some(&HANDSHAKE_CLIENT_HELLO) if self.is_handshake() => Some(self.fragment),
            _ => None,
        }
    }
}

/// Split a TCP payload into consecutive TLS records.
///
/// # Errors
/// - `TruncatedBuffer` if the last record header or fragment is incomplete; the
///   whole payload is rejected in that case
/// - `Parse` if a record declares a length above the protocol maximum
pub fn split_records(payload: &[u8]) -> Result<Vec<TlsRecord<'_>>, Ja3Error> {
    let mut records = Vec::new();
    let mut rest = payload;

    while !rest.is_empty() {
        match parse_tls_raw_record(rest) {
            Ok((next, raw)) => {
                records.push(TlsRecord {
                    content_type: raw.hdr.record_type.0,
                    version: raw.hdr.version.0,
                    fragment: raw.data,
                });
                rest = next;
            }
            Err(Err::Incomplete(needed)) => {
                let missing = match needed {
                    Needed::Size(n) => n.get(),
                    Needed::Unknown => 1,
                };
                return Err(Ja3Error::TruncatedBuffer {
                    needed: rest.len().saturating_add(missing),
                    available: rest.len(),
                });
            }
            Err(Err::Error(e)) | Err(Err::Failure(e)) => {
                return Err(Ja3Error::Parse(format!("TLS record rejected: {:?}", e.code)));
            }
        }
    }

    Ok(records)
}

/// Detect a TLS handshake record at the start of a payload
#[inline(always)]
pub fn is_tls_traffic(payload: &[u8]) -> bool {
    payload.first() == Some(&CONTENT_TYPE_HANDSHAKE)
}
