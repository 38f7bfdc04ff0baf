use crate::cursor::Cursor;
use crate::error::Ja3Error;
use crate::extensions::{parse_extension_block, walk_extensions, Extension};
use crate::ja3::Ja3Segments;
use crate::segment::encode_segment;

/// Handshake type byte of a ClientHello message
pub const HANDSHAKE_CLIENT_HELLO: u8 = 0x01;

/// Length of the ClientHello random field
const RANDOM_LEN: usize = 32;

/// Structural fields of one ClientHello, borrowed from the handshake buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHelloFields<'a> {
    /// Legacy `client_version` field
    pub version: u16,
    /// Packed cipher suite array (2 bytes per suite, GREASE included)
    pub cipher_suites: &'a [u8],
    /// `None` when the message ends after the compression methods
    pub extensions: Option<Vec<Extension<'a>>>,
}

impl ClientHelloFields<'_> {
    /// Cipher suite ids in declared order. A trailing odd byte is ignored here.
    pub fn cipher_suite_ids(&self) -> Vec<u16> {
        self.cipher_suites
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect()
    }

    /// Extension type codes in declared order, GREASE included.
    pub fn extension_types(&self) -> Vec<u16> {
        self.extensions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|e| e.ext_type)
            .collect()
    }
}

/// Result of decoding a ClientHello: the five JA3 segments plus the SNI host name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClientHello {
    pub version: u16,
    pub segments: Ja3Segments,
    pub server_name: Option<Vec<u8>>,
}

/// Parse a handshake message (type byte, 24-bit length, body) into its ClientHello fields.
///
/// # Errors
/// - `NotAClientHello` if the handshake type is not 1
/// - `TruncatedBuffer` if any length field runs past the available bytes
pub fn parse_client_hello(handshake: &[u8]) -> Result<ClientHelloFields<'_>, Ja3Error> {
    let (handshake_type, cursor) = Cursor::new(handshake).read_u8()?;
    if handshake_type != HANDSHAKE_CLIENT_HELLO {
        return Err(Ja3Error::NotAClientHello(handshake_type));
    }
    let (body, _) = cursor.read_variable(3)?;

    let (version, cursor) = Cursor::new(body).read_u16()?;
    let cursor = cursor.skip(RANDOM_LEN)?;
    let (_session_id, cursor) = cursor.read_variable(1)?;
    let (cipher_suites, cursor) = cursor.read_variable(2)?;
    let (_compression_methods, cursor) = cursor.read_variable(1)?;

    let extensions = if cursor.is_empty() {
        None
    } else {
        let (block, _) = cursor.read_variable(2)?;
        Some(parse_extension_block(block)?)
    };

    Ok(ClientHelloFields { version, cipher_suites, extensions })
}

/// Turn parsed ClientHello fields into JA3 segments.
pub fn assemble_segments(fields: &ClientHelloFields<'_>) -> Result<DecodedClientHello, Ja3Error> {
    let ciphers = encode_segment(fields.cipher_suites, 2)?;
    let walked = walk_extensions(fields.extensions.as_deref().unwrap_or_default())?;

    Ok(DecodedClientHello {
        version: fields.version,
        segments: Ja3Segments {
            version: fields.version.to_string(),
            ciphers,
            extensions: walked.extensions,
            elliptic_curves: walked.elliptic_curves,
            elliptic_curve_point_formats: walked.elliptic_curve_point_formats,
        },
        server_name: walked.server_name,
    })
}

/// Parse and assemble in one step. Any failure rejects the whole message.
pub fn decode_client_hello(handshake: &[u8]) -> Result<DecodedClientHello, Ja3Error> {
    assemble_segments(&parse_client_hello(handshake)?)
}
