use crate::cursor::{extract, Cursor};
use crate::error::Ja3Error;
use crate::segment::{encode_segment, join_codes};

/// Extension type codes with special handling
pub mod types {
    pub const SERVER_NAME: u16 = 0x0000;
    pub const SUPPORTED_GROUPS: u16 = 0x000a;
    pub const EC_POINT_FORMATS: u16 = 0x000b;
}

/// One raw ClientHello extension, borrowed from the handshake buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension<'a> {
    pub ext_type: u16,
    pub data: &'a [u8],
}

/// The extension-derived part of a JA3 fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSegments {
    /// Non-GREASE extension type codes in declared order
    pub extensions: String,
    /// Supported groups (elliptic curves)
    pub elliptic_curves: String,
    /// EC point formats
    pub elliptic_curve_point_formats: String,
    /// Raw host name bytes from the server_name extension
    pub server_name: Option<Vec<u8>>,
}

/// Split the body of the extensions block into `(type, data)` entries.
pub fn parse_extension_block(block: &[u8]) -> Result<Vec<Extension<'_>>, Ja3Error> {
    let mut extensions = Vec::new();
    let mut cursor = Cursor::new(block);

    while !cursor.is_empty() {
        let (ext_type, next) = cursor.read_u16()?;
        let (data, next) = next.read_variable(2)?;
        extensions.push(Extension { ext_type, data });
        cursor = next;
    }

    Ok(extensions)
}

/// Walk the extension list, collecting type codes and the curve, point-format and SNI payloads.
pub fn walk_extensions(extensions: &[Extension<'_>]) -> Result<ExtensionSegments, Ja3Error> {
    let mut segments = ExtensionSegments::default();
    let mut codes = Vec::with_capacity(extensions.len());

    for extension in extensions {
        codes.push(extension.ext_type);

        match extension.ext_type {
            types::SUPPORTED_GROUPS => {
                let (curves, _) = extract(extension.data, 2)?;
                segments.elliptic_curves = encode_segment(curves, 2)?;
            }
            types::EC_POINT_FORMATS => {
                let (formats, _) = extract(extension.data, 1)?;
                segments.elliptic_curve_point_formats = encode_segment(formats, 1)?;
            }
            types::SERVER_NAME => {
                segments.server_name = Some(parse_server_name(extension.data)?);
            }
            _ => {}
        }
    }

    segments.extensions = join_codes(&codes);
    Ok(segments)
}

/// Host name from a server_name extension body.
///
/// The list holds a single entry: 1-byte name type, 2-byte length, host bytes. The
/// name type is not checked; the host length must match the bytes that follow.
fn parse_server_name(data: &[u8]) -> Result<Vec<u8>, Ja3Error> {
    let (list, _) = extract(data, 2)?;

    let header_error =
        |_| Ja3Error::MalformedExtension(format!("server name list too short: {} bytes", list.len()));
    let (_name_type, cursor) = Cursor::new(list).read_u8().map_err(header_error)?;
    let (name_len, cursor) = cursor.read_u16().map_err(header_error)?;

    let host = cursor.remaining();
    if host.len() != usize::from(name_len) {
        return Err(Ja3Error::MalformedExtension(format!(
            "server name declares {name_len} bytes but {} follow",
            host.len()
        )));
    }

    Ok(host.to_vec())
}
