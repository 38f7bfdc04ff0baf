use crate::client_hello::decode_client_hello;
use crate::error::Ja3Error;
use md5::{Digest, Md5};
use std::fmt;

/// The five ordered JA3 fields, each a `-` joined decimal list (possibly empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ja3Segments {
    pub version: String,
    pub ciphers: String,
    pub extensions: String,
    pub elliptic_curves: String,
    pub elliptic_curve_point_formats: String,
}

impl Ja3Segments {
    /// Canonical JA3 string: the five segments joined by commas. Empty slots keep their comma.
    pub fn to_ja3_string(&self) -> String {
        [
            self.version.as_str(),
            self.ciphers.as_str(),
            self.extensions.as_str(),
            self.elliptic_curves.as_str(),
            self.elliptic_curve_point_formats.as_str(),
        ]
        .join(",")
    }
}

impl fmt::Display for Ja3Segments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ja3_string())
    }
}

/// MD5 of the JA3 string, lowercase hex.
pub fn ja3_digest(ja3: &str) -> String {
    format!("{:x}", Md5::digest(ja3.as_bytes()))
}

/// JA3 fingerprint of one ClientHello
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Fingerprint {
    /// Legacy ClientHello version
    pub version: u16,
    pub segments: Ja3Segments,
    /// Canonical comma-joined string
    pub ja3: String,
    /// 32 lowercase hex chars
    pub digest: String,
    /// SNI host name bytes, not guaranteed to be UTF-8
    pub server_name: Option<Vec<u8>>,
}

impl Ja3Fingerprint {
    /// Decode a raw ClientHello handshake message and fingerprint it.
    ///
    /// # Example
    /// ```no_run
    /// use ja3_fingerprint::Ja3Fingerprint;
    ///
    /// let handshake: &[u8] = &[0x01, 0x00, 0x00, 0x26 /* ... */];
    /// match Ja3Fingerprint::from_handshake(handshake) {
    ///     Ok(fp) => println!("{} {}", fp.ja3, fp.digest),
    ///     Err(e) => eprintln!("dropped: {e}"),
    /// }
    /// ```
    pub fn from_handshake(handshake: &[u8]) -> Result<Self, Ja3Error> {
        let decoded = decode_client_hello(handshake)?;
        Ok(Self::new(decoded.version, decoded.segments, decoded.server_name))
    }

    pub fn new(version: u16, segments: Ja3Segments, server_name: Option<Vec<u8>>) -> Self {
        let ja3 = segments.to_ja3_string();
        let digest = ja3_digest(&ja3);
        Self { version, segments, ja3, digest, server_name }
    }

    /// Host name for display, with invalid UTF-8 replaced.
    pub fn server_name_lossy(&self) -> Option<String> {
        self.server_name
            .as_deref()
            .map(|name| String::from_utf8_lossy(name).into_owned())
    }
}
