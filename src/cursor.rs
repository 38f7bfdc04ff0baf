//! Big-endian integer reads and length-prefixed array extraction over raw handshake bytes.

use crate::error::Ja3Error;

/// Interpret a 1, 2 or 4 byte buffer as a big-endian unsigned integer.
///
/// Three-byte (24-bit) lengths are only decoded inside [`extract`].
pub fn read_uint(buf: &[u8]) -> Result<u32, Ja3Error> {
    match *buf {
        [b0] => Ok(u32::from(b0)),
        [b0, b1] => Ok(u32::from(u16::from_be_bytes([b0, b1]))),
        [b0, b1, b2, b3] => Ok(u32::from_be_bytes([b0, b1, b2, b3])),
        _ => Err(Ja3Error::InvalidLength(buf.len())),
    }
}

/// Split a length-prefixed array off the front of `buf`.
///
/// Reads `prefix_width` bytes as a big-endian length `L` and returns the `L` payload
/// bytes that follow together with the total consumed (`prefix_width + L`).
///
/// # Errors
/// - `InvalidWidth` if `prefix_width` is not in `1..=4`
/// - `TruncatedBuffer` if `buf` is shorter than the prefix or the declared payload
pub fn extract(buf: &[u8], prefix_width: usize) -> Result<(&[u8], usize), Ja3Error> {
    if !(1..=4).contains(&prefix_width) {
        return Err(Ja3Error::InvalidWidth(prefix_width));
    }

    let prefix = buf.get(..prefix_width).ok_or(Ja3Error::TruncatedBuffer {
        needed: prefix_width,
        available: buf.len(),
    })?;

    let size = match *prefix {
        // 24-bit lengths are left-padded to 32 bits
        [b0, b1, b2] => u32::from_be_bytes([0, b0, b1, b2]),
        _ => read_uint(prefix)?,
    } as usize;

    let consumed = prefix_width.saturating_add(size);
    let payload = buf.get(prefix_width..consumed).ok_or(Ja3Error::TruncatedBuffer {
        needed: consumed,
        available: buf.len(),
    })?;

    Ok((payload, consumed))
}

/// Read position over one immutable buffer.
///
/// Every read consumes the cursor and hands back an advanced copy, so chained
/// variable-array reads never share a mutable offset.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.buf.get(self.offset..).unwrap_or(&[])
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining().len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining().is_empty()
    }

    /// Take exactly `len` bytes.
    pub fn read_fixed(self, len: usize) -> Result<(&'a [u8], Self), Ja3Error> {
        let rest = self.remaining();
        let bytes = rest.get(..len).ok_or(Ja3Error::TruncatedBuffer {
            needed: len,
            available: rest.len(),
        })?;
        Ok((bytes, self.advance(len)))
    }

    pub fn read_u8(self) -> Result<(u8, Self), Ja3Error> {
        let (bytes, next) = self.read_fixed(1)?;
        Ok((read_uint(bytes)? as u8, next))
    }

    pub fn read_u16(self) -> Result<(u16, Self), Ja3Error> {
        let (bytes, next) = self.read_fixed(2)?;
        Ok((read_uint(bytes)? as u16, next))
    }

    pub fn skip(self, len: usize) -> Result<Self, Ja3Error> {
        self.read_fixed(len).map(|(_, next)| next)
    }

    /// Take a length-prefixed array, see [`extract`].
    pub fn read_variable(self, prefix_width: usize) -> Result<(&'a [u8], Self), Ja3Error> {
        let (payload, consumed) = extract(self.remaining(), prefix_width)?;
        Ok((payload, self.advance(consumed)))
    }

    fn advance(self, len: usize) -> Self {
        Self { buf: self.buf, offset: self.offset.saturating_add(len) }
    }
}
