use crate::cursor::read_uint;
use crate::error::Ja3Error;
use crate::grease::is_grease;

/// Encode a packed array of 1 or 2 byte big-endian integers as a JA3 segment.
///
/// GREASE values are dropped, the rest are rendered in decimal and joined with `-`.
/// An empty (or all-GREASE) array yields the empty string.
///
/// # Errors
/// - `MisalignedData` if `data.len()` is not a multiple of `element_width`
/// - `InvalidWidth` if `element_width` is not 1 or 2
pub fn encode_segment(data: &[u8], element_width: usize) -> Result<String, Ja3Error> {
    if !(1..=2).contains(&element_width) {
        return Err(Ja3Error::InvalidWidth(element_width));
    }
    if data.len() % element_width != 0 {
        return Err(Ja3Error::MisalignedData { len: data.len(), width: element_width });
    }

    let mut values = Vec::with_capacity(data.len() / element_width);
    for chunk in data.chunks_exact(element_width) {
        let value = read_uint(chunk)?;
        if u16::try_from(value).is_ok_and(is_grease) {
            continue;
        }
        values.push(value.to_string());
    }

    Ok(values.join("-"))
}

/// Join already-decoded type codes, skipping GREASE values.
pub fn join_codes(codes: &[u16]) -> String {
    codes
        .iter()
        .filter(|&&code| !is_grease(code))
        .map(u16::to_string)
        .collect::<Vec<String>>()
        .join("-")
}
