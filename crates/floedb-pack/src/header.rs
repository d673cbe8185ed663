//! Item header decoding and structural validation.
//!
//! Everything here is bounds-checked; a malformed buffer yields a
//! [`PackError`], never a panic.

use crate::{MAX_NESTING_DEPTH, PackError};

pub(crate) const MAJOR_UNSIGNED: u8 = 0;
pub(crate) const MAJOR_NEGATIVE: u8 = 1;
pub(crate) const MAJOR_BYTES: u8 = 2;
pub(crate) const MAJOR_TEXT: u8 = 3;
pub(crate) const MAJOR_ARRAY: u8 = 4;
pub(crate) const MAJOR_MAP: u8 = 5;
pub(crate) const MAJOR_SIMPLE: u8 = 7;

pub(crate) const SIMPLE_FALSE: u8 = 20;
pub(crate) const SIMPLE_TRUE: u8 = 21;
pub(crate) const SIMPLE_NULL: u8 = 22;
pub(crate) const SIMPLE_UNDEFINED: u8 = 23;
pub(crate) const SIMPLE_F16: u8 = 25;
pub(crate) const SIMPLE_F32: u8 = 26;
pub(crate) const SIMPLE_F64: u8 = 27;

const INFO_INDEFINITE: u8 = 31;
const BREAK_BYTE: u8 = 0xff;

pub(crate) const NONE_BYTE: u8 = (MAJOR_SIMPLE << 5) | SIMPLE_UNDEFINED;
pub(crate) const NULL_BYTE: u8 = (MAJOR_SIMPLE << 5) | SIMPLE_NULL;

///
/// Header
///
/// Decoded initial byte plus its argument. `size` is the number of bytes the
/// header itself occupies.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Header {
    pub(crate) major: u8,
    pub(crate) info: u8,
    pub(crate) arg: u64,
    pub(crate) size: usize,
}

/// Decode the header of the item starting at `offset`.
pub(crate) fn read_header(bytes: &[u8], offset: usize) -> Result<Header, PackError> {
    let initial = *bytes.get(offset).ok_or(PackError::Truncated { offset })?;
    let major = initial >> 5;
    let info = initial & 0x1f;

    let extra = match info {
        0..=23 => 0,
        24 => 1,
        25 => 2,
        26 => 4,
        27 => 8,
        _ => {
            return Err(PackError::UnsupportedHeader {
                byte: initial,
                offset,
            });
        }
    };

    if major == MAJOR_SIMPLE && !matches!(info, SIMPLE_FALSE..=SIMPLE_UNDEFINED | SIMPLE_F16..=SIMPLE_F64) {
        return Err(PackError::UnsupportedHeader {
            byte: initial,
            offset,
        });
    }
    if major == 6 {
        return Err(PackError::UnsupportedHeader {
            byte: initial,
            offset,
        });
    }

    let arg = if extra == 0 {
        u64::from(info)
    } else {
        let start = offset + 1;
        let raw = bytes
            .get(start..start + extra)
            .ok_or(PackError::Truncated { offset: start })?;
        raw.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
    };

    Ok(Header {
        major,
        info,
        arg,
        size: 1 + extra,
    })
}

/// Append a minimal-width header for `major` with argument `arg`.
#[expect(clippy::cast_possible_truncation)]
pub(crate) fn write_header(out: &mut Vec<u8>, major: u8, arg: u64) {
    let major = major << 5;
    if arg < 24 {
        out.push(major | arg as u8);
    } else if arg <= u64::from(u8::MAX) {
        out.extend_from_slice(&[major | 24, arg as u8]);
    } else if arg <= u64::from(u16::MAX) {
        out.push(major | 25);
        out.extend_from_slice(&(arg as u16).to_be_bytes());
    } else if arg <= u64::from(u32::MAX) {
        out.push(major | 26);
        out.extend_from_slice(&(arg as u32).to_be_bytes());
    } else {
        out.push(major | 27);
        out.extend_from_slice(&arg.to_be_bytes());
    }
}

/// Total encoded length of the item starting at `offset`, validating the
/// item and all of its children on the way.
pub(crate) fn item_len(bytes: &[u8], offset: usize) -> Result<usize, PackError> {
    item_len_at_depth(bytes, offset, 0)
}

fn item_len_at_depth(bytes: &[u8], offset: usize, depth: usize) -> Result<usize, PackError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(PackError::NestingTooDeep {
            max: MAX_NESTING_DEPTH,
        });
    }

    let header = read_header(bytes, offset)?;
    let body = offset + header.size;

    match header.major {
        MAJOR_BYTES | MAJOR_TEXT => {
            let len = payload_len(bytes, body, header.arg)?;
            if header.major == MAJOR_TEXT && std::str::from_utf8(&bytes[body..body + len]).is_err()
            {
                return Err(PackError::InvalidUtf8 { offset });
            }
            Ok(header.size + len)
        }
        MAJOR_ARRAY => {
            let count = child_count(bytes, body, header.arg)?;
            let mut cursor = body;
            for _ in 0..count {
                cursor += item_len_at_depth(bytes, cursor, depth + 1)?;
            }
            Ok(cursor - offset)
        }
        MAJOR_MAP => {
            let count = child_count(bytes, body, header.arg.saturating_mul(2))?;
            let mut cursor = body;
            for _ in 0..count / 2 {
                if read_header(bytes, cursor)?.major != MAJOR_TEXT {
                    return Err(PackError::NonStringKey { offset: cursor });
                }
                cursor += item_len_at_depth(bytes, cursor, depth + 1)?;
                cursor += item_len_at_depth(bytes, cursor, depth + 1)?;
            }
            Ok(cursor - offset)
        }
        // integers and simple values are header-only
        _ => Ok(header.size),
    }
}

/// Re-encode one item so that every array and map carries a definite
/// length header. `serde_cbor` falls back to indefinite-length (`0x9f` /
/// `0xbf` ... `0xff`) containers whenever serde does not know the size up
/// front, e.g. for `#[serde(flatten)]`.
pub(crate) fn to_definite(bytes: &[u8]) -> Result<Vec<u8>, PackError> {
    let mut out = Vec::with_capacity(bytes.len());
    let end = copy_definite(bytes, 0, &mut out, 0)?;
    if end < bytes.len() {
        return Err(PackError::TrailingBytes {
            count: bytes.len() - end,
        });
    }

    Ok(out)
}

fn copy_definite(
    bytes: &[u8],
    offset: usize,
    out: &mut Vec<u8>,
    depth: usize,
) -> Result<usize, PackError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(PackError::NestingTooDeep {
            max: MAX_NESTING_DEPTH,
        });
    }

    let initial = *bytes.get(offset).ok_or(PackError::Truncated { offset })?;
    let major = initial >> 5;
    if major != MAJOR_ARRAY && major != MAJOR_MAP {
        let len = item_len(bytes, offset)?;
        out.extend_from_slice(&bytes[offset..offset + len]);
        return Ok(offset + len);
    }

    let per_entry = if major == MAJOR_MAP { 2 } else { 1 };
    let (expected, mut cursor) = if initial & 0x1f == INFO_INDEFINITE {
        (None, offset + 1)
    } else {
        let header = read_header(bytes, offset)?;
        let body = offset + header.size;
        let count = child_count(bytes, body, header.arg)?
            .checked_mul(per_entry)
            .ok_or(PackError::Truncated { offset: body })?;
        (Some(count), body)
    };

    let mut body = Vec::new();
    let mut children = 0usize;
    loop {
        match expected {
            Some(count) if children == count => break,
            None if bytes.get(cursor) == Some(&BREAK_BYTE) => {
                cursor += 1;
                break;
            }
            _ => {}
        }
        cursor = copy_definite(bytes, cursor, &mut body, depth + 1)?;
        children += 1;
    }

    if children % per_entry != 0 {
        return Err(PackError::DanglingKey);
    }

    write_header(out, major, (children / per_entry) as u64);
    out.extend_from_slice(&body);

    Ok(cursor)
}

// Byte-string and text payload length, bounds-checked against the buffer.
fn payload_len(bytes: &[u8], body: usize, arg: u64) -> Result<usize, PackError> {
    let len = usize::try_from(arg).map_err(|_| PackError::Truncated { offset: body })?;
    if bytes.len().saturating_sub(body) < len {
        return Err(PackError::Truncated { offset: body });
    }

    Ok(len)
}

// Every child occupies at least one byte, so a count larger than the
// remaining input is rejected before walking.
fn child_count(bytes: &[u8], body: usize, count: u64) -> Result<usize, PackError> {
    let count = usize::try_from(count).map_err(|_| PackError::Truncated { offset: body })?;
    if bytes.len().saturating_sub(body) < count {
        return Err(PackError::Truncated { offset: body });
    }

    Ok(count)
}

/// Widen an IEEE 754 half-precision float.
pub(crate) fn f16_to_f64(bits: u16) -> f64 {
    let negative = bits & 0x8000 != 0;
    let exponent = i32::from((bits >> 10) & 0x1f);
    let fraction = f64::from(bits & 0x03ff);

    let magnitude = match exponent {
        0 => fraction * 2f64.powi(-24),
        31 if fraction == 0.0 => f64::INFINITY,
        31 => f64::NAN,
        _ => (1.0 + fraction / 1024.0) * 2f64.powi(exponent - 15),
    };

    if negative { -magnitude } else { magnitude }
}
