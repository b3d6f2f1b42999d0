//! Remote evaluation wire codec.
//!
//! A request is exactly `n_features` IEEE-754 little-endian `f64` values; the
//! response is exactly one. There is no framing beyond the fixed size, so both
//! peers agree on `n_features` out of band. One request is in flight per
//! connection.
//!
//! Both sides loop over partial reads and writes. A zero-length read means the
//! peer shut down.

use std::io::{self, ErrorKind, Read, Write};

/// Bytes per encoded value.
pub const VALUE_BYTES: usize = 8;

/// Encode `values` as contiguous little-endian `f64`s.
#[must_use]
pub fn encode_values(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * VALUE_BYTES);
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decode contiguous little-endian `f64`s. Trailing bytes short of a full
/// value are ignored.
#[must_use]
pub fn decode_values(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(VALUE_BYTES)
        .map(|chunk| {
            let mut raw = [0u8; VALUE_BYTES];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect()
}

/// Fill `buf` from `reader`, looping over short reads.
///
/// Returns the number of bytes read; less than `buf.len()` only when the
/// peer shut down first.
///
/// # Errors
///
/// Propagates any I/O error other than `Interrupted`.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Write `values` as one logical message.
///
/// # Errors
///
/// Propagates I/O errors; a peer that stops accepting bytes yields `WriteZero`.
pub fn write_values<W: Write + ?Sized>(writer: &mut W, values: &[f64]) -> io::Result<()> {
    writer.write_all(&encode_values(values))?;
    writer.flush()
}

/// Read exactly `count` values.
///
/// Returns `Ok(None)` when the peer shut down cleanly before the first byte.
///
/// # Errors
///
/// `UnexpectedEof` if the peer shut down mid-message; other I/O errors as-is.
pub fn read_values<R: Read + ?Sized>(reader: &mut R, count: usize) -> io::Result<Option<Vec<f64>>> {
    let mut buf = vec![0u8; count * VALUE_BYTES];
    let filled = read_full(reader, &mut buf)?;
    if filled == 0 && !buf.is_empty() {
        return Ok(None);
    }
    if filled < buf.len() {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("peer closed after {filled} of {} bytes", buf.len()),
        ));
    }
    Ok(Some(decode_values(&buf)))
}
