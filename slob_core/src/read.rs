//! Big-endian primitive reads at explicit offsets.
//!
//! Each function takes the position to read from and returns the value
//! together with the number of bytes it consumed, so callers chain fields by
//! adding lengths instead of sharing a cursor. Bounds are checked against the
//! source length before anything is allocated.

use crate::error::{Result, SlobError};
use crate::source::Source;

fn check_bounds<S: Source + ?Sized>(src: &S, pos: u64, len: u64) -> Result<()> {
    match pos.checked_add(len) {
        Some(end) if end <= src.len() => Ok(()),
        _ => Err(SlobError::ShortRead { pos, len }),
    }
}

pub(crate) fn read_array<const N: usize, S: Source + ?Sized>(
    src: &S,
    pos: u64,
) -> Result<[u8; N]> {
    check_bounds(src, pos, N as u64)?;
    let mut buf = [0u8; N];
    src.read_exact_at(pos, &mut buf)?;
    Ok(buf)
}

/// Read `len` raw bytes at `pos`.
pub(crate) fn read_bytes<S: Source + ?Sized>(src: &S, pos: u64, len: u64) -> Result<Vec<u8>> {
    check_bounds(src, pos, len)?;
    // Bounded by the source length, which is already addressable memory or a file.
    let len = usize::try_from(len).map_err(|_| SlobError::ShortRead { pos, len })?;
    let mut buf = vec![0u8; len];
    src.read_exact_at(pos, &mut buf)?;
    Ok(buf)
}

pub(crate) fn read_u8<S: Source + ?Sized>(src: &S, pos: u64) -> Result<u8> {
    Ok(read_array::<1, S>(src, pos)?[0])
}

pub(crate) fn read_u16<S: Source + ?Sized>(src: &S, pos: u64) -> Result<u16> {
    Ok(u16::from_be_bytes(read_array(src, pos)?))
}

pub(crate) fn read_u32<S: Source + ?Sized>(src: &S, pos: u64) -> Result<u32> {
    Ok(u32::from_be_bytes(read_array(src, pos)?))
}

pub(crate) fn read_u64<S: Source + ?Sized>(src: &S, pos: u64) -> Result<u64> {
    Ok(u64::from_be_bytes(read_array(src, pos)?))
}

/// 1-byte length prefix followed by raw bytes. Returns `(bytes, consumed)`.
pub(crate) fn read_byte_string<S: Source + ?Sized>(src: &S, pos: u64) -> Result<(Vec<u8>, u64)> {
    let len = u64::from(read_u8(src, pos)?);
    let bytes = read_bytes(src, next(pos, 1)?, len)?;
    Ok((bytes, 1 + len))
}

/// "Tiny text": 1-byte length prefix, UTF-8 validated. Returns `(text, consumed)`.
pub(crate) fn read_tiny_text<S: Source + ?Sized>(src: &S, pos: u64) -> Result<(String, u64)> {
    let (bytes, consumed) = read_byte_string(src, pos)?;
    Ok((utf8(bytes, pos)?, consumed))
}

/// "Text": 2-byte length prefix, UTF-8 validated. Returns `(text, consumed)`.
pub(crate) fn read_text<S: Source + ?Sized>(src: &S, pos: u64) -> Result<(String, u64)> {
    let len = u64::from(read_u16(src, pos)?);
    let bytes = read_bytes(src, next(pos, 2)?, len)?;
    Ok((utf8(bytes, pos)?, 2 + len))
}

/// `pos + n`, reporting overflow as a format error.
pub(crate) fn next(pos: u64, n: u64) -> Result<u64> {
    pos.checked_add(n).ok_or_else(|| SlobError::overflow("field offset"))
}

fn utf8(bytes: Vec<u8>, pos: u64) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| SlobError::InvalidUtf8 { pos })
}
