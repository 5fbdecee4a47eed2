use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::decompressor::{limit_exceeded, Decompressor, LimitedWriter};

/// Raw LZMA2 stream decompressor (no xz container, no properties header).
///
/// Backed by the pure-Rust `lzma-rs` decoder, so no system liblzma is needed.
/// That decoder buffers its whole output before handing it over, so the
/// output cap is enforced up front from the chunk headers.
pub struct Lzma2Decompressor;

impl Decompressor for Lzma2Decompressor {
    fn name(&self) -> &'static str {
        "lzma2"
    }

    fn decompress(&self, compressed: &[u8], max_output: usize) -> io::Result<Vec<u8>> {
        if declared_size(compressed)? > max_output as u64 {
            return Err(limit_exceeded(max_output));
        }
        let mut input = compressed;
        let mut out = LimitedWriter::new(max_output);
        // lzma-rs makes no panic-freedom promise for hostile streams.
        let result = catch_unwind(AssertUnwindSafe(|| {
            lzma_rs::lzma2_decompress(&mut input, &mut out)
        }))
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "lzma2: decoder panicked"))?;
        result.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("lzma2: {e}")))?;
        Ok(out.into_inner())
    }
}

/// Total unpacked size declared by the chunk headers of a raw LZMA2 stream.
///
/// Chunks:
/// - `0x00`: end of stream.
/// - `0x01`, `0x02`: uncompressed; `u16` size - 1, then the bytes.
/// - `0x80..=0xFF`: LZMA; low 5 control bits + `u16` are unpacked size - 1,
///   then `u16` packed size - 1, a props byte when control >= `0xC0`, then
///   the packed bytes.
fn declared_size(stream: &[u8]) -> io::Result<u64> {
    let mut pos = 0usize;
    let mut total = 0u64;
    loop {
        let control = *stream.get(pos).ok_or_else(truncated)?;
        match control {
            0x00 => return Ok(total),
            0x01 | 0x02 => {
                let size = u64::from(be16(stream, pos + 1)?) + 1;
                total += size;
                pos += 3 + size as usize;
            }
            0x80..=0xFF => {
                let high = u64::from(control & 0x1F) << 16;
                total += high + u64::from(be16(stream, pos + 1)?) + 1;
                let packed = usize::from(be16(stream, pos + 3)?) + 1;
                let props = usize::from(control >= 0xC0);
                pos += 5 + props + packed;
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("lzma2: invalid chunk control byte {control:#04x}"),
                ))
            }
        }
    }
}

fn be16(stream: &[u8], pos: usize) -> io::Result<u16> {
    let bytes = stream.get(pos..pos + 2).ok_or_else(truncated)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn truncated() -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "lzma2: stream ends before its end marker",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `chunks` LZMA chunks each declaring 2 MiB unpacked from one packed byte.
    fn inflated_headers(chunks: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for i in 0..chunks {
            let control = if i == 0 { 0xFF } else { 0x9F };
            out.extend_from_slice(&[control, 0xFF, 0xFF, 0x00, 0x00]);
            if control >= 0xC0 {
                out.push(0x5D);
            }
            out.push(0x00);
        }
        out.push(0x00);
        out
    }

    fn lzma2(raw: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        lzma_rs::lzma2_compress(&mut &raw[..], &mut out).unwrap();
        out
    }

    #[test]
    fn test_decompress_lzma2() {
        let raw = b"Hello, Earth!";
        let out = Lzma2Decompressor.decompress(&lzma2(raw), 1024).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn test_output_limit_is_enforced() {
        let raw = vec![7u8; 4096];
        assert!(Lzma2Decompressor.decompress(&lzma2(&raw), 4095).is_err());
        assert_eq!(
            Lzma2Decompressor.decompress(&lzma2(&raw), 4096).unwrap().len(),
            4096
        );
    }

    #[test]
    fn test_declared_size_of_real_stream() {
        let raw = vec![0u8; 200_000];
        assert_eq!(declared_size(&lzma2(&raw)).unwrap(), 200_000);
        assert_eq!(declared_size(&[0x00]).unwrap(), 0);
    }

    #[test]
    fn test_declared_size_of_lzma_chunks() {
        assert_eq!(declared_size(&inflated_headers(3)).unwrap(), 3 * (2 << 20));
    }

    #[test]
    fn test_declared_size_rejects_bad_headers() {
        assert!(declared_size(&[]).is_err());
        assert!(declared_size(&[0x01, 0x00]).is_err());
        assert!(declared_size(&[0x40]).is_err());
        // Missing end marker.
        assert!(declared_size(&[0x01, 0x00, 0x00, b'a']).is_err());
    }

    #[test]
    fn test_oversized_declaration_rejected_before_decoding() {
        // Would need 128 MiB of output; the packed bytes are not even valid.
        let err = Lzma2Decompressor
            .decompress(&inflated_headers(64), 1 << 20)
            .unwrap_err();
        assert!(err.to_string().contains("exceeds limit"), "got: {err}");
    }

    #[test]
    fn test_uncompressed_chunks_count_toward_limit() {
        let raw = vec![0u8; 300_000];
        let err = Lzma2Decompressor
            .decompress(&lzma2(&raw), 100_000)
            .unwrap_err();
        assert!(err.to_string().contains("exceeds limit"), "got: {err}");
    }

    #[test]
    fn test_truncated_stream_is_an_error() {
        let packed = lzma2(b"some longer payload that spans a chunk");
        assert!(Lzma2Decompressor
            .decompress(&packed[..packed.len() / 2], 1024)
            .is_err());
    }
}
