use std::io;

use flate2::{Decompress, FlushDecompress, Status};

use crate::decompressor::{limit_exceeded, Decompressor};

/// zlib (RFC 1950) stream decompressor.
///
/// Driven through `flate2::Decompress` directly so that a stream cut short
/// (missing final block or adler32 trailer) is an error rather than a
/// silently shorter result.
pub struct ZlibDecompressor;

impl Decompressor for ZlibDecompressor {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn decompress(&self, compressed: &[u8], max_output: usize) -> io::Result<Vec<u8>> {
        let mut inflater = Decompress::new(true);
        let mut out = Vec::new();
        loop {
            if out.len() == out.capacity() {
                // Room for one byte past the limit tells "at" from "over".
                if out.len() > max_output {
                    return Err(limit_exceeded(max_output));
                }
                let room = max_output
                    .saturating_add(1)
                    .saturating_sub(out.len())
                    .min(out.capacity().max(4096));
                out.reserve_exact(room);
            }

            let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
            let input = compressed.get(in_before as usize..).unwrap_or(&[]);
            let status = inflater
                .decompress_vec(input, &mut out, FlushDecompress::None)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("zlib: {e}")))?;

            if out.len() > max_output {
                return Err(limit_exceeded(max_output));
            }
            if status == Status::StreamEnd {
                return Ok(out);
            }
            let stalled = inflater.total_in() == in_before && inflater.total_out() == out_before;
            if stalled && out.len() < out.capacity() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "zlib: stream ends before its final block",
                ));
            }
        }
    }
}
