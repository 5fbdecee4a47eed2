use std::io;

/// Stream decompression capability for one codec name.
///
/// Each `Decompressor`:
/// - Is identified by the codec name stored in the container header
///   (`"zlib"`, `"lzma2"`, ...).
/// - Receives exactly the compressed bytes of one group. It never sees the
///   surrounding file, so a codec cannot read into the next group even when
///   the group's declared length is wrong.
/// - Must fail, not allocate without bound, when the output would exceed
///   `max_output` bytes.
pub trait Decompressor: Send + Sync {
    /// Codec name as it appears in the header.
    fn name(&self) -> &'static str;

    /// Decompress one complete group payload.
    fn decompress(&self, compressed: &[u8], max_output: usize) -> io::Result<Vec<u8>>;
}

/// `io::Write` sink that refuses to grow past `limit` bytes.
///
/// Used by decoders that push their output into a writer instead of being
/// pulled through `Read::take`.
pub(crate) struct LimitedWriter {
    buf: Vec<u8>,
    limit: usize,
}

impl LimitedWriter {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
        }
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl io::Write for LimitedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.len() + data.len() > self.limit {
            return Err(limit_exceeded(self.limit));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn limit_exceeded(limit: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("decompressed group exceeds limit of {limit} bytes"),
    )
}
