use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads captured part text from any `Read` stream.
///
/// A blob is everything the stream yields until EOF. It may hold one part,
/// many parts, or noise around them; the decoder sorts that out.
pub struct PartReader<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Read> PartReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Read the stream to EOF and return it as text (blocking).
    ///
    /// Returns `Err(FrameError::InvalidText)` if the stream is not UTF-8.
    pub fn read_blob(&mut self) -> Result<String> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                break;
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }

        let bytes = self.buf.split().to_vec();
        Ok(String::from_utf8(bytes)?)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// Read one blob from each stream, in order.
pub fn read_blobs<I, R>(sources: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = R>,
    R: Read,
{
    sources
        .into_iter()
        .map(|source| PartReader::new(source).read_blob())
        .collect()
}
