use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::part::Part;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Blank line written after every part.
const PART_SEPARATOR: &[u8] = b"\n\n";

/// Writes rendered parts to any `Write` stream.
///
/// The output is valid decoder input: parts follow each other separated by
/// a blank line.
pub struct PartWriter<T> {
    inner: T,
    buf: BytesMut,
    written: usize,
}

impl<T: Write> PartWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            written: 0,
        }
    }

    /// Write one part followed by a blank line, then flush (blocking).
    pub fn write_part(&mut self, part: &Part) -> Result<()> {
        self.buf.clear();
        self.buf.put_slice(part.text().as_bytes());
        self.buf.put_slice(PART_SEPARATOR);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.written += 1;
        self.flush()
    }

    /// Write every part in order.
    pub fn write_parts<'a, I>(&mut self, parts: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Part>,
    {
        parts.into_iter().try_for_each(|part| self.write_part(part))
    }

    /// Number of parts written so far.
    pub fn parts_written(&self) -> usize {
        self.written
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
