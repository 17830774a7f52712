//! Trait integration for [`StagingBuffer`].
//!
//! - [`std::io::Write`] appends, surfacing back-pressure as `WouldBlock`
//! - [`std::io::Read`] drains; `Ok(0)` means nothing is buffered right now
//! - [`bytes::Buf`] exposes the unread bytes run by run

use std::io;

use bytes::Buf;

use super::StagingBuffer;

impl io::Write for StagingBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for StagingBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf))
    }
}

impl Buf for StagingBuffer {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.first_run()
    }

    fn advance(&mut self, mut cnt: usize) {
        while cnt > 0 {
            let n = self.peek_read(cnt).len();
            assert!(n > 0, "cannot advance past `remaining`");
            cnt -= n;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use bytes::Buf;

    use crate::StagingBuffer;

    #[test]
    fn test_write_then_read() {
        let mut buf = StagingBuffer::with_limits(4, 4).unwrap();
        buf.write_all(b"staged bytes").unwrap();

        let mut out = Vec::new();
        buf.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"staged bytes");
    }

    #[test]
    fn test_write_would_block_when_full() {
        let mut buf = StagingBuffer::with_limits(1, 4).unwrap();
        assert_eq!(buf.write(b"abcdef").unwrap(), 4);

        let err = buf.write(b"g").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
    }

    #[test]
    fn test_buf_chunk_and_advance() {
        let mut buf = StagingBuffer::with_limits(3, 4).unwrap();
        buf.append(b"abcdefgh").unwrap();

        assert_eq!(buf.remaining(), 8);
        assert_eq!(buf.chunk(), b"abcd");

        buf.advance(6);
        assert_eq!(buf.remaining(), 2);
        assert_eq!(buf.chunk(), b"gh");
        assert_eq!(buf.chunk_count(), 1);
    }

    #[test]
    fn test_buf_copy_to_bytes() {
        let mut buf = StagingBuffer::with_limits(3, 4).unwrap();
        buf.append(b"0123456789").unwrap();

        let bytes = buf.copy_to_bytes(6);
        assert_eq!(&bytes[..], b"012345");
        assert_eq!(buf.get_u8(), b'6');
        assert_eq!(buf.remaining(), 3);
    }

    #[test]
    #[should_panic(expected = "cannot advance past `remaining`")]
    fn test_advance_past_remaining_panics() {
        let mut buf = StagingBuffer::with_limits(1, 4).unwrap();
        buf.append(b"ab").unwrap();
        buf.advance(3);
    }
}
