//! Bounded capture buffers for subprocess output.
//!
//! Keeps the most recent `cap` bytes of a pipe, so a misbehaving engine
//! cannot grow the front end's memory without bound. The tail is what
//! matters for diagnostics.

/// A byte buffer that retains at most the last `cap` bytes written.
#[derive(Debug)]
pub struct CaptureBuffer {
    bytes: Vec<u8>,
    cap: usize,
    total_written: usize,
}

impl CaptureBuffer {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            bytes: Vec::new(),
            cap,
            total_written: 0,
        }
    }

    /// Append a chunk, discarding the oldest bytes once over capacity.
    pub fn write(&mut self, chunk: &[u8]) {
        self.total_written += chunk.len();
        if chunk.len() >= self.cap {
            self.bytes.clear();
            self.bytes.extend_from_slice(&chunk[chunk.len() - self.cap..]);
            return;
        }
        let overflow = (self.bytes.len() + chunk.len()).saturating_sub(self.cap);
        if overflow > 0 {
            self.bytes.drain(..overflow);
        }
        self.bytes.extend_from_slice(chunk);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether older bytes have been discarded.
    #[must_use]
    pub const fn was_truncated(&self) -> bool {
        self.total_written > self.cap
    }

    /// The retained tail as (lossy) UTF-8 text.
    #[must_use]
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_under_capacity() {
        let mut buf = CaptureBuffer::new(16);
        buf.write(b"hello");
        assert_eq!(buf.len(), 5);
        assert!(!buf.was_truncated());
        assert_eq!(buf.into_string(), "hello");
    }

    #[test]
    fn test_capture_keeps_tail_across_writes() {
        let mut buf = CaptureBuffer::new(10);
        buf.write(b"12345");
        buf.write(b"67890");
        buf.write(b"ABCDE");
        assert_eq!(buf.len(), 10);
        assert!(buf.was_truncated());
        assert_eq!(buf.into_string(), "67890ABCDE");
    }

    #[test]
    fn test_single_oversized_write_keeps_tail() {
        let mut buf = CaptureBuffer::new(5);
        buf.write(b"hello world");
        assert_eq!(buf.into_string(), "world");
    }

    #[test]
    fn test_exact_capacity_is_not_truncation() {
        let mut buf = CaptureBuffer::new(10);
        buf.write(b"1234567890");
        assert!(!buf.was_truncated());
        assert_eq!(buf.into_string(), "1234567890");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut buf = CaptureBuffer::new(10);
        buf.write(&[0xFF, 0xFE]);
        assert!(!buf.into_string().is_empty());
    }

    #[test]
    fn test_empty_buffer() {
        let buf = CaptureBuffer::new(10);
        assert!(buf.is_empty());
        assert_eq!(buf.into_string(), "");
    }
}
