// src/common/buffer.rs

//! Fixed-capacity accumulator for one reply.
//!
//! A [`ResponseBuffer`] is created empty for every transaction, fed byte by byte
//! while the reply arrives and finally sealed into a read-only [`Reply`].

use core::str;

/// Capacity of the reply buffer used by the driver, terminator slot included.
pub const RESPONSE_CAPACITY: usize = 255;

/// Returned by [`ResponseBuffer::append`] once the buffer is full.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferOverflow;

#[derive(Debug, Clone)]
pub struct ResponseBuffer<const N: usize = RESPONSE_CAPACITY> {
    data: [u8; N],
    len: usize,
    lines: usize,
}

impl<const N: usize> ResponseBuffer<N> {
    /// Bytes that can be stored; one slot is reserved for the terminator.
    pub const USABLE: usize = N.saturating_sub(1);

    pub const fn new() -> Self {
        ResponseBuffer { data: [0; N], len: 0, lines: 0 }
    }

    pub fn reset(&mut self) {
        self.data = [0; N];
        self.len = 0;
        self.lines = 0;
    }

    /// Stores one received byte.
    ///
    /// `\r` is dropped, as is a `\n` arriving while the buffer is still empty
    /// (the tail of the previous line). Every stored `\n` counts as a line.
    pub fn append(&mut self, byte: u8) -> Result<(), BufferOverflow> {
        if self.len >= Self::USABLE {
            return Err(BufferOverflow);
        }
        match byte {
            b'\r' => {}
            b'\n' if self.len == 0 => {}
            _ => {
                self.data[self.len] = byte;
                self.len += 1;
                if byte == b'\n' {
                    self.lines += 1;
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len >= Self::USABLE
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Whether `needle` occurs anywhere in what has been stored so far.
    pub fn matches(&self, needle: &[u8]) -> bool {
        contains(self.as_bytes(), needle)
    }

    /// Terminates the contents and freezes them for reading.
    ///
    /// Bytes that are not valid UTF-8 (line noise, a stray wake byte, a truncated
    /// multi-byte character) are replaced with `?` so the rest of the reply stays
    /// readable as text.
    pub fn seal(mut self) -> Reply<N> {
        self.replace_invalid_utf8();
        if self.len < N {
            self.data[self.len] = 0;
        }
        Reply { inner: self }
    }

    fn replace_invalid_utf8(&mut self) {
        let mut start = 0;
        while start < self.len {
            match str::from_utf8(&self.data[start..self.len]) {
                Ok(_) => break,
                Err(e) => {
                    let bad = start + e.valid_up_to();
                    let end = e.error_len().map_or(self.len, |len| bad + len);
                    self.data[bad..end].fill(b'?');
                    start = end;
                }
            }
        }
    }
}

impl<const N: usize> Default for ResponseBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A sealed, read-only reply.
#[derive(Debug, Clone)]
pub struct Reply<const N: usize = RESPONSE_CAPACITY> {
    inner: ResponseBuffer<N>,
}

impl<const N: usize> Reply<N> {
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// The reply as text; sealing already replaced invalid UTF-8 with `?`.
    pub fn as_str(&self) -> &str {
        str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.inner.line_count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.inner.matches(needle.as_bytes())
    }

    /// Lines of the reply, without their `\n`.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.as_str().lines()
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
