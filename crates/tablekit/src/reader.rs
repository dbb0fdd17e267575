//! Lazy line source over the request stream.
//!
//! Lines are read as raw bytes. Text decoding happens per line in the
//! dispatcher, so one badly encoded request is a rejected line rather than a
//! broken stream.

use std::io::{self, BufRead};

/// Iterator yielding raw request lines until the input stream is exhausted.
///
/// Line terminators (`\n` or `\r\n`) are stripped. A final line without a
/// terminator is still yielded. Once the stream reports end-of-input the
/// reader is fused and yields nothing further.
#[derive(Debug)]
pub struct LineReader<R> {
    input: R,
    buffer: Vec<u8>,
    exhausted: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Wraps a buffered input stream.
    pub const fn new(input: R) -> Self {
        Self {
            input,
            buffer: Vec::new(),
            exhausted: false,
        }
    }

    /// Reads the next line as bytes.
    ///
    /// Returns `Ok(None)` at end-of-input.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if reading fails.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        if self.exhausted {
            return Ok(None);
        }

        self.buffer.clear();
        let bytes_read = self.input.read_until(b'\n', &mut self.buffer)?;
        if bytes_read == 0 {
            self.exhausted = true;
            return Ok(None);
        }

        Ok(Some(trim_line_terminator(&self.buffer)))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
            .map(|line| line.map(<[u8]>::to_vec))
            .transpose()
    }
}

fn trim_line_terminator(line: &[u8]) -> &[u8] {
    let without_newline = line.strip_suffix(b"\n").unwrap_or(line);
    without_newline
        .strip_suffix(b"\r")
        .unwrap_or(without_newline)
}
