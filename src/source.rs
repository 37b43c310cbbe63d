//! Symbol sources the interpreter reads programs from.
//!
//! A source hands out one byte at a time and can be rewound to any position
//! it has already reported. Loops are re-entered by rewinding, so the
//! interpreter never needs to hold the program text itself.

use std::io::{self, BufRead, BufReader, Read, Seek};

/// A cursor over program text that supports loop re-entry.
pub trait SymbolSource {
    /// Read the next symbol, or `None` at end of input.
    fn next_symbol(&mut self) -> io::Result<Option<u8>>;

    /// Current cursor position: the offset of the symbol `next_symbol` would return.
    fn position(&self) -> u64;

    /// Move the cursor back to a position previously returned by [`position`](Self::position).
    fn rewind(&mut self, position: u64) -> io::Result<()>;

    /// Consume everything up to and including the next newline.
    ///
    /// Returns the consumed bytes without the newline. Used to discard the
    /// remainder of a program that failed part-way through its line.
    fn skip_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        while let Some(b) = self.next_symbol()? {
            if b == b'\n' {
                break;
            }
            line.push(b);
        }
        Ok(line)
    }
}

/// Reads symbols from a seekable stream without buffering the program.
///
/// The offset is tracked locally so `position` never touches the underlying
/// stream; only `rewind` seeks.
pub struct StreamSource<R> {
    reader: BufReader<R>,
    offset: u64,
}

impl<R: Read + Seek> StreamSource<R> {
    /// Wrap `inner`, starting at its current stream position.
    pub fn new(inner: R) -> io::Result<Self> {
        let mut reader = BufReader::new(inner);
        let offset = reader.stream_position()?;
        Ok(Self { reader, offset })
    }
}

impl<R: Read + Seek> SymbolSource for StreamSource<R> {
    fn next_symbol(&mut self) -> io::Result<Option<u8>> {
        let b = match self.reader.fill_buf()? {
            [] => return Ok(None),
            [b, ..] => *b,
        };
        self.reader.consume(1);
        self.offset += 1;
        Ok(Some(b))
    }

    fn position(&self) -> u64 {
        self.offset
    }

    fn rewind(&mut self, position: u64) -> io::Result<()> {
        let delta = position as i64 - self.offset as i64;
        // Short backward jumps usually stay inside the buffer.
        self.reader.seek_relative(delta)?;
        self.offset = position;
        Ok(())
    }
}

/// Reads a non-seekable input (pipes, FIFOs, stdin) one line at a time.
///
/// Only the current line is held in memory. A run never rewinds past the
/// start of its own line, since a newline ends it, so that is all loops need.
pub struct LineSource<R> {
    reader: R,
    line: Vec<u8>,
    line_start: u64,
    cursor: usize,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_start: 0,
            cursor: 0,
        }
    }
}

impl<R: BufRead> SymbolSource for LineSource<R> {
    fn next_symbol(&mut self) -> io::Result<Option<u8>> {
        if self.cursor == self.line.len() {
            self.line_start += self.line.len() as u64;
            self.line.clear();
            self.cursor = 0;
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
        }
        let b = self.line[self.cursor];
        self.cursor += 1;
        Ok(Some(b))
    }

    fn position(&self) -> u64 {
        self.line_start + self.cursor as u64
    }

    fn rewind(&mut self, position: u64) -> io::Result<()> {
        let cursor = position
            .checked_sub(self.line_start)
            .and_then(|c| usize::try_from(c).ok())
            .filter(|c| *c <= self.line.len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("rewind to {position} outside the current line"),
                )
            })?;
        self.cursor = cursor;
        Ok(())
    }
}

/// Holds the whole text in memory and walks it by index.
///
/// Used when buffering is requested.
#[derive(Debug, Clone, Default)]
pub struct BufferedSource {
    text: Vec<u8>,
    cursor: usize,
}

impl BufferedSource {
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
        }
    }

    /// Drain `reader` to end of input into a new source.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut text = Vec::new();
        reader.read_to_end(&mut text)?;
        Ok(Self::new(text))
    }
}

impl SymbolSource for BufferedSource {
    fn next_symbol(&mut self) -> io::Result<Option<u8>> {
        let b = self.text.get(self.cursor).copied();
        if b.is_some() {
            self.cursor += 1;
        }
        Ok(b)
    }

    fn position(&self) -> u64 {
        self.cursor as u64
    }

    fn rewind(&mut self, position: u64) -> io::Result<()> {
        let position = usize::try_from(position)
            .ok()
            .filter(|p| *p <= self.text.len())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("rewind past end of buffered program ({position})"),
                )
            })?;
        self.cursor = position;
        Ok(())
    }
}
