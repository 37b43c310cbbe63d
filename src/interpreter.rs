//! The interpreter core.
//!
//! Behavior:
//! - Memory tape of `u8` cells (8192 by default), all zero at the start of each run.
//! - Cell arithmetic wraps mod 256; the pointer wraps around both ends of the tape.
//! - `.` writes the current cell to the output as a raw byte.
//! - `[`/`]` loop while the current cell is nonzero. Loops are re-entered by
//!   rewinding the [`SymbolSource`] to the position just after the `[`.
//! - A newline ends the run; so does end of input.
//! - Every other character, `,` included, is ignored.
//! - Unbalanced brackets are reported as [`InterpreterError::UnmatchedBrackets`].
//!
//! ```
//! use bf_lines::{BufferedSource, Interpreter};
//!
//! let mut src = BufferedSource::new("++[>++<-]>.");
//! let mut out = Vec::new();
//! Interpreter::new().run(&mut src, &mut out).unwrap();
//! assert_eq!(out, [4]);
//! ```

use std::fmt;
use std::io::{self, Write};
use std::num::NonZeroUsize;

use crate::source::SymbolSource;

/// Tape length used when none is configured.
pub const DEFAULT_TAPE_SIZE: NonZeroUsize = NonZeroUsize::new(8192).unwrap();

/// Errors that can occur while interpreting a program.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// Loops were not balanced: a `]` with nothing open, or a `[` still open when the run ended.
    #[error("Unmatched bracket {kind} at instruction {ip}")]
    UnmatchedBrackets { ip: usize, kind: UnmatchedBracketKind },

    /// Reading the program or writing output failed.
    #[error("I/O error at instruction {ip}: {source}")]
    IoError {
        ip: usize,
        #[source]
        source: io::Error,
    },
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Newline,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub terminated_by: Terminator,
    /// Symbols read during the run, counting re-reads after a loop rewind.
    pub symbols_read: usize,
    pub bytes_written: usize,
}

/// Fixed-size circular tape of byte cells.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Box<[u8]>,
    pointer: usize,
}

impl Tape {
    pub fn new(size: NonZeroUsize) -> Self {
        Self {
            cells: vec![0; size.get()].into_boxed_slice(),
            pointer: 0,
        }
    }

    /// Zero every cell and move the pointer home.
    pub fn reset(&mut self) {
        self.cells.fill(0);
        self.pointer = 0;
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn increment(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_sub(1);
    }

    pub fn move_right(&mut self) {
        self.pointer = if self.pointer == self.cells.len() - 1 {
            0
        } else {
            self.pointer + 1
        };
    }

    pub fn move_left(&mut self) {
        self.pointer = if self.pointer == 0 {
            self.cells.len() - 1
        } else {
            self.pointer - 1
        };
    }
}

/// Runs one program per call against a tape it owns.
#[derive(Debug, Clone)]
pub struct Interpreter {
    tape: Tape,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter with a [`DEFAULT_TAPE_SIZE`] tape.
    pub fn new() -> Self {
        Self::with_tape_size(DEFAULT_TAPE_SIZE)
    }

    pub fn with_tape_size(tape_size: NonZeroUsize) -> Self {
        Self {
            tape: Tape::new(tape_size),
        }
    }

    /// Tape state left behind by the most recent run.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Execute symbols from `source` until a newline or end of input.
    ///
    /// The tape is reset first, so no state carries over from earlier runs.
    /// Bytes written before an error stay written.
    pub fn run<S, W>(&mut self, source: &mut S, out: &mut W) -> Result<RunSummary, InterpreterError>
    where
        S: SymbolSource + ?Sized,
        W: Write + ?Sized,
    {
        self.tape.reset();

        let start = source.position();
        let ip_of = |pos: u64| pos.saturating_sub(start) as usize;

        // Each entry is the position just after an executing '['.
        let mut loops: Vec<u64> = Vec::new();
        let mut skip_depth: usize = 0;
        let mut skip_origin: u64 = start;

        let mut symbols_read = 0usize;
        let mut bytes_written = 0usize;

        let terminated_by = loop {
            let pos = source.position();
            let symbol = source
                .next_symbol()
                .map_err(|e| InterpreterError::IoError { ip: ip_of(pos), source: e })?;
            let Some(symbol) = symbol else {
                break Terminator::EndOfInput;
            };
            symbols_read += 1;

            if symbol == b'\n' {
                break Terminator::Newline;
            }

            if skip_depth > 0 {
                match symbol {
                    b'[' => skip_depth += 1,
                    b']' => {
                        skip_depth -= 1;
                        if skip_depth == 0 {
                            log::trace!("resume after skipped loop at {}", ip_of(pos));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match symbol {
                b'+' => self.tape.increment(),
                b'-' => self.tape.decrement(),
                b'>' => self.tape.move_right(),
                b'<' => self.tape.move_left(),
                b'.' => {
                    out.write_all(&[self.tape.current()])
                        .map_err(|e| InterpreterError::IoError { ip: ip_of(pos), source: e })?;
                    bytes_written += 1;
                }
                b'[' => {
                    if self.tape.current() != 0 {
                        loops.push(source.position());
                    } else {
                        log::trace!("skip loop at {}", ip_of(pos));
                        skip_depth = 1;
                        skip_origin = pos;
                    }
                }
                b']' => {
                    let Some(&entry) = loops.last() else {
                        return Err(InterpreterError::UnmatchedBrackets {
                            ip: ip_of(pos),
                            kind: UnmatchedBracketKind::Close,
                        });
                    };
                    if self.tape.current() != 0 {
                        source
                            .rewind(entry)
                            .map_err(|e| InterpreterError::IoError { ip: ip_of(pos), source: e })?;
                    } else {
                        loops.pop();
                    }
                }
                _ => {}
            }
        };

        if skip_depth > 0 {
            return Err(InterpreterError::UnmatchedBrackets {
                ip: ip_of(skip_origin),
                kind: UnmatchedBracketKind::Open,
            });
        }
        if let Some(&entry) = loops.last() {
            return Err(InterpreterError::UnmatchedBrackets {
                // The '[' sits one symbol before its recorded entry.
                ip: ip_of(entry - 1),
                kind: UnmatchedBracketKind::Open,
            });
        }

        Ok(RunSummary {
            terminated_by,
            symbols_read,
            bytes_written,
        })
    }
}
