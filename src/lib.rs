//! A line-oriented Brainfuck interpreter.
//!
//! Every line of the input is an independent program. The interpreter reads
//! it symbol by symbol from a [`SymbolSource`], re-entering loops by
//! rewinding the source instead of holding the program in memory.
//!
//! Features and behaviors:
//! - Circular tape of 8192 `u8` cells by default, reset for every program.
//! - Cell values and the pointer wrap around; neither ever errors.
//! - `.` writes the current cell as a raw byte to any [`std::io::Write`].
//! - No input instruction: `,` is ignored like any other non-instruction character.
//! - A newline ends the current program.
//! - Unbalanced brackets are reported as [`InterpreterError::UnmatchedBrackets`].
//!
//! Quick start:
//!
//! ```
//! use bf_lines::{BufferedSource, Interpreter};
//!
//! let mut src = BufferedSource::new("++++++++[>++++++++<-]>+.+.\n");
//! let mut out = Vec::new();
//! let summary = Interpreter::new().run(&mut src, &mut out).expect("program should run");
//! assert_eq!(out, b"AB");
//! assert_eq!(summary.bytes_written, 2);
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod interpreter;
pub mod source;

pub use interpreter::{
    DEFAULT_TAPE_SIZE, Interpreter, InterpreterError, RunSummary, Tape, Terminator,
    UnmatchedBracketKind,
};
pub use source::{BufferedSource, LineSource, StreamSource, SymbolSource};
