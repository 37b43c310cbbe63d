use std::io::{self, Write};
use crate::{InterpreterError, UnmatchedBracketKind};

/// Pretty-print a structured [`InterpreterError`] with caret positioning.
///
/// `line_no` is 1-based; `line` is the raw failing program (without its
/// newline) used for the context window. Error positions are byte offsets and
/// are converted to char columns here.
pub fn print_run_error(program: &str, line_no: usize, line: &[u8], err: &InterpreterError) {
    let text = String::from_utf8_lossy(line);
    let column = |ip: usize| char_column(line, ip);

    match err {
        InterpreterError::UnmatchedBrackets { ip, kind } => {
            let detail = match kind {
                UnmatchedBracketKind::Open => "never closed",
                UnmatchedBracketKind::Close => "has no opening '['",
            };
            let msg = format!(
                "{program}: Parse error: unmatched bracket {kind} ({detail}) on line {line_no}"
            );
            print_error_with_context(&msg, &text, column(*ip));
        }
        InterpreterError::IoError { ip, source } => {
            let msg = format!("{program}: I/O error: {source} on line {line_no}");
            print_error_with_context(&msg, &text, column(*ip));
        }
    }
}

/// Print a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix} at instruction {pos}");
    let (slice, caret) = context_window(code, pos);
    eprintln!("  {slice}");
    eprintln!("  {caret}");
    let _ = io::stderr().flush();
}

/// Show a short window of `code` around char index `pos` plus a caret line under it.
fn context_window(code: &str, pos: usize) -> (&str, String) {
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(code, start_char);
    let end_byte = char_to_byte_index(code, end_char);

    let caret_offset_chars = pos.saturating_sub(start_char);
    let mut underline = " ".repeat(caret_offset_chars);
    underline.push('^');

    (&code[start_byte..end_byte], underline)
}

/// Char column of byte offset `ip` within `line`.
fn char_column(line: &[u8], ip: usize) -> usize {
    String::from_utf8_lossy(&line[..ip.min(line.len())]).chars().count()
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(byte_idx, _)| byte_idx)
}
