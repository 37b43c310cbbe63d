use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, Seek, Write};
use std::num::NonZeroUsize;

use crate::cli_util::print_run_error;
use crate::config;
use crate::interpreter::{Interpreter, InterpreterError, Terminator};
use crate::source::{BufferedSource, LineSource, StreamSource, SymbolSource};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// File holding one program per line ("-" reads stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Number of tape cells (fallback BF_TAPE_SIZE, then config file; default 8192)
    #[arg(short = 't', long = "tape-size", value_name = "CELLS")]
    pub tape_size: Option<NonZeroUsize>,

    /// Load the whole file into memory instead of seeking on it for loops
    #[arg(short = 'b', long = "buffered")]
    pub buffered: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

/// Outcome of running every program in a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub programs: usize,
    pub failed: usize,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        file,
        tape_size,
        buffered,
        ..
    } = args;

    let Some(path) = file else {
        usage_and_exit(program, 2);
    };

    // Flush whatever the current program has written before leaving on ctrl+c.
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    let settings = config::resolve(tape_size, buffered);
    let mut out = io::stdout();
    let report_error = |line_no: usize, line: &[u8], err: &InterpreterError| {
        print_run_error(program, line_no, line, err);
    };

    let result = if path == "-" {
        // Stdin cannot seek; run each line as soon as it arrives.
        run_lines(&mut LineSource::new(io::stdin().lock()), &mut out, settings.tape_size, report_error)
    } else {
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("{program}: failed to open {path}: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        };
        if settings.buffered {
            BufferedSource::from_reader(file)
                .and_then(|mut src| run_lines(&mut src, &mut out, settings.tape_size, report_error))
        } else {
            match file.stream_position() {
                Ok(_) => StreamSource::new(file)
                    .and_then(|mut src| run_lines(&mut src, &mut out, settings.tape_size, report_error)),
                // FIFOs and process substitutions: fall back to reading line by line.
                Err(e) if e.kind() == io::ErrorKind::NotSeekable => {
                    log::debug!("{path} is not seekable, reading line by line");
                    let mut src = LineSource::new(BufReader::new(file));
                    run_lines(&mut src, &mut out, settings.tape_size, report_error)
                }
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(report) => {
            log::debug!("ran {} programs, {} failed", report.programs, report.failed);
            if report.failed > 0 { 1 } else { 0 }
        }
        Err(e) => {
            eprintln!("{program}: I/O error: {e}");
            let _ = io::stderr().flush();
            1
        }
    }
}

/// Run each line of `source` as its own program, writing a newline after each.
///
/// A program that fails is handed to `on_error` with its 1-based line number and
/// text, the rest of its line is skipped, and the following lines still run.
/// If the output is closed by its reader (broken pipe) the session stops
/// quietly with the programs counted so far. Other I/O failures outside a
/// program (writing the separator, recovering the failed line) abort it.
pub fn run_lines<S, W, F>(
    source: &mut S,
    out: &mut W,
    tape_size: NonZeroUsize,
    mut on_error: F,
) -> io::Result<SessionReport>
where
    S: SymbolSource + ?Sized,
    W: Write + ?Sized,
    F: FnMut(usize, &[u8], &InterpreterError),
{
    let mut bf = Interpreter::with_tape_size(tape_size);
    let mut report = SessionReport::default();

    loop {
        let start = source.position();
        let line_no = report.programs + 1;

        match bf.run(&mut *source, &mut *out) {
            Ok(summary) => {
                // Nothing left: a trailing newline does not start another program.
                if summary.symbols_read == 0 {
                    break;
                }
                report.programs += 1;
                log::debug!(
                    "program {line_no}: {} symbols, {} bytes out",
                    summary.symbols_read,
                    summary.bytes_written
                );
                if !write_separator(out)? || summary.terminated_by == Terminator::EndOfInput {
                    break;
                }
            }
            Err(InterpreterError::IoError { source: e, .. }) if is_closed_output(&e) => {
                report.programs += 1;
                log::debug!("output closed during program {line_no}, stopping");
                break;
            }
            Err(err) => {
                report.programs += 1;
                report.failed += 1;
                log::debug!("program {line_no} failed: {err}");
                source.rewind(start)?;
                let line = source.skip_line()?;
                on_error(line_no, &line, &err);
                if !write_separator(out)? {
                    break;
                }
            }
        }
    }

    Ok(report)
}

/// Write the newline that follows every program. `Ok(false)` means the reader hung up.
fn write_separator<W: Write + ?Sized>(out: &mut W) -> io::Result<bool> {
    match out.write_all(b"\n").and_then(|()| out.flush()) {
        Ok(()) => Ok(true),
        Err(e) if is_closed_output(&e) => {
            log::debug!("output closed, stopping");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn is_closed_output(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::BrokenPipe
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} [--tape-size|-t CELLS] [--buffered|-b] <FILE>
  {0} [--tape-size|-t CELLS] -             # read programs from stdin

Options:
  --tape-size, -t <CELLS>  Number of tape cells (default 8192)
  --buffered,  -b          Load FILE into memory instead of seeking for loops
  --help,      -h          Show this help

Description:
  Runs every line of FILE as an independent Brainfuck program and prints a
  newline after each program's output.

Notes:
- Only ><+-.[] are executed; every other character is ignored (`,` included).
- Cells wrap at 256 and the pointer wraps around both ends of the tape.
- Each line starts with a fresh tape.
- An unmatched bracket is reported on stderr; the remaining lines still run
  and the exit status is 1.
- Settings fall back to BF_TAPE_SIZE / BF_BUFFERED, then to the
  [interpreter] section of $BF_CONFIG or ~/.config/bf.toml.
- Set RUST_LOG=debug for per-program logging on stderr.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
