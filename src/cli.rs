//! Command-line driver.
//!
//! Reads the source file, discards the driver prelude, appends the entry
//! call, runs the pipeline over stdin/stdout, and reports elapsed time on
//! stderr.

use std::error::Error as StdError;
use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use crate::error::Error;
use crate::run_program;

#[derive(Parser)]
#[command(name = "minicpp")]
#[command(about = "Tree-walking interpreter for a miniature C++-flavored language")]
#[command(version)]
pub struct Cli {
    /// Source file to interpret
    #[arg(default_value = "source-code.cpp")]
    pub source: PathBuf,

    /// Header lines discarded before the program text is lexed
    #[arg(long, default_value_t = 3)]
    pub skip_lines: usize,
}

/// Strip the discarded prelude and append the entry-point call.
///
/// The top-level scope only registers functions, so `main();` is appended to
/// actually start the program.
pub fn prepare_source(text: &str, skip_lines: usize) -> String {
    let mut program = String::with_capacity(text.len() + 8);
    for line in text.lines().skip(skip_lines) {
        program.push_str(line);
        program.push('\n');
    }
    program.push_str("main();");
    program
}

/// Entry point for the command-line interpreter.
pub fn run_cli() -> Result<(), Box<dyn StdError>> {
    let cli = Cli::parse();
    let started = Instant::now();

    let text = fs::read_to_string(&cli.source)?;
    let program = prepare_source(&text, cli.skip_lines);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = run_program(&program, stdin.lock(), BufWriter::new(stdout.lock()));

    match result {
        Ok(()) => {
            eprintln!("Time elapsed: {} microseconds", started.elapsed().as_micros());
            Ok(())
        }
        Err(Error::Syntax(err)) => Err(err.display_with_source(&program).into()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_source_drops_the_prelude_and_appends_the_entry_call() {
        let text = "#include <iostream>\n#include <cstdio>\nusing namespace std;\nint main() { }\n";
        let program = prepare_source(text, 3);
        assert_eq!(program, "int main() { }\nmain();");
    }

    #[test]
    fn prepare_source_with_zero_skip_keeps_everything() {
        let program = prepare_source("int main() { }", 0);
        assert_eq!(program, "int main() { }\nmain();");
    }

    #[test]
    fn prepare_source_on_short_input_still_appends_the_call() {
        assert_eq!(prepare_source("one\ntwo", 3), "main();");
    }
}
