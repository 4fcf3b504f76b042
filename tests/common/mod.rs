use std::io::Cursor;

use minicpp::{run_program, Error};

/// Run a program exactly as given, capturing stdout.
pub fn run_exact(program: &str, stdin: &str) -> Result<String, Error> {
    let mut out = Vec::new();
    run_program(program, Cursor::new(stdin.as_bytes().to_vec()), &mut out)?;
    Ok(String::from_utf8(out).expect("program output was not UTF-8"))
}

/// Run a program the way the driver would: with `main();` appended so the
/// registered entry point actually executes.
pub fn run(source: &str, stdin: &str) -> Result<String, Error> {
    run_exact(&format!("{source}\nmain();"), stdin)
}
