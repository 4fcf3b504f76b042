//! Tree-walking interpreter for a miniature C++-flavored language.
//!
//! The pipeline is lexer → recursive-descent parser → AST evaluator. Tokens
//! carry interned lexemes and byte spans; the AST lives in a bump arena; the
//! evaluator walks it against a stack of lexical frames and ordinary
//! input/output streams.

pub mod ast;
pub mod callstack;
pub mod cli;
pub mod error;
pub mod intern;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod style;
pub mod token;
pub mod value;

use std::io::{BufRead, Write};

use ast::NodeArena;
use intern::Interner;
use lexer::Lexer;
use parser::Parser;

pub use error::{Error, RuntimeError, SyntaxError, SyntaxErrorKind};
pub use interp::Interpreter;

/// Lex, parse, and evaluate a complete program against the given streams.
pub fn run_program<R: BufRead, W: Write>(source: &str, input: R, output: W) -> Result<(), Error> {
    let mut interner = Interner::new();
    let arena = NodeArena::new();
    let root = {
        let lexer = Lexer::new(source, &mut interner);
        Parser::new(lexer, &arena)?.parse()?
    };
    let mut interp = Interpreter::new(&interner, input, output);
    interp.run(root)?;
    Ok(())
}
