use std::error;
use std::fmt;
use std::io;

use crate::style::Style;
use crate::token::{Span, TokenKind};

/// Fatal lexing or parsing failure, anchored to a byte range of the source.
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum SyntaxErrorKind {
    /// Grammar mismatch: the parser demanded one kind and saw another.
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },
    /// An expression was required and the current token cannot begin one.
    ExpectedExpression { found: TokenKind },
    /// A lone `|` or `&`; only the doubled forms are operators.
    UnsupportedOperator { found: char },
    /// Function declaration in a position where only plain statements go.
    MisplacedFunction,
    /// Integer literal that does not fit in 32 bits.
    IntegerTooLarge,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        SyntaxError { kind, span }
    }

    /// Render the error with the offending source line and a caret underline.
    pub fn display_with_source(&self, source: &str) -> String {
        let (line_num, line_start, line_text) = self.find_context(source);
        let col = self.span.start.saturating_sub(line_start);
        let width = self.span.end.saturating_sub(self.span.start).max(1);
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(width));

        format!(
            "{}: {}\n\n{} {} {}\n     {} {}",
            Style::bold_red("error"),
            self.kind,
            Style::blue(&format!("{:4}", line_num)),
            Style::blue("|"),
            line_text,
            Style::blue("|"),
            Style::red(&underline),
        )
    }

    fn find_context<'s>(&self, source: &'s str) -> (usize, usize, &'s str) {
        let mut line_num = 1;
        let mut line_start = 0;

        for (i, c) in source.char_indices() {
            if i >= self.span.start {
                break;
            }
            if c == '\n' {
                line_num += 1;
                line_start = i + 1;
            }
        }

        let line_end = source[line_start..]
            .find('\n')
            .map(|off| line_start + off)
            .unwrap_or(source.len());

        (line_num, line_start, &source[line_start..line_end])
    }
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            SyntaxErrorKind::ExpectedExpression { found } => {
                write!(f, "expected an expression, found {found}")
            }
            SyntaxErrorKind::UnsupportedOperator { found } => {
                write!(f, "a single '{found}' is not a supported operator")
            }
            SyntaxErrorKind::MisplacedFunction => {
                write!(f, "function declarations are not allowed here")
            }
            SyntaxErrorKind::IntegerTooLarge => {
                write!(f, "integer literal does not fit in 32 bits")
            }
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error: {}", self.kind)
    }
}

impl error::Error for SyntaxError {}

/// Fatal evaluation failure.
///
/// `AlreadyDeclared` and `InvalidArguments` are part of the vocabulary but
/// never produced today: redeclaration silently replaces the binding, and
/// call arity is not checked.
#[derive(Debug)]
pub enum RuntimeError {
    UndefinedVariable { name: String },
    AlreadyDeclared { name: String },
    InvalidDataType { name: String },
    TypeMismatch { context: String },
    InvalidArguments { name: String },
    DivisionByZero,
    Io(io::Error),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UndefinedVariable { name } => {
                write!(f, "variable '{name}' is not defined")
            }
            RuntimeError::AlreadyDeclared { name } => {
                write!(f, "variable '{name}' is already declared")
            }
            RuntimeError::InvalidDataType { name } => {
                write!(f, "'{name}' does not have the type this use requires")
            }
            RuntimeError::TypeMismatch { context } => write!(f, "type error: {context}"),
            RuntimeError::InvalidArguments { name } => {
                write!(f, "invalid argument list for function '{name}'")
            }
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            RuntimeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(err: io::Error) -> Self {
        RuntimeError::Io(err)
    }
}

/// Any failure the pipeline can surface to the driver.
#[derive(Debug)]
pub enum Error {
    Syntax(SyntaxError),
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax(err) => err.fmt(f),
            Error::Runtime(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Syntax(err) => Some(err),
            Error::Runtime(err) => Some(err),
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Error::Syntax(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_source_underlines_the_span() {
        let err = SyntaxError::new(
            SyntaxErrorKind::ExpectedExpression {
                found: TokenKind::Semi,
            },
            Span::new(8, 9),
        );
        let source = "int x = ;";
        let rendered = err.display_with_source(source);
        assert!(rendered.contains("int x = ;"), "{rendered}");
        assert!(rendered.contains('^'), "{rendered}");
        assert!(rendered.contains("\x1b["), "{rendered}");
    }

    #[test]
    fn display_with_source_finds_the_right_line() {
        let err = SyntaxError::new(
            SyntaxErrorKind::MisplacedFunction,
            Span::new(12, 15),
        );
        let source = "int a;\nint b;\nint c;";
        let rendered = err.display_with_source(source);
        assert!(rendered.contains("int b;"), "{rendered}");
        assert!(!rendered.contains("int c;"), "{rendered}");
    }

    #[test]
    fn runtime_errors_name_the_variable() {
        let err = RuntimeError::UndefinedVariable {
            name: "total".to_string(),
        };
        assert_eq!(err.to_string(), "variable 'total' is not defined");
    }

    #[test]
    fn unexpected_token_message_uses_surface_names() {
        let err = SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken {
                expected: TokenKind::Semi,
                found: TokenKind::RBrace,
            },
            Span::new(0, 1),
        );
        assert_eq!(err.to_string(), "syntax error: expected ';', found '}'");
    }
}
