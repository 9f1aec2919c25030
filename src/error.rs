use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum GherkinError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),
}

impl GherkinError {
    /// 1-based source line of the offending token.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            GherkinError::Parser(err) => err.line(),
        }
    }

    /// Human-readable description of the violation.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Missing Feature header on line {line}")]
    #[diagnostic(
        code(parser::missing_feature),
        help("Every document must start with `Feature: <title>`, optionally preceded by tags.")
    )]
    MissingFeature {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected a Feature header before this")]
        span: SourceSpan,
        line: usize,
    },

    #[error("Unexpected {found} on line {line}, expected {expected}")]
    #[diagnostic(
        code(parser::unexpected_token),
        help("The parser found a statement it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Table row on line {line} is outside of a Step or Examples")]
    #[diagnostic(
        code(parser::misplaced_table),
        help("Tables may only follow a step or an `Examples:` header.")
    )]
    MisplacedTable {
        #[source_code]
        src: NamedSource<String>,
        #[label("This row has no step or Examples to belong to")]
        span: SourceSpan,
        line: usize,
    },

    #[error("Table row on line {line} has {found} cells, expected {expected}")]
    #[diagnostic(
        code(parser::ragged_table),
        help("Every row must have the same number of cells as the header row.")
    )]
    RaggedTable {
        #[source_code]
        src: NamedSource<String>,
        #[label("This row has {found} cells")]
        span: SourceSpan,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("PyString opened on line {line} is never closed")]
    #[diagnostic(
        code(parser::unterminated_pystring),
        help("Close the block with a matching delimiter on its own line.")
    )]
    UnterminatedPyString {
        #[source_code]
        src: NamedSource<String>,
        #[label("Block opened here")]
        span: SourceSpan,
        line: usize,
    },

    #[error("Unexpected end of input on line {line}, expected {expected}")]
    #[diagnostic(
        code(parser::unexpected_eof),
        help("The document ended while a construct was still open.")
    )]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("Input ended here")]
        span: SourceSpan,
        line: usize,
        expected: String,
    },
}

impl ParserError {
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            ParserError::MissingFeature { line, .. }
            | ParserError::UnexpectedToken { line, .. }
            | ParserError::MisplacedTable { line, .. }
            | ParserError::RaggedTable { line, .. }
            | ParserError::UnterminatedPyString { line, .. }
            | ParserError::UnexpectedEof { line, .. } => *line,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}
