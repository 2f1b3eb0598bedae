use thiserror::Error;

/// Problems found while loading or validating a grammar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Line {line}: left side \"{symbol}\" is not a non-terminal")]
    InvalidLeftSide { line: usize, symbol: String },

    #[error("Line {line}: \"{symbol}\" may not appear inside a formula of {non_terminal}")]
    MisplacedMarker {
        line: usize,
        non_terminal: String,
        symbol: String,
    },

    #[error("symbol \"{symbol}\" used in a formula of {non_terminal} has no production")]
    Inconsistency { non_terminal: String, symbol: String },

    #[error("start symbol \"{0}\" is not a declared non-terminal")]
    UnknownStartSymbol(String),

    #[error("grammar has no productions")]
    Empty,
}

/// Two formulas compete for the same prediction table cell.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("LL(1) conflict at ({non_terminal}, {terminal}): \"{existing}\" vs \"{new}\"")]
pub struct ConflictError {
    pub non_terminal: String,
    pub terminal: String,
    pub existing: String,
    pub new: String,
}

/// Failures of the prediction table file reader.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table is missing its header row")]
    MissingHeader,

    #[error("table has no rows")]
    NoRows,

    #[error("Line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("start symbol \"{0}\" has no row in the table")]
    UnknownStartSymbol(String),
}

/// Failures while turning lexical output into terminal names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("No valid identifier matching coding {code} (line {line}, column {column})")]
    UnknownCode {
        code: u32,
        line: usize,
        column: usize,
    },

    #[error("malformed pair at line {line}, column {column}")]
    MalformedPair { line: usize, column: usize },

    #[error("coding dictionary line {line}: {message}")]
    Dictionary { line: usize, message: String },
}

/// Rejection of one input by the parse engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Terminal symbol not matching, input '{found}', stack top '{expected}' \
         (token {position}, line {line}, column {column})"
    )]
    TerminalMismatch {
        expected: String,
        found: String,
        position: usize,
        line: usize,
        column: usize,
    },

    #[error(
        "No matching formula with non-terminal symbol '{non_terminal}' and terminal symbol \
         '{terminal}' (token {position}, line {line}, column {column})"
    )]
    NoPrediction {
        non_terminal: String,
        terminal: String,
        position: usize,
        line: usize,
        column: usize,
    },

    #[error(
        "Non-terminal symbol '{non_terminal}' derives itself on terminal symbol '{terminal}' \
         without consuming input (token {position}, line {line}, column {column})"
    )]
    DerivationCycle {
        non_terminal: String,
        terminal: String,
        position: usize,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    /// Cursor position of the offending token.
    pub fn position(&self) -> usize {
        match self {
            ParseError::TerminalMismatch { position, .. } => *position,
            ParseError::NoPrediction { position, .. } => *position,
            ParseError::DerivationCycle { position, .. } => *position,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
