pub mod first_follow;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod parse;
pub mod pretty_print;
pub use first_follow::FirstFollow;
pub use grammar::Grammar;
pub use ll1_parsing_table::LL1Table;

pub const EPSILON: &str = "e";
pub const END_MARK: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Epsilon,
    EndMark,
    NonTerminal,
    Terminal,
}

/// Classifies a grammar symbol by the naming convention of the grammar files:
/// an uppercase first letter marks a non-terminal, everything else is a terminal,
/// except for the reserved [`EPSILON`] and [`END_MARK`] literals.
pub fn classify(symbol: &str) -> SymbolKind {
    if symbol == EPSILON {
        SymbolKind::Epsilon
    } else if symbol == END_MARK {
        SymbolKind::EndMark
    } else if symbol.chars().next().map_or(false, |c| c.is_uppercase()) {
        SymbolKind::NonTerminal
    } else {
        SymbolKind::Terminal
    }
}

#[cfg(test)]
mod classify_tests {
    use super::*;

    #[test]
    fn reserved_literals() {
        assert_eq!(classify("e"), SymbolKind::Epsilon);
        assert_eq!(classify("#"), SymbolKind::EndMark);
    }

    #[test]
    fn case_convention() {
        assert_eq!(classify("S"), SymbolKind::NonTerminal);
        assert_eq!(classify("Expr'"), SymbolKind::NonTerminal);
        assert_eq!(classify("id"), SymbolKind::Terminal);
        assert_eq!(classify("+"), SymbolKind::Terminal);
        assert_eq!(classify("eq"), SymbolKind::Terminal);
        assert_eq!(classify(""), SymbolKind::Terminal);
    }
}
