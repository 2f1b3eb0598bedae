use log::debug;

use super::{classify, SymbolKind};
use crate::{error::GrammarError, Grammar};

/// One right-hand side as read from the source, before symbols are interned.
struct RawProduction<'a> {
    line: usize,
    left: usize,
    rights: &'a str,
}

impl Grammar {
    /// Reads the arrow notation, e.g. `S -> a S b | e`. A line starting with `|`
    /// continues the previous left side.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut g = Self::new();

        let mut raw_productions: Vec<RawProduction> = Vec::new();

        let mut previous_left: Option<usize> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarError::Syntax {
                    line: i + 1,
                    message: "too many \"->\"".to_string(),
                });
            }
            let (left, rights): (usize, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: "empty left side".to_string(),
                    });
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: "left side contains whitespace".to_string(),
                    });
                }
                (g.declare_non_terminal(i + 1, left_str)?, parts[1].trim())
            } else {
                let continuation = parts[0].trim();
                match (previous_left, continuation.strip_prefix('|')) {
                    (Some(idx), Some(rest)) => (idx, rest.trim()),
                    _ => {
                        return Err(GrammarError::Syntax {
                            line: i + 1,
                            message: "cannot find left side".to_string(),
                        })
                    }
                }
            };

            previous_left = Some(left);

            for right in rights.split('|') {
                raw_productions.push(RawProduction {
                    line: i + 1,
                    left,
                    rights: right,
                });
            }
        }

        g.intern_productions(raw_productions)?;
        Ok(g)
    }

    /// Reads the tabular layout: a header row followed by one
    /// `<non-terminal><delimiter><formula>` row per alternative.
    pub fn from_delimited(table: &str, delimiter: char) -> Result<Self, GrammarError> {
        let mut g = Self::new();
        let mut raw_productions: Vec<RawProduction> = Vec::new();

        let mut rows = table
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());
        // header
        rows.next();

        for (i, line) in rows {
            let (left_str, formula) = match line.split_once(delimiter) {
                Some((left, formula)) => (left.trim(), formula.trim()),
                None => {
                    return Err(GrammarError::Syntax {
                        line: i + 1,
                        message: format!("expected \"{}\" between non-terminal and formula", delimiter),
                    })
                }
            };
            if formula.contains(delimiter) {
                return Err(GrammarError::Syntax {
                    line: i + 1,
                    message: "too many fields".to_string(),
                });
            }
            let left = g.declare_non_terminal(i + 1, left_str)?;
            raw_productions.push(RawProduction {
                line: i + 1,
                left,
                rights: formula,
            });
        }

        g.intern_productions(raw_productions)?;
        Ok(g)
    }

    fn declare_non_terminal(&mut self, line: usize, name: &str) -> Result<usize, GrammarError> {
        if classify(name) != SymbolKind::NonTerminal {
            return Err(GrammarError::InvalidLeftSide {
                line,
                symbol: name.to_string(),
            });
        }
        Ok(match self.get_symbol_index(name) {
            Some(idx) => idx,
            None => self.add_non_terminal(name),
        })
    }

    /// Interns every right-hand side once all left sides are known, so a formula may
    /// mention a non-terminal declared further down. The first declared non-terminal
    /// becomes the start symbol.
    fn intern_productions(&mut self, raw_productions: Vec<RawProduction>) -> Result<(), GrammarError> {
        for raw in raw_productions {
            let names: Vec<&str> = raw.rights.split_whitespace().collect();
            let production = if names.is_empty() {
                vec![Self::EPSILON_INDEX]
            } else {
                let mut production = Vec::with_capacity(names.len());
                for name in &names {
                    production.push(self.intern_formula_symbol(raw.line, raw.left, name, names.len())?);
                }
                production
            };
            self.add_production(raw.left, production);
        }

        let start = self.non_terminal_iter().next().map(|nt| nt.index);
        self.start_symbol = start;
        if let Some(name) = self.start_symbol_name() {
            debug!("start symbol: {}", name);
        }

        Ok(())
    }

    fn intern_formula_symbol(
        &mut self,
        line: usize,
        left: usize,
        name: &str,
        formula_len: usize,
    ) -> Result<usize, GrammarError> {
        let misplaced = |g: &Self| GrammarError::MisplacedMarker {
            line,
            non_terminal: g.get_symbol_name(left).to_string(),
            symbol: name.to_string(),
        };
        match classify(name) {
            SymbolKind::Epsilon if formula_len == 1 => Ok(Self::EPSILON_INDEX),
            SymbolKind::Epsilon | SymbolKind::EndMark => Err(misplaced(self)),
            SymbolKind::NonTerminal => self.get_symbol_index(name).ok_or_else(|| {
                GrammarError::Inconsistency {
                    non_terminal: self.get_symbol_name(left).to_string(),
                    symbol: name.to_string(),
                }
            }),
            SymbolKind::Terminal => Ok(match self.get_symbol_index(name) {
                Some(idx) => idx,
                None => self.add_terminal(name.to_string()),
            }),
        }
    }
}
