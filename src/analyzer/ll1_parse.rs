use log::debug;
use serde::Serialize;

use super::coding::Token;
use crate::{
    error::ParseError,
    grammar::{classify, SymbolKind, END_MARK, EPSILON},
    LL1Table,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    Expand { non_terminal: String, formula: Vec<String> },
    Match(String),
    Accept,
}

impl Action {
    pub fn to_plaintext(&self) -> String {
        match self {
            Action::Expand {
                non_terminal,
                formula,
            } => format!("{} -> {}", non_terminal, formula.join(" ")),
            Action::Match(terminal) => format!("match {}", terminal),
            Action::Accept => "accept".to_string(),
        }
    }
}

/// One transition of the automaton: the stack before popping, the lookahead and
/// what was done with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseStep {
    pub stack: Vec<String>,
    pub input: String,
    pub action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseTrace {
    pub steps: Vec<ParseStep>,
}

impl ParseTrace {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = vec![vec![
            String::new(),
            "stack".to_string(),
            "input".to_string(),
            "action".to_string(),
        ]];
        for (i, step) in self.steps.iter().enumerate() {
            output.push(vec![
                (i + 1).to_string(),
                format!("[{}]", step.stack.join(" ")),
                step.input.clone(),
                step.action.to_plaintext(),
            ]);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| output.iter().map(|line| line[j].len()).max().unwrap_or(0))
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:<width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Table-driven predictive parser. Borrows the prediction table read-only; every
/// run owns its own stack and cursor, so one table can serve parallel runs.
pub struct Parser<'t> {
    table: &'t LL1Table,
}

impl<'t> Parser<'t> {
    pub fn new(table: &'t LL1Table) -> Self {
        Self { table }
    }

    /// Accepts or rejects `tokens` without recording any steps.
    pub fn parse(&self, tokens: &[Token]) -> Result<(), ParseError> {
        self.parse_with_trace(tokens, None)
    }

    /// Runs the automaton. With a `trace`, every step is appended to it, so the
    /// steps leading to a rejection stay available to the caller.
    ///
    /// A table that is not LL(1) (e.g. one edited by hand) may re-expand a
    /// non-terminal forever without consuming input; this is reported as
    /// [`ParseError::DerivationCycle`].
    pub fn parse_with_trace(
        &self,
        tokens: &[Token],
        mut trace: Option<&mut ParseTrace>,
    ) -> Result<(), ParseError> {
        let (end_line, end_column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));

        let mut stack: Vec<String> = vec![END_MARK.to_string(), self.table.start_symbol.clone()];
        let mut cursor: usize = 0;
        // Non-terminals expanded since the last match, with the stack depth their
        // formula was pushed at.
        let mut ancestors: Vec<(String, usize)> = Vec::new();

        loop {
            // Reading past the stream behaves as if the end marker were there.
            let (current, line, column) = match tokens.get(cursor) {
                Some(t) => (t.symbol.as_str(), t.line, t.column),
                None => (END_MARK, end_line, end_column),
            };
            debug!("[{:20}]<-{}", stack.join(" "), current);

            let snapshot = trace.is_some().then(|| stack.clone());
            let record = |action: Action| {
                if let (Some(trace), Some(stack)) = (trace.as_deref_mut(), snapshot) {
                    trace.steps.push(ParseStep {
                        stack,
                        input: current.to_string(),
                        action,
                    });
                }
            };

            let top = match stack.pop() {
                Some(top) => top,
                None => {
                    return Err(ParseError::TerminalMismatch {
                        expected: END_MARK.to_string(),
                        found: current.to_string(),
                        position: cursor,
                        line,
                        column,
                    })
                }
            };

            match classify(&top) {
                SymbolKind::NonTerminal => {
                    let depth = stack.len();
                    ancestors.retain(|(_, d)| *d <= depth);
                    if ancestors.iter().any(|(nt, _)| *nt == top) {
                        return Err(ParseError::DerivationCycle {
                            non_terminal: top,
                            terminal: current.to_string(),
                            position: cursor,
                            line,
                            column,
                        });
                    }

                    let formula = match self.table.get(&top, current) {
                        Some(formula) => formula,
                        None => {
                            return Err(ParseError::NoPrediction {
                                non_terminal: top,
                                terminal: current.to_string(),
                                position: cursor,
                                line,
                                column,
                            })
                        }
                    };
                    if formula != [EPSILON] {
                        stack.extend(formula.iter().rev().cloned());
                    }
                    record(Action::Expand {
                        non_terminal: top.clone(),
                        formula: formula.to_vec(),
                    });
                    ancestors.push((top, depth));
                }
                SymbolKind::Epsilon => continue,
                SymbolKind::Terminal | SymbolKind::EndMark => {
                    if top != current {
                        return Err(ParseError::TerminalMismatch {
                            expected: top,
                            found: current.to_string(),
                            position: cursor,
                            line,
                            column,
                        });
                    }
                    if top == END_MARK {
                        record(Action::Accept);
                        return Ok(());
                    }
                    record(Action::Match(top));
                    ancestors.clear();
                    cursor += 1;
                }
            }
        }
    }
}
