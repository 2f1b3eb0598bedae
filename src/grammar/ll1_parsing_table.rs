use crowbook_text_processing::escape::tex as escape_tex;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
    error::{ConflictError, Error, GrammarError, TableError},
    Grammar,
};

use super::{pretty_print::ProductionOutput, FirstFollow, END_MARK};

/// Header of the first column in the persisted table.
pub const ROW_HEADER: &str = "non-t";

/// Prediction table mapping (non-terminal, terminal) to at most one formula.
///
/// The table owns its symbol names, so once built it no longer needs the grammar
/// and can be shared read-only between any number of parse runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LL1Table {
    pub start_symbol: String,
    pub terminals: Vec<String>,
    pub non_terminals: Vec<String>,
    rows: Vec<Vec<Option<Vec<String>>>>,
    #[serde(skip)]
    terminal_index: HashMap<String, usize>,
    #[serde(skip)]
    non_terminal_index: HashMap<String, usize>,
}

impl LL1Table {
    pub fn new(start_symbol: String, non_terminals: Vec<String>, terminals: Vec<String>) -> Self {
        let terminal_index = terminals
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        let non_terminal_index = non_terminals
            .iter()
            .enumerate()
            .map(|(i, nt)| (nt.clone(), i))
            .collect();
        Self {
            rows: vec![vec![None; terminals.len()]; non_terminals.len()],
            start_symbol,
            terminals,
            non_terminals,
            terminal_index,
            non_terminal_index,
        }
    }

    /// Predicted formula for `non_terminal` when `terminal` is the lookahead.
    pub fn get(&self, non_terminal: &str, terminal: &str) -> Option<&[String]> {
        let row = *self.non_terminal_index.get(non_terminal)?;
        let col = *self.terminal_index.get(terminal)?;
        self.rows[row][col].as_deref()
    }

    /// Fills an empty cell and reports whether the cell now holds `formula`.
    /// Re-assigning the same formula is a no-op; a different formula is an LL(1)
    /// conflict and leaves the cell untouched. A cell outside the table is skipped.
    pub(crate) fn set(
        &mut self,
        non_terminal: &str,
        terminal: &str,
        formula: Vec<String>,
    ) -> Result<bool, ConflictError> {
        let (row, col) = match (
            self.non_terminal_index.get(non_terminal),
            self.terminal_index.get(terminal),
        ) {
            (Some(&row), Some(&col)) => (row, col),
            _ => {
                warn!("cell ({}, {}) is outside the table", non_terminal, terminal);
                return Ok(false);
            }
        };
        if let Some(existing) = &self.rows[row][col] {
            if *existing != formula {
                return Err(ConflictError {
                    non_terminal: non_terminal.to_string(),
                    terminal: terminal.to_string(),
                    existing: existing.join(" "),
                    new: formula.join(" "),
                });
            }
            return Ok(true);
        }
        self.rows[row][col] = Some(formula);
        Ok(true)
    }

    /// Writes the table with non-terminals as rows and terminals as columns; an
    /// empty field marks an empty cell.
    pub fn to_delimited(&self, delimiter: char) -> String {
        let delimiter = delimiter.to_string();
        let mut lines: Vec<String> = Vec::with_capacity(self.rows.len() + 1);

        let mut header: Vec<&str> = vec![ROW_HEADER];
        header.extend(self.terminals.iter().map(|t| t.as_str()));
        lines.push(header.join(&delimiter));

        for (left, row) in self.non_terminals.iter().zip(&self.rows) {
            let mut line: Vec<String> = vec![left.clone()];
            line.extend(
                row.iter()
                    .map(|cell| cell.as_ref().map(|f| f.join(" ")).unwrap_or_default()),
            );
            lines.push(line.join(&delimiter));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Reads back [`LL1Table::to_delimited`] output. Without an explicit start symbol
    /// the first row is taken.
    pub fn from_delimited(
        table: &str,
        delimiter: char,
        start_symbol: Option<&str>,
    ) -> Result<Self, TableError> {
        let mut lines = table
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let terminals: Vec<String> = match lines.next() {
            Some((_, header)) => header
                .split(delimiter)
                .skip(1)
                .map(|t| t.trim().to_string())
                .collect(),
            None => return Err(TableError::MissingHeader),
        };

        let mut parsed_rows: Vec<(String, Vec<Option<Vec<String>>>)> = Vec::new();
        for (i, line) in lines {
            let fields: Vec<&str> = line.split(delimiter).collect();
            if fields.len() != terminals.len() + 1 {
                return Err(TableError::RowWidth {
                    line: i + 1,
                    expected: terminals.len() + 1,
                    found: fields.len(),
                });
            }
            let cells = fields[1..]
                .iter()
                .map(|field| {
                    let formula: Vec<String> =
                        field.split_whitespace().map(|s| s.to_string()).collect();
                    if formula.is_empty() {
                        None
                    } else {
                        Some(formula)
                    }
                })
                .collect();
            parsed_rows.push((fields[0].trim().to_string(), cells));
        }

        let start_symbol = match start_symbol {
            Some(start) if parsed_rows.iter().any(|(nt, _)| nt == start) => start.to_string(),
            Some(start) => return Err(TableError::UnknownStartSymbol(start.to_string())),
            None => match parsed_rows.first() {
                Some((nt, _)) => nt.clone(),
                None => return Err(TableError::NoRows),
            },
        };

        let non_terminals = parsed_rows.iter().map(|(nt, _)| nt.clone()).collect();
        let mut t = Self::new(start_symbol, non_terminals, terminals);
        t.rows = parsed_rows.into_iter().map(|(_, cells)| cells).collect();
        Ok(t)
    }

    fn production_outputs(&self) -> Vec<(&str, Vec<ProductionOutput>)> {
        self.non_terminals
            .iter()
            .zip(&self.rows)
            .map(|(left, row)| {
                let left = left.as_str();
                let row = row
                    .iter()
                    .map(|cell| ProductionOutput {
                        left,
                        rights: cell
                            .iter()
                            .map(|f| f.iter().map(|s| s.as_str()).collect())
                            .collect(),
                    })
                    .collect();
                (left, row)
            })
            .collect()
    }

    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in self.production_outputs() {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_plaintext(left.len(), false)),
            );
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| output.iter().map(|line| line[j].len()).max().unwrap_or(0))
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape_tex(t.as_str()))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        let terminal_set: HashSet<&str> = self.terminals.iter().map(|t| t.as_str()).collect();
        for (left, row) in self.production_outputs() {
            let mut line: Vec<String> = vec![format!("{}", escape_tex(left))];
            line.extend(
                row.iter()
                    .map(|productions| productions.to_latex(false, &terminal_set)),
            );
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Builds the LL(1) prediction table from precomputed FIRST/FOLLOW sets.
///
/// Rows follow declaration order and columns are the terminals of all FIRST and
/// FOLLOW sets sorted by name, end marker last. The first cell claimed by two
/// different formulas aborts construction.
pub fn build_table(g: &Grammar, ff: &FirstFollow) -> Result<LL1Table, Error> {
    let start = g.start_symbol_name().ok_or(GrammarError::Empty)?;
    info!("Constructing LL(1) table");

    let mut alphabet: BTreeSet<usize> = BTreeSet::new();
    for nt in g.non_terminal_iter() {
        for first in &ff.production_first[nt.index] {
            alphabet.extend(first.iter().cloned());
        }
        alphabet.extend(ff.follow_of(nt.index).iter().cloned());
    }
    alphabet.remove(&Grammar::EPSILON_INDEX);

    let mut terminals: Vec<String> = alphabet
        .iter()
        .map(|idx| g.get_symbol_name(*idx).to_string())
        .collect();
    terminals.sort_by(|a, b| (a == END_MARK, a).cmp(&(b == END_MARK, b)));

    let non_terminals: Vec<String> = g.non_terminal_iter().map(|nt| nt.name.clone()).collect();
    let mut table = LL1Table::new(start.to_string(), non_terminals, terminals);

    for nt in g.non_terminal_iter() {
        for (j, production) in nt.productions.iter().enumerate() {
            let formula: Vec<String> = g
                .production_to_vec_str(production)
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            let first = ff.first_of_formula(nt.index, j);

            for &t in first.iter().filter(|&&t| t != Grammar::EPSILON_INDEX) {
                table.set(&nt.name, g.get_symbol_name(t), formula.clone())?;
            }
            if first.contains(&Grammar::EPSILON_INDEX) {
                for &t in ff.follow_of(nt.index) {
                    table.set(&nt.name, g.get_symbol_name(t), formula.clone())?;
                }
            }
            debug!("placed {} -> {}", nt.name, formula.join(" "));
        }
    }

    Ok(table)
}

impl Grammar {
    /// Computes FIRST/FOLLOW and builds the prediction table in one go.
    pub fn generate_ll1_parsing_table(&self) -> Result<LL1Table, Error> {
        let ff = self.first_follow();
        build_table(self, &ff)
    }
}
