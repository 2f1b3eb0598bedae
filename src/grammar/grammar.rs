use std::collections::HashMap;

use log::warn;

use super::{END_MARK, EPSILON};
use crate::error::GrammarError;

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Symbol {
    Epsilon,
    NonTerminal(NonTerminal),
    Terminal(String),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }
}

/// Non-terminals with their ordered formulas. Symbols are interned: formulas refer
/// to symbols by their index into `symbols`. Index 0 is always epsilon and index 1
/// the end marker.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub symbols: Vec<Symbol>,
    pub symbol_table: HashMap<String, usize>,
    pub start_symbol: Option<usize>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub const EPSILON_INDEX: usize = 0;
    pub const END_MARK_INDEX: usize = 1;

    pub fn new() -> Self {
        let mut g = Self {
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
            start_symbol: None,
        };

        g.symbols.push(Symbol::Epsilon);
        g.symbol_table.insert(EPSILON.to_string(), Self::EPSILON_INDEX);

        g.add_terminal(END_MARK.to_string());

        g
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = &String> {
        self.symbols.iter().filter_map(|s| {
            if let Symbol::Terminal(name) = s {
                Some(name)
            } else {
                None
            }
        })
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn get_non_terminal(&self, name: &str) -> Option<&NonTerminal> {
        self.get_symbol_index(name)
            .and_then(|idx| self.symbols[idx].non_terminal())
    }

    pub fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    pub fn add_terminal(&mut self, name: String) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name.clone()));
        self.symbol_table.insert(name, idx);
        idx
    }

    /// Appends a formula to `left`. Formulas form an ordered set: a repeated
    /// formula is dropped and `false` is returned.
    pub fn add_production(&mut self, left: usize, right: Vec<usize>) -> bool {
        let nt = match self.symbols[left].non_terminal() {
            Some(nt) => nt,
            None => return false,
        };
        if nt.productions.contains(&right) {
            warn!(
                "dropping duplicate formula \"{}\" of {}",
                self.production_to_vec_str(&right).join(" "),
                nt.name
            );
            return false;
        }
        if let Some(nt) = self.symbols[left].mut_non_terminal() {
            nt.productions.push(right);
        }
        true
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            Symbol::Epsilon => EPSILON,
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
        }
    }

    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        production
            .iter()
            .map(|idx| self.get_symbol_name(*idx))
            .collect()
    }

    pub fn production_to_string(&self, production: &[usize]) -> String {
        self.production_to_vec_str(production).join(" ")
    }

    pub fn is_epsilon_production(production: &[usize]) -> bool {
        production == [Self::EPSILON_INDEX]
    }

    pub fn start_symbol_name(&self) -> Option<&str> {
        self.start_symbol.map(|idx| self.get_symbol_name(idx))
    }

    pub fn set_start_symbol(&mut self, name: &str) -> Result<(), GrammarError> {
        let index = self
            .get_non_terminal(name)
            .map(|nt| nt.index)
            .ok_or_else(|| GrammarError::UnknownStartSymbol(name.to_string()))?;
        self.start_symbol = Some(index);
        Ok(())
    }
}
