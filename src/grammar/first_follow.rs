use std::collections::BTreeSet;

use log::{debug, info};

use super::grammar::Symbol;
use crate::Grammar;

/// Nullable flags, FIRST and FOLLOW sets of a grammar, indexed by symbol index.
///
/// FIRST sets contain [`Grammar::EPSILON_INDEX`] when the non-terminal (or the
/// formula) can derive the empty string. FOLLOW sets never contain it and may
/// contain [`Grammar::END_MARK_INDEX`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstFollow {
    pub nullable: Vec<bool>,
    pub first: Vec<BTreeSet<usize>>,
    pub follow: Vec<BTreeSet<usize>>,
    pub production_first: Vec<Vec<BTreeSet<usize>>>,
}

impl FirstFollow {
    fn new(symbol_count: usize) -> Self {
        Self {
            nullable: vec![false; symbol_count],
            first: vec![BTreeSet::new(); symbol_count],
            follow: vec![BTreeSet::new(); symbol_count],
            production_first: vec![Vec::new(); symbol_count],
        }
    }

    pub fn is_nullable(&self, non_terminal: usize) -> bool {
        self.nullable[non_terminal]
    }

    pub fn first_of(&self, non_terminal: usize) -> &BTreeSet<usize> {
        &self.first[non_terminal]
    }

    /// FIRST set of the `production`-th formula of `non_terminal`.
    pub fn first_of_formula(&self, non_terminal: usize, production: usize) -> &BTreeSet<usize> {
        &self.production_first[non_terminal][production]
    }

    pub fn follow_of(&self, non_terminal: usize) -> &BTreeSet<usize> {
        &self.follow[non_terminal]
    }

    /// FIRST of a symbol sequence under the sets computed so far. Holds epsilon
    /// iff every symbol of `sequence` is nullable, so an empty sequence yields `{ϵ}`.
    fn first_of_sequence(&self, g: &Grammar, sequence: &[usize]) -> BTreeSet<usize> {
        let mut first = BTreeSet::new();
        for &idx in sequence {
            match &g.symbols[idx] {
                Symbol::Epsilon => continue,
                Symbol::Terminal(_) => {
                    first.insert(idx);
                    return first;
                }
                Symbol::NonTerminal(_) => {
                    first.extend(
                        self.first[idx]
                            .iter()
                            .filter(|&&s| s != Grammar::EPSILON_INDEX)
                            .cloned(),
                    );
                    if !self.nullable[idx] {
                        return first;
                    }
                }
            }
        }
        first.insert(Grammar::EPSILON_INDEX);
        first
    }
}

impl Grammar {
    /// Computes nullable, FIRST and FOLLOW as least fixed points: every non-terminal
    /// is relaxed until no set grows, so left recursion and mutually recursive
    /// non-terminals terminate.
    pub fn first_follow(&self) -> FirstFollow {
        let mut ff = FirstFollow::new(self.symbols.len());
        self.calculate_nullable(&mut ff);
        info!("Constructing FIRST sets");
        self.calculate_first(&mut ff);
        info!("Constructing FOLLOW sets");
        self.calculate_follow(&mut ff);
        ff
    }

    fn calculate_nullable(&self, ff: &mut FirstFollow) {
        ff.nullable[Self::EPSILON_INDEX] = true;
        let mut changed = true;
        while changed {
            changed = false;
            for nt in self.non_terminal_iter() {
                if ff.nullable[nt.index] {
                    continue;
                }
                let nullable = nt.productions.iter().any(|production| {
                    production.iter().all(|s| match &self.symbols[*s] {
                        Symbol::Terminal(_) => false,
                        _ => ff.nullable[*s],
                    })
                });

                if nullable {
                    ff.nullable[nt.index] = true;
                    changed = true;
                }
            }
        }
    }

    fn calculate_first(&self, ff: &mut FirstFollow) {
        let mut round = 0;
        let mut changed = true;
        while changed {
            changed = false;
            round += 1;
            for nt in self.non_terminal_iter() {
                let first: BTreeSet<usize> =
                    nt.productions
                        .iter()
                        .fold(BTreeSet::new(), |mut first, production| {
                            first.extend(ff.first_of_sequence(self, production));
                            first
                        });

                if ff.first[nt.index].len() != first.len() {
                    changed = true;
                    ff.first[nt.index] = first;
                }
            }
            debug!("FIRST round {} changed: {}", round, changed);
        }

        for nt in self.non_terminal_iter() {
            ff.production_first[nt.index] = nt
                .productions
                .iter()
                .map(|production| ff.first_of_sequence(self, production))
                .collect();
        }
    }

    fn calculate_follow(&self, ff: &mut FirstFollow) {
        let start = match self.start_symbol {
            Some(start) => start,
            None => return,
        };
        ff.follow[start].insert(Self::END_MARK_INDEX);

        let mut round = 0;
        let mut changed = true;
        while changed {
            changed = false;
            round += 1;
            for left in self.non_terminal_iter() {
                for production in &left.productions {
                    for (i, &idx) in production.iter().enumerate() {
                        if self.symbols[idx].non_terminal().is_none() {
                            continue;
                        }

                        let trailer = ff.first_of_sequence(self, &production[i + 1..]);
                        let mut additions: BTreeSet<usize> = trailer
                            .iter()
                            .filter(|&&s| s != Self::EPSILON_INDEX)
                            .cloned()
                            .collect();
                        if trailer.contains(&Self::EPSILON_INDEX) && idx != left.index {
                            additions.extend(ff.follow[left.index].iter().cloned());
                        }

                        let before = ff.follow[idx].len();
                        ff.follow[idx].extend(additions);
                        if ff.follow[idx].len() != before {
                            changed = true;
                        }
                    }
                }
            }
            debug!("FOLLOW round {} changed: {}", round, changed);
        }
    }

    /// Names of the symbols in `set`, sorted.
    pub fn symbol_names(&self, set: &BTreeSet<usize>) -> Vec<&str> {
        let mut names: Vec<&str> = set.iter().map(|idx| self.get_symbol_name(*idx)).collect();
        names.sort();
        names
    }
}
