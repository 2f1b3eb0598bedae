extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod analyzer;
pub mod config;
pub mod error;
pub mod grammar;
pub use error::Error;
pub use grammar::{ll1_parsing_table::build_table, FirstFollow, Grammar, LL1Table};

fn error_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let ff = g.first_follow();
            g.to_non_terminal_output_vec(&ff).to_json()
        }
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar)
        .map_err(Error::from)
        .and_then(|g| g.generate_ll1_parsing_table())
    {
        Ok(table) => table.to_json(),
        Err(e) => error_json(e),
    }
}

#[cfg(test)]
mod parse_tests {
    use crate::Grammar;

    #[test]
    fn simple_parse() {
        let g = crate::Grammar::parse("S -> a").unwrap();

        let s = g.symbol_table.get("S").unwrap().clone();
        let a = g.symbol_table.get("a").unwrap().clone();

        assert_eq!(g.get_symbol_name(s), "S");
        assert_eq!(g.get_symbol_name(a), "a");
        assert_eq!(g.get_symbol_name(Grammar::EPSILON_INDEX), "e");
        assert_eq!(g.get_symbol_name(Grammar::END_MARK_INDEX), "#");

        assert_eq!(g.symbols[s].non_terminal().unwrap().productions[0], vec![a]);
        assert_eq!(g.start_symbol, Some(s));
    }

    #[test]
    fn simple_parse_with_space() {
        let g = crate::Grammar::parse("  S -> a ").unwrap();

        let s = g.symbol_table.get("S").unwrap().clone();
        let a = g.symbol_table.get("a").unwrap().clone();

        assert_eq!(g.symbols[s].non_terminal().unwrap().productions[0], vec![a]);
    }

    #[test]
    fn simple_parse_with_space_and_newline() {
        let g = crate::Grammar::parse("  S -> a \n | b c").unwrap();

        let s = g.symbol_table.get("S").unwrap().clone();
        let a = g.symbol_table.get("a").unwrap().clone();
        let b = g.symbol_table.get("b").unwrap().clone();
        let c = g.symbol_table.get("c").unwrap().clone();

        assert_eq!(g.symbols[s].non_terminal().unwrap().productions[0], vec![a]);
        assert_eq!(
            g.symbols[s].non_terminal().unwrap().productions[1],
            vec![b, c]
        );
    }

    #[test]
    fn forward_reference() {
        let g = crate::Grammar::parse("S -> A b\nA -> a | e").unwrap();
        let s = g.get_non_terminal("S").unwrap();
        let a = g.get_non_terminal("A").unwrap();
        assert_eq!(s.productions[0][0], a.index);
        assert!(Grammar::is_epsilon_production(&a.productions[1]));
    }

    #[test]
    fn empty_parse() {
        let g = crate::Grammar::parse("  \n  ").unwrap();
        assert_eq!(g.start_symbol, None);
    }

    #[test]
    #[should_panic]
    fn two_rightarrows_parse() {
        let _g = crate::Grammar::parse("S -> a -> b").unwrap();
    }

    #[test]
    #[should_panic]
    fn no_left_parse() {
        let _g = crate::Grammar::parse("-> a").unwrap();
    }

    #[test]
    #[should_panic]
    fn no_previous_left_parse() {
        let _g = crate::Grammar::parse("| a b\n S -> a").unwrap();
    }

    #[test]
    #[should_panic]
    fn left_contain_space() {
        let _g = crate::Grammar::parse("S a S -> x").unwrap();
    }

    #[test]
    #[should_panic]
    fn undeclared_non_terminal() {
        let _g = crate::Grammar::parse("S -> a B").unwrap();
    }

    #[test]
    #[should_panic]
    fn end_mark_in_formula() {
        let _g = crate::Grammar::parse("S -> a #").unwrap();
    }
}

#[cfg(test)]
mod first_follow_tests {
    use crate::{FirstFollow, Grammar};

    const EXPR: &str = "E -> T E'\n\
                        E' -> + T E' | e\n\
                        T -> F T'\n\
                        T' -> * F T' | e\n\
                        F -> ( E ) | id";

    fn first<'a>(g: &'a Grammar, ff: &FirstFollow, name: &str) -> Vec<&'a str> {
        g.symbol_names(ff.first_of(g.get_symbol_index(name).unwrap()))
    }

    fn follow<'a>(g: &'a Grammar, ff: &FirstFollow, name: &str) -> Vec<&'a str> {
        g.symbol_names(ff.follow_of(g.get_symbol_index(name).unwrap()))
    }

    #[test]
    fn expression_grammar() {
        let _ = env_logger::builder().is_test(true).try_init();
        let g = Grammar::parse(EXPR).unwrap();
        let ff = g.first_follow();

        assert_eq!(first(&g, &ff, "E"), vec!["(", "id"]);
        assert_eq!(first(&g, &ff, "E'"), vec!["+", "e"]);
        assert_eq!(first(&g, &ff, "T'"), vec!["*", "e"]);
        assert_eq!(first(&g, &ff, "F"), vec!["(", "id"]);

        assert_eq!(follow(&g, &ff, "E"), vec!["#", ")"]);
        assert_eq!(follow(&g, &ff, "E'"), vec!["#", ")"]);
        assert_eq!(follow(&g, &ff, "T"), vec!["#", ")", "+"]);
        assert_eq!(follow(&g, &ff, "T'"), vec!["#", ")", "+"]);
        assert_eq!(follow(&g, &ff, "F"), vec!["#", ")", "*", "+"]);

        let e_prime = g.get_symbol_index("E'").unwrap();
        assert!(ff.is_nullable(e_prime));
        assert_eq!(
            g.symbol_names(ff.first_of_formula(e_prime, 0)),
            vec!["+"]
        );
        assert_eq!(
            g.symbol_names(ff.first_of_formula(e_prime, 1)),
            vec!["e"]
        );
    }

    #[test]
    fn sets_hold_only_terminals() {
        let g = Grammar::parse(EXPR).unwrap();
        let ff = g.first_follow();
        for nt in g.non_terminal_iter() {
            for idx in ff.first_of(nt.index).iter().chain(ff.follow_of(nt.index)) {
                assert!(g.symbols[*idx].non_terminal().is_none());
            }
            assert!(!ff.follow_of(nt.index).contains(&Grammar::EPSILON_INDEX));
        }
    }

    #[test]
    fn start_symbol_follows_end_mark() {
        let g = Grammar::parse("S -> a S b | e").unwrap();
        let ff = g.first_follow();
        assert_eq!(follow(&g, &ff, "S"), vec!["#", "b"]);
    }

    #[test]
    fn nullable_prefix_reaches_next_symbol() {
        let g = Grammar::parse("S -> A B c\nA -> a | e\nB -> b | e").unwrap();
        let ff = g.first_follow();
        assert_eq!(first(&g, &ff, "S"), vec!["a", "b", "c"]);
        assert_eq!(follow(&g, &ff, "A"), vec!["b", "c"]);
        assert_eq!(follow(&g, &ff, "B"), vec!["c"]);
    }

    #[test]
    fn every_occurrence_contributes() {
        // A appears twice in one formula; both successors belong to FOLLOW(A).
        let g = Grammar::parse("S -> A x A y\nA -> a").unwrap();
        let ff = g.first_follow();
        assert_eq!(follow(&g, &ff, "A"), vec!["x", "y"]);
    }

    #[test]
    fn mutual_recursion_terminates() {
        let g = Grammar::parse("S -> A\nA -> B | a\nB -> A | b").unwrap();
        let ff = g.first_follow();
        assert_eq!(first(&g, &ff, "A"), vec!["a", "b"]);
        assert_eq!(first(&g, &ff, "B"), vec!["a", "b"]);
        assert_eq!(follow(&g, &ff, "B"), vec!["#"]);
    }

    #[test]
    fn left_recursion_terminates() {
        let g = Grammar::parse("E -> E + id | id").unwrap();
        let ff = g.first_follow();
        assert_eq!(first(&g, &ff, "E"), vec!["id"]);
        assert_eq!(follow(&g, &ff, "E"), vec!["#", "+"]);
    }

    #[test]
    fn repeated_runs_agree() {
        let g = Grammar::parse(EXPR).unwrap();
        assert_eq!(g.first_follow(), g.first_follow());
    }
}
