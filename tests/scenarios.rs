use pretty_assertions::assert_eq;

use ll1_analyzer::{
    analyzer::{coding::SECONDARY, CodingDictionary, ParseTrace, Parser},
    build_table,
    error::{ConflictError, ParseError},
    Error, Grammar, LL1Table,
};

const GRAMMAR: &str = "non-t`formula\nS`a S b\nS`e\n";
const CODING: &str = "coding description secondary\n1 letter_a a\n2 letter_b b\n3 letter_x x\n";

fn table() -> LL1Table {
    let g = Grammar::from_delimited(GRAMMAR, '`').unwrap();
    let ff = g.first_follow();
    build_table(&g, &ff).unwrap()
}

fn dictionary() -> CodingDictionary {
    CodingDictionary::from_delimited(CODING, ' ', SECONDARY).unwrap()
}

fn run(raw: &str) -> Result<ParseTrace, Error> {
    let t = table();
    let tokens = dictionary().decode(raw)?;
    let mut trace = ParseTrace::default();
    Parser::new(&t).parse_with_trace(&tokens, Some(&mut trace))?;
    Ok(trace)
}

#[test]
fn balanced_input_is_accepted() {
    let trace = run("(1, a)(2, b)\n").unwrap();
    assert_eq!(
        trace.to_plaintext(),
        "  | stack     | input | action\n\
         1 | [# S]     | a     | S -> a S b\n\
         2 | [# b S a] | a     | match a\n\
         3 | [# b S]   | b     | S -> e\n\
         4 | [# b]     | b     | match b\n\
         5 | [#]       | #     | accept"
    );
}

#[test]
fn unmatched_a_is_rejected_at_end() {
    match run("(1, a)(1, a)(2, b)") {
        Err(Error::Parse(e)) => assert_eq!(
            e,
            ParseError::TerminalMismatch {
                expected: "b".to_string(),
                found: "#".to_string(),
                position: 3,
                line: 1,
                column: 19,
            }
        ),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn positions_map_back_to_source_lines() {
    match run("(1, a)\n(1, a)\n(2, b)") {
        Err(Error::Parse(e)) => {
            assert_eq!(e.position(), 3);
            assert!(matches!(e, ParseError::TerminalMismatch { line: 3, column: 7, .. }));
        }
        other => panic!("expected a parse error, got {:?}", other),
    }

    match run("(1, a)\n  (3, x)") {
        Err(Error::Parse(e)) => assert_eq!(
            e,
            ParseError::NoPrediction {
                non_terminal: "S".to_string(),
                terminal: "x".to_string(),
                position: 1,
                line: 2,
                column: 3,
            }
        ),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn unknown_code_stops_only_that_input() {
    assert!(matches!(run("(1, a)(9, ?)"), Err(Error::Decode(_))));
    assert!(run("(1, a)(2, b)").is_ok());
}

#[test]
fn ambiguous_alternatives_are_a_conflict() {
    let g = Grammar::from_delimited("non-t`formula\nS`A\nA`x y\nA`x\n", '`').unwrap();
    let ff = g.first_follow();
    match build_table(&g, &ff) {
        Err(Error::Conflict(c)) => assert_eq!(
            c,
            ConflictError {
                non_terminal: "A".to_string(),
                terminal: "x".to_string(),
                existing: "x y".to_string(),
                new: "x".to_string(),
            }
        ),
        other => panic!("expected a conflict, got {:?}", other),
    }
}

#[test]
fn empty_input_is_accepted() {
    let trace = run("").unwrap();
    assert_eq!(trace.steps.len(), 2);
}

#[test]
fn persisted_table_drives_the_parser() {
    let text = table().to_delimited('`');
    let t = LL1Table::from_delimited(&text, '`', None).unwrap();
    let tokens = dictionary().decode("(1, a)(1, a)(2, b)(2, b)").unwrap();
    assert!(Parser::new(&t).parse(&tokens).is_ok());
}

#[test]
fn table_plaintext() {
    assert_eq!(
        table().to_plaintext(),
        "  |          a |      b |      #\nS | S -> a S b | S -> e | S -> e"
    );
}

#[test]
fn first_follow_summary() {
    let g = Grammar::from_delimited(GRAMMAR, '`').unwrap();
    let ff = g.first_follow();
    assert_eq!(
        g.to_non_terminal_output_vec(&ff).to_plaintext(),
        "S | true | a, e | #, b"
    );
}
