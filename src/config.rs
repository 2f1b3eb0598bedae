use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::analyzer::coding::SECONDARY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Productions
    Prod,
    /// Nullable, FIRST and FOLLOW
    Nff,
    /// LL(1) prediction table
    LL1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub grammar: PathBuf,
    pub arrow: bool,
    pub grammar_delimiter: char,
    pub start_symbol: Option<String>,
    pub coding: Option<PathBuf>,
    pub coding_delimiter: char,
    pub coding_column: String,
    pub table_output: Option<PathBuf>,
    pub table_delimiter: char,
    pub format: OutputFormat,
    pub outputs: Vec<Output>,
    pub inputs: Vec<PathBuf>,
    pub trace: bool,
}

impl Config {
    pub fn command() -> Command {
        Command::new("ll1-analyzer")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Builds an LL(1) prediction table and validates coded token streams against it.")
            .arg(
                Arg::new("grammar")
                    .short('g')
                    .long("grammar")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("Grammar file, one `non-terminal<delim>formula` row per alternative"),
            )
            .arg(
                Arg::new("arrow")
                    .long("arrow")
                    .action(ArgAction::SetTrue)
                    .help("Read the grammar in `A -> x B | e` notation"),
            )
            .arg(
                Arg::new("grammar-delimiter")
                    .long("grammar-delimiter")
                    .default_value("`")
                    .value_parser(value_parser!(char)),
            )
            .arg(
                Arg::new("start")
                    .short('s')
                    .long("start")
                    .help("Start symbol, defaults to the first declared non-terminal"),
            )
            .arg(
                Arg::new("coding")
                    .short('c')
                    .long("coding")
                    .value_parser(value_parser!(PathBuf))
                    .help("Coding dictionary mapping lexical codes to terminal names"),
            )
            .arg(
                Arg::new("coding-delimiter")
                    .long("coding-delimiter")
                    .default_value(" ")
                    .value_parser(value_parser!(char)),
            )
            .arg(
                Arg::new("coding-column")
                    .long("coding-column")
                    .default_value(SECONDARY),
            )
            .arg(
                Arg::new("table")
                    .short('t')
                    .long("table")
                    .value_parser(value_parser!(PathBuf))
                    .help("Write the prediction table to this file"),
            )
            .arg(
                Arg::new("table-delimiter")
                    .long("table-delimiter")
                    .default_value("`")
                    .value_parser(value_parser!(char)),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .action(ArgAction::Append)
                    .value_parser(["prod", "nff", "ll1"])
                    .help("Print productions, nullable/first/follow or the LL(1) table"),
            )
            .arg(
                Arg::new("latex")
                    .short('l')
                    .action(ArgAction::SetTrue)
                    .conflicts_with("json")
                    .help("Print in LaTeX format"),
            )
            .arg(
                Arg::new("json")
                    .short('j')
                    .action(ArgAction::SetTrue)
                    .help("Print in JSON format"),
            )
            .arg(
                Arg::new("trace")
                    .long("trace")
                    .action(ArgAction::SetTrue)
                    .help("Print every parse step"),
            )
            .arg(
                Arg::new("inputs")
                    .num_args(0..)
                    .value_parser(value_parser!(PathBuf))
                    .help("Coded token files, or directories scanned for .txt files"),
            )
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let format = if matches.get_flag("latex") {
            OutputFormat::LaTeX
        } else if matches.get_flag("json") {
            OutputFormat::JSON
        } else {
            OutputFormat::Plain
        };

        let outputs = matches
            .get_many::<String>("output")
            .map(|values| {
                values
                    .filter_map(|v| match v.as_str() {
                        "prod" => Some(Output::Prod),
                        "nff" => Some(Output::Nff),
                        "ll1" => Some(Output::LL1),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            grammar: matches
                .get_one::<PathBuf>("grammar")
                .cloned()
                .unwrap_or_default(),
            arrow: matches.get_flag("arrow"),
            grammar_delimiter: *matches.get_one::<char>("grammar-delimiter").unwrap_or(&'`'),
            start_symbol: matches.get_one::<String>("start").cloned(),
            coding: matches.get_one::<PathBuf>("coding").cloned(),
            coding_delimiter: *matches.get_one::<char>("coding-delimiter").unwrap_or(&' '),
            coding_column: matches
                .get_one::<String>("coding-column")
                .cloned()
                .unwrap_or_else(|| SECONDARY.to_string()),
            table_output: matches.get_one::<PathBuf>("table").cloned(),
            table_delimiter: *matches.get_one::<char>("table-delimiter").unwrap_or(&'`'),
            format,
            outputs,
            inputs: matches
                .get_many::<PathBuf>("inputs")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            trace: matches.get_flag("trace"),
        }
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::try_parse_from(["ll1-analyzer", "-g", "grammar.csv"]).unwrap();
        assert_eq!(c.grammar, PathBuf::from("grammar.csv"));
        assert_eq!(c.grammar_delimiter, '`');
        assert_eq!(c.coding_delimiter, ' ');
        assert_eq!(c.coding_column, "secondary");
        assert_eq!(c.format, OutputFormat::Plain);
        assert!(c.outputs.is_empty());
        assert!(c.inputs.is_empty());
        assert!(!c.arrow && !c.trace);
    }

    #[test]
    fn outputs_and_inputs() {
        let c = Config::try_parse_from([
            "ll1-analyzer", "-g", "g.txt", "--arrow", "-o", "nff", "-o", "ll1", "-j", "-s", "E",
            "-c", "coding.csv", "test", "extra.txt",
        ])
        .unwrap();
        assert!(c.arrow);
        assert_eq!(c.outputs, vec![Output::Nff, Output::LL1]);
        assert_eq!(c.format, OutputFormat::JSON);
        assert_eq!(c.start_symbol.as_deref(), Some("E"));
        assert_eq!(c.coding, Some(PathBuf::from("coding.csv")));
        assert_eq!(c.inputs, vec![PathBuf::from("test"), PathBuf::from("extra.txt")]);
    }

    #[test]
    fn missing_grammar() {
        assert!(Config::try_parse_from(["ll1-analyzer"]).is_err());
        assert!(Config::try_parse_from(["ll1-analyzer", "-g", "g", "-o", "lr0"]).is_err());
    }
}
