use anyhow::{anyhow, bail, Context, Result};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};

use ll1_analyzer::{
    analyzer::{CodingDictionary, ParseTrace, Parser},
    build_table,
    config::{Config, Output, OutputFormat},
    Error, Grammar,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_matches(&Config::command().get_matches());

    let source = fs::read_to_string(&config.grammar)
        .with_context(|| format!("Failed to read grammar {}", config.grammar.display()))?;
    let mut g = if config.arrow {
        Grammar::parse(&source)
    } else {
        Grammar::from_delimited(&source, config.grammar_delimiter)
    }
    .map_err(|e| anyhow!("{}: {}", config.grammar.display(), e))?;
    if let Some(start) = &config.start_symbol {
        g.set_start_symbol(start)?;
    }

    let ff = g.first_follow();
    // No partial table is trustworthy: a conflict aborts the whole run.
    let table = build_table(&g, &ff)?;

    for output in &config.outputs {
        let text = match output {
            Output::Prod => {
                let t = g.to_production_output_vec();
                match config.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => serde_json::to_string(&t)?,
                }
            }
            Output::Nff => {
                let t = g.to_non_terminal_output_vec(&ff);
                match config.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json(),
                }
            }
            Output::LL1 => match config.format {
                OutputFormat::Plain => table.to_plaintext(),
                OutputFormat::LaTeX => table.to_latex(),
                OutputFormat::JSON => table.to_json(),
            },
        };
        println!("{}", text);
    }

    if let Some(path) = &config.table_output {
        fs::write(path, table.to_delimited(config.table_delimiter))
            .with_context(|| format!("Failed to write table {}", path.display()))?;
        info!("table written to {}", path.display());
    }

    if config.inputs.is_empty() {
        return Ok(());
    }
    let coding = match &config.coding {
        Some(coding) => coding,
        None => bail!("validating inputs needs a coding dictionary (-c)"),
    };
    let text = fs::read_to_string(coding)
        .with_context(|| format!("Failed to read coding dictionary {}", coding.display()))?;
    let dictionary =
        CodingDictionary::from_delimited(&text, config.coding_delimiter, &config.coding_column)?;

    let mut files = Vec::new();
    for input in &config.inputs {
        collect_inputs(input, &mut files)?;
    }

    let parser = Parser::new(&table);
    let mut valid = 0;
    for file in &files {
        if scan_file(file, &dictionary, &parser, config.trace) {
            valid += 1;
        }
        println!();
    }
    info!("{} of {} inputs valid", valid, files.len());

    Ok(())
}

/// Expands directories into the `.txt` files below them, sorted by path.
fn collect_inputs(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !path.is_dir() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(path)
        .with_context(|| format!("Failed to list {}", path.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    for entry in entries {
        if entry.is_dir() {
            collect_inputs(&entry, files)?;
        } else if entry.extension().map_or(false, |ext| ext == "txt") {
            files.push(entry);
        }
    }
    Ok(())
}

/// Decodes and parses one file. Failures are reported and do not stop the batch.
fn scan_file(file: &Path, dictionary: &CodingDictionary, parser: &Parser, trace: bool) -> bool {
    println!("====Validating file {}====", file.display());

    let mut steps = ParseTrace::default();
    let result: Result<(), Error> = fs::read_to_string(file)
        .map_err(Error::from)
        .and_then(|raw| dictionary.decode(&raw).map_err(Error::from))
        .and_then(|tokens| {
            parser
                .parse_with_trace(&tokens, trace.then_some(&mut steps))
                .map_err(Error::from)
        });

    if trace && !steps.steps.is_empty() {
        println!("{}", steps.to_plaintext());
    }

    match result {
        Ok(()) => {
            println!("Input file {} valid", file.display());
            true
        }
        Err(e) => {
            let at = match &e {
                Error::Parse(p) => p.position().to_string(),
                _ => "-".to_string(),
            };
            println!(
                "Input file {} not valid, error at {}. \nDetail: {}",
                file.display(),
                at,
                e
            );
            false
        }
    }
}
