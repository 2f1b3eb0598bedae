use std::collections::HashMap;

use log::{debug, warn};

use crate::{error::DecodeError, grammar::END_MARK};

/// Default column holding the terminal name of a code.
pub const SECONDARY: &str = "secondary";

/// A terminal of the token stream, with the spot in the coded file it came from.
/// `line` and `column` are 1-based; `column` counts characters up to the `(` of the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: String,
    pub code: Option<u32>,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn end_mark(line: usize, column: usize) -> Self {
        Self {
            symbol: END_MARK.to_string(),
            code: None,
            lexeme: String::new(),
            line,
            column,
        }
    }
}

pub type TokenStream = Vec<Token>;

/// Turns bare terminal names into a token stream on line 1, one column per
/// symbol, terminated by the end marker.
pub fn symbols_to_tokens(symbols: &[&str]) -> TokenStream {
    let mut tokens: TokenStream = symbols
        .iter()
        .enumerate()
        .map(|(i, &s)| Token {
            symbol: s.to_string(),
            code: None,
            lexeme: s.to_string(),
            line: 1,
            column: i + 1,
        })
        .collect();
    tokens.push(Token::end_mark(1, symbols.len() + 1));
    tokens
}

/// Maps the integer codes of the lexical analyzer to descriptive columns.
#[derive(Debug, Clone)]
pub struct CodingDictionary {
    columns: Vec<String>,
    entries: HashMap<u32, Vec<String>>,
    lookup: usize,
}

impl CodingDictionary {
    /// Reads a header row naming the columns (the first one is the code) followed by
    /// one row per code. Terminal names are looked up in `column`.
    pub fn from_delimited(text: &str, delimiter: char, column: &str) -> Result<Self, DecodeError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let columns: Vec<String> = match lines.next() {
            Some((_, header)) => header
                .trim()
                .split(delimiter)
                .skip(1)
                .map(|c| c.trim().to_string())
                .collect(),
            None => {
                return Err(DecodeError::Dictionary {
                    line: 1,
                    message: "missing header".to_string(),
                })
            }
        };

        let mut entries: HashMap<u32, Vec<String>> = HashMap::new();
        for (i, line) in lines {
            let mut fields = line.trim().split(delimiter).map(|f| f.trim());
            let code: u32 = match fields.next().map(|f| f.parse()) {
                Some(Ok(code)) => code,
                _ => {
                    return Err(DecodeError::Dictionary {
                        line: i + 1,
                        message: "code is not an integer".to_string(),
                    })
                }
            };
            let values: Vec<String> = fields.map(|f| f.to_string()).collect();
            if entries.contains_key(&code) {
                warn!("coding {} declared twice, keeping the first row", code);
                continue;
            }
            entries.insert(code, values);
        }

        let mut dictionary = Self {
            columns,
            entries,
            lookup: 0,
        };
        dictionary.set_column(column)?;
        Ok(dictionary)
    }

    /// Switches the column terminal names are read from.
    pub fn set_column(&mut self, column: &str) -> Result<(), DecodeError> {
        match self.columns.iter().position(|c| c == column) {
            Some(lookup) => {
                self.lookup = lookup;
                Ok(())
            }
            None => Err(DecodeError::Dictionary {
                line: 1,
                message: format!("no column named \"{}\"", column),
            }),
        }
    }

    /// Terminal name of `code`, if the lookup column holds one.
    pub fn describe(&self, code: u32) -> Option<&str> {
        self.entries
            .get(&code)
            .and_then(|values| values.get(self.lookup))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Decodes lexical output made of `(code, lexeme)` pairs, any number per line,
    /// and appends the end marker just past the last character of the input.
    pub fn decode(&self, raw: &str) -> Result<TokenStream, DecodeError> {
        let mut tokens = TokenStream::new();
        let mut end = (1, 1);

        for (i, line) in raw.lines().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            // the end marker follows the last non-blank line
            if !line.trim().is_empty() {
                end = (i + 1, chars.len() + 1);
            }
            for (column, code, lexeme) in read_pairs(&chars, i + 1)? {
                let symbol = self.describe(code).ok_or(DecodeError::UnknownCode {
                    code,
                    line: i + 1,
                    column,
                })?;
                tokens.push(Token {
                    symbol: symbol.to_string(),
                    code: Some(code),
                    lexeme,
                    line: i + 1,
                    column,
                });
            }
        }

        tokens.push(Token::end_mark(end.0, end.1));
        debug!("decoded {} tokens", tokens.len());
        Ok(tokens)
    }
}

/// Splits one line into `(column, code, lexeme)` triples. A `)` only closes a pair
/// when it is followed by whitespace, another `(` or the end of the line, so
/// lexemes such as `)` or `,` survive.
fn read_pairs(chars: &[char], line: usize) -> Result<Vec<(usize, u32, String)>, DecodeError> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let column = i + 1;
        let malformed = DecodeError::MalformedPair { line, column };
        if chars[i] != '(' {
            return Err(malformed);
        }

        let comma = match chars[i..].iter().position(|&c| c == ',') {
            Some(offset) => i + offset,
            None => return Err(malformed),
        };
        let code: String = chars[i + 1..comma].iter().collect();
        let code: u32 = code.trim().parse().map_err(|_| malformed.clone())?;

        let mut start = comma + 1;
        if chars.get(start) == Some(&' ') {
            start += 1;
        }
        let close = (start..chars.len()).find(|&j| {
            chars[j] == ')'
                && chars
                    .get(j + 1)
                    .map_or(true, |&c| c.is_whitespace() || c == '(')
        });
        let close = match close {
            Some(close) => close,
            None => return Err(malformed),
        };

        pairs.push((column, code, chars[start..close].iter().collect()));
        i = close + 1;
    }
    Ok(pairs)
}

#[cfg(test)]
mod coding_tests {
    use super::*;

    const CODING: &str = "coding description secondary\n\
                          1 keyword_if if\n\
                          20 identifier id\n\
                          31 comma ,\n\
                          32 right_paren )\n\
                          40 reserved \n";

    fn dictionary() -> CodingDictionary {
        CodingDictionary::from_delimited(CODING, ' ', SECONDARY).unwrap()
    }

    #[test]
    fn lookup_by_column() {
        let mut d = dictionary();
        assert_eq!(d.describe(20), Some("id"));
        d.set_column("description").unwrap();
        assert_eq!(d.describe(20), Some("identifier"));
        assert!(d.set_column("missing").is_err());
    }

    #[test]
    fn decode_pairs_with_positions() {
        let tokens = dictionary().decode("(1, if)(20, x)\n\n  (20, y) (31, ,)(32, ))\n").unwrap();
        let seen: Vec<(&str, usize, usize)> = tokens
            .iter()
            .map(|t| (t.symbol.as_str(), t.line, t.column))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("if", 1, 1),
                ("id", 1, 8),
                ("id", 3, 3),
                (",", 3, 11),
                (")", 3, 18),
                ("#", 3, 25),
            ]
        );
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[3].lexeme, ",");
        assert_eq!(tokens[4].lexeme, ")");
    }

    #[test]
    fn trailing_blank_lines_keep_end_mark_in_place() {
        let tokens = dictionary().decode("(1, if)\n\n   \n\n").unwrap();
        assert_eq!(tokens.last(), Some(&Token::end_mark(1, 8)));
    }

    #[test]
    fn empty_input_is_only_end_mark() {
        let tokens = dictionary().decode("").unwrap();
        assert_eq!(tokens, vec![Token::end_mark(1, 1)]);
    }

    #[test]
    fn unknown_code() {
        let err = dictionary().decode("(1, if)\n(99, ?)").unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownCode {
                code: 99,
                line: 2,
                column: 1
            }
        );
    }

    #[test]
    fn empty_name_is_unknown() {
        let err = dictionary().decode("(40, r)").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownCode { code: 40, .. }));
    }

    #[test]
    fn malformed_pair() {
        let err = dictionary().decode("(1, if) (x, y)").unwrap_err();
        assert_eq!(err, DecodeError::MalformedPair { line: 1, column: 9 });
        assert!(dictionary().decode("(1 if)").is_err());
    }
}
