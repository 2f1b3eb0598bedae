pub mod coding;
pub mod ll1_parse;
pub use coding::{CodingDictionary, Token, TokenStream};
pub use ll1_parse::{Action, ParseStep, ParseTrace, Parser};
