// Text handling — tokenizing, stopword filtering, list-field parsing.

pub mod fields;
pub mod stopwords;
pub mod tokenizer;

pub use stopwords::StopwordSet;
pub use tokenizer::{tokenize, TokenFilter};
