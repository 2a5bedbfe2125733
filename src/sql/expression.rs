//! Comparison of SQL expression text

use sqlparser::dialect::MsSqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Whether two SQL expressions are the same up to whitespace and keyword/identifier case.
///
/// Falls back to comparing whitespace-collapsed text when either side fails to tokenize.
pub fn same_expression(a: &str, b: &str) -> bool {
    match (normalized_tokens(a), normalized_tokens(b)) {
        (Some(x), Some(y)) => x == y,
        _ => collapse_whitespace(a) == collapse_whitespace(b),
    }
}

fn normalized_tokens(sql: &str) -> Option<Vec<String>> {
    let dialect = MsSqlDialect {};
    let tokens = Tokenizer::new(&dialect, sql).tokenize().ok()?;
    Some(
        tokens
            .into_iter()
            .filter(|t| !matches!(t, Token::Whitespace(_)))
            .map(|t| match t {
                Token::Word(w) => w.value.to_lowercase(),
                other => other.to_string(),
            })
            .collect(),
    )
}

fn collapse_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
