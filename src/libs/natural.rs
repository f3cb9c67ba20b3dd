use std::cmp::Ordering;

/// One fragment of a natural sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A digit run, stored without leading zeros so runs of any length
    /// compare by value
    Number(String),
    /// A lower-cased run of non-digit characters
    Text(String),
}

impl Token {
    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Token::Number("0".to_string())
        } else {
            Token::Number(trimmed.to_string())
        }
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Number(a), Token::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Token::Text(a), Token::Text(b)) => a.cmp(b),
            // A leading digit run sorts before any text
            (Token::Number(_), Token::Text(_)) => Ordering::Less,
            (Token::Text(_), Token::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Comparison key ordering names the way a human would: `chr2 < chr10 < chr21`.
pub type NaturalKey = Vec<Token>;

/// Splits `s` on maximal ASCII digit runs.
///
/// ```
/// # use isat::libs::natural::{natural_key, Token};
/// assert_eq!(
///     natural_key("Chr10_random"),
///     vec![
///         Token::Text("chr".to_string()),
///         Token::Number("10".to_string()),
///         Token::Text("_random".to_string()),
///     ]
/// );
/// assert!(natural_key("chr2") < natural_key("chr10"));
/// ```
pub fn natural_key(s: &str) -> NaturalKey {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut in_digits = false;

    for c in s.chars() {
        let is_digit = c.is_ascii_digit();
        if is_digit != in_digits && !run.is_empty() {
            tokens.push(finish_run(&run, in_digits));
            run.clear();
        }
        in_digits = is_digit;
        run.push(c);
    }
    if !run.is_empty() {
        tokens.push(finish_run(&run, in_digits));
    }

    tokens
}

fn finish_run(run: &str, digits: bool) -> Token {
    if digits {
        Token::number(run)
    } else {
        Token::Text(run.to_lowercase())
    }
}
