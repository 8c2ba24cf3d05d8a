//! Query-string helpers: raw parameter access, `q` syntax checking and
//! lenient date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Raw query pairs in arrival order. Repeated keys keep every value.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value for `key`, if the key was sent at all (possibly empty).
    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First value for `key`, treating an empty or blank value as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.first(key).filter(|v| !v.trim().is_empty())
    }

    /// Comma-separated values of `key`, trimmed, empty items dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.non_empty(key)
            .map(|raw| {
                raw.split(',')
                    .map(|item| item.trim().to_ascii_lowercase())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Term,
    And,
    Or,
    Not,
    Open,
    Close,
}

fn tokenize(q: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = q.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '"' {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return None;
                }
                tokens.push(Token::Term);
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(match word.as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Term,
                });
            }
        }
    }
    Some(tokens)
}

/// Whether `q` is a well-formed search expression: balanced parentheses and
/// quotes, binary operators with an operand on each side, `NOT` followed by an
/// operand. Adjacent terms are an implicit AND.
pub fn is_well_formed(q: &str) -> bool {
    let Some(tokens) = tokenize(q) else {
        return false;
    };
    let mut depth: i32 = 0;
    let mut expect_operand = true;
    for token in tokens {
        match token {
            Token::Term => expect_operand = false,
            Token::Open => {
                depth += 1;
                expect_operand = true;
            }
            Token::Close => {
                if expect_operand {
                    return false;
                }
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            Token::And | Token::Or => {
                if expect_operand {
                    return false;
                }
                expect_operand = true;
            }
            Token::Not => expect_operand = true,
        }
    }
    !expect_operand && depth == 0
}

/// Parse `from`/`to` values: RFC 3339, naive date-time (assumed UTC) or a bare
/// date (midnight UTC). Anything else yields `None` and is ignored upstream.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
