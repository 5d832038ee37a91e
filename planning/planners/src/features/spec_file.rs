//! Parser for the resource / function spec files.
//!
//! The format is a sequence of lines `(:resource NAME MIN MAX DELTA)` (or
//! `(:function ...)`), where NAME is an identifier optionally followed by a
//! parenthesised argument list glued to it. Whitespace is insignificant and
//! a duplicated NAME keeps its last occurrence.

use crate::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpecLine {
    pub name: String,
    pub min: i64,
    pub max: i64,
    pub delta: i64,
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Word(String),
}

fn err(line: usize, msg: impl Into<String>) -> Error {
    Error::SpecParse {
        line,
        msg: msg.into(),
    }
}

/// Tokenises the input. A `(` directly attached to an identifier is folded
/// into the identifier together with everything up to the matching `)`.
fn lex(text: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push((line, Token::Open));
            }
            ')' => {
                chars.next();
                tokens.push((line, Token::Close));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == ')' {
                        break;
                    }
                    if c == '(' {
                        // argument list glued to the identifier
                        word.push(c);
                        chars.next();
                        loop {
                            match chars.next() {
                                Some(')') => {
                                    word.push(')');
                                    break;
                                }
                                Some('\n') | None => {
                                    return Err(err(line, "unterminated argument list in name"));
                                }
                                Some(c) => word.push(c),
                            }
                        }
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push((line, Token::Word(word)));
            }
        }
    }
    Ok(tokens)
}

/// Parses a spec file body; `keyword` is `"resource"` or `"function"`.
pub fn parse(text: &str, keyword: &str) -> Result<Vec<SpecLine>> {
    let tokens = lex(text)?;
    let tag = format!(":{keyword}");
    let mut lines: Vec<SpecLine> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    let mut it = tokens.into_iter();
    while let Some((line, token)) = it.next() {
        if token != Token::Open {
            return Err(err(line, "expected '('"));
        }
        match it.next() {
            Some((_, Token::Word(w))) if w == tag => {}
            Some((l, _)) => return Err(err(l, format!("expected '{tag}'"))),
            None => return Err(err(line, format!("expected '{tag}'"))),
        }
        let name = match it.next() {
            Some((_, Token::Word(w))) => w,
            Some((l, _)) => return Err(err(l, "expected a name")),
            None => return Err(err(line, "expected a name")),
        };
        let mut bounds = [0i64; 3];
        for slot in bounds.iter_mut() {
            match it.next() {
                Some((l, Token::Word(w))) => {
                    *slot = w
                        .parse::<i64>()
                        .ok()
                        .filter(|v| *v >= 0)
                        .ok_or_else(|| err(l, format!("expected a non-negative integer, got '{w}'")))?;
                }
                Some((l, _)) => return Err(err(l, "expected a non-negative integer")),
                None => return Err(err(line, "unexpected end of input")),
            }
        }
        match it.next() {
            Some((_, Token::Close)) => {}
            Some((l, _)) => return Err(err(l, "expected ')'")),
            None => return Err(err(line, "unexpected end of input")),
        }

        let entry = SpecLine {
            name,
            min: bounds[0],
            max: bounds[1],
            delta: bounds[2],
        };
        // last occurrence of a name wins, in place
        match by_name.get(&entry.name) {
            Some(&i) => lines[i] = entry,
            None => {
                by_name.insert(entry.name.clone(), lines.len());
                lines.push(entry);
            }
        }
    }
    if lines.is_empty() {
        return Err(err(1, format!("the file declares no (:{keyword} ...) line")));
    }
    Ok(lines)
}

/// Reads and parses a spec file from disk.
pub fn parse_path(path: &Path, keyword: &str) -> Result<Vec<SpecLine>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| err(0, format!("cannot read {}: {e}", path.display())))?;
    parse(&text, keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resource_lines() {
        let text = "(:resource rover0 0 10 1)\n(:resource rover1 0 10 1)";
        let lines = parse(text, "resource").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "rover0");
        assert_eq!(lines[1].delta, 1);
    }

    #[test]
    fn whitespace_is_insignificant() {
        let text = "(:function\n   energy\n 0 100\n 25)";
        let lines = parse(text, "function").unwrap();
        assert_eq!(
            lines[0],
            SpecLine {
                name: "energy".to_string(),
                min: 0,
                max: 100,
                delta: 25
            }
        );
    }

    #[test]
    fn name_may_carry_arguments() {
        let lines = parse("(:resource fuel(truck1) 0 50 5)", "resource").unwrap();
        assert_eq!(lines[0].name, "fuel(truck1)");
    }

    #[test]
    fn duplicate_name_keeps_the_last_line() {
        let text = "(:resource r 0 1 1) (:resource r 0 9 3)";
        let lines = parse(text, "resource").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].max, 9);
    }

    #[test]
    fn malformed_input_reports_the_line() {
        let text = "(:resource a 0 1 1)\n(:resource b 0 x 1)";
        match parse(text, "resource") {
            Err(Error::SpecParse { line: 2, .. }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn wrong_keyword_is_rejected() {
        assert!(parse("(:resource a 0 1 1)", "function").is_err());
    }
}
