use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::SyntaxProblem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Register name including the `$`, e.g. `$t0`.
    Register(String),
    Comma,
    LParen,
    RParen,
    Int(i64),
    Ident(String),
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_int(run: &str) -> Option<i64> {
    let (neg, digits) = match run.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, run),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<i64>().ok()?
    };
    Some(if neg { -magnitude } else { magnitude })
}

/// Consumes the run of word characters starting at byte `start`.
fn take_run<'a>(text: &'a str, chars: &mut Peekable<CharIndices<'a>>, start: usize) -> &'a str {
    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if !is_word_char(c) {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }
    &text[start..end]
}

/// Splits an operand list such as `$t0, -8($sp)` into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxProblem> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '$' => {
                chars.next();
                let name = take_run(text, &mut chars, pos + 1);
                tokens.push(Token::Register(format!("${name}")));
            }
            '-' => {
                chars.next();
                match chars.peek() {
                    Some(&(_, d)) if d.is_ascii_digit() => {
                        let run = take_run(text, &mut chars, pos + 1);
                        let lit = &text[pos..pos + 1 + run.len()];
                        let v = parse_int(lit).ok_or_else(|| SyntaxProblem::BadNumber(lit.to_string()))?;
                        tokens.push(Token::Int(v));
                    }
                    _ => return Err(SyntaxProblem::UnexpectedChar('-')),
                }
            }
            c if c.is_ascii_digit() => {
                let run = take_run(text, &mut chars, pos);
                let v = parse_int(run).ok_or_else(|| SyntaxProblem::BadNumber(run.to_string()))?;
                tokens.push(Token::Int(v));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let run = take_run(text, &mut chars, pos);
                tokens.push(Token::Ident(run.to_string()));
            }
            other => return Err(SyntaxProblem::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}
