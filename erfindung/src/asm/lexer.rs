//! Turns source text into a flat token stream. Letters are lowercased,
//! `#` comments are stripped, `:` `[` `]` always stand alone, and every
//! source line ends with a synthetic `"\n"` token (blank lines included)
//! so the encoder's line counter never drifts.

use crate::asm::{AsmError, AsmErrorKind};

#[cfg(test)]
#[path = "./lexer_test.rs"]
mod lexer_test;

pub fn tokenize(source: &str) -> Result<Vec<String>, AsmError> {
    let mut tokens = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let line_number = idx + 1;
        let mut word = String::new();
        for c in line.chars() {
            if c == '#' {
                break;
            }
            if !c.is_ascii() || (c.is_ascii_control() && c != '\t') {
                return Err(AsmError {
                    line: line_number,
                    kind: AsmErrorKind::Lexical,
                    message: format!(": unrecognized character {:?} in source", c),
                });
            }
            match c {
                ':' | '[' | ']' => {
                    if !word.is_empty() {
                        tokens.push(std::mem::replace(&mut word, String::new()));
                    }
                    tokens.push(c.to_string());
                }
                _ if c.is_ascii_whitespace() => {
                    if !word.is_empty() {
                        tokens.push(std::mem::replace(&mut word, String::new()));
                    }
                }
                _ => word.push(c.to_ascii_lowercase()),
            }
        }
        if !word.is_empty() {
            tokens.push(word);
        }
        tokens.push("\n".to_string());
    }
    Ok(tokens)
}
