//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Tokenizer for ShExML documents.
//!
//! Angle-bracketed content is kept raw because ShExML reuses `<...>` for
//! paths and expressions, not only for IRIs. Tokens between `[` and `]`
//! only matter for their span, since references are read verbatim.

use std::fmt;

use crate::errors::{Result, TuCError};

#[derive(Clone, Debug, PartialEq)]
pub enum TuCTokenKind {
    /// Raw content between `<` and `>`.
    Angle(String),
    /// `prefix:local`, either part possibly empty.
    PrefixedName { prefix: String, local: String },
    /// `_:label`
    BlankLabel(String),
    /// Bare identifier or keyword.
    Name(String),
    /// Decoded string literal.
    Str(String),
    /// `@word`: language tag.
    At(String),
    Number(String),
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Semicolon,
    Comma,
    Dot,
    Plus,
    Eof,
}

impl fmt::Display for TuCTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuCTokenKind::Angle(s) => write!(f, "<{}>", s),
            TuCTokenKind::PrefixedName { prefix, local } => write!(f, "{}:{}", prefix, local),
            TuCTokenKind::BlankLabel(s) => write!(f, "_:{}", s),
            TuCTokenKind::Name(s) => write!(f, "{}", s),
            TuCTokenKind::Str(s) => write!(f, "\"{}\"", s),
            TuCTokenKind::At(s) => write!(f, "@{}", s),
            TuCTokenKind::Number(s) => write!(f, "{}", s),
            TuCTokenKind::LBrace => f.write_str("{"),
            TuCTokenKind::RBrace => f.write_str("}"),
            TuCTokenKind::LBracket => f.write_str("["),
            TuCTokenKind::RBracket => f.write_str("]"),
            TuCTokenKind::LParen => f.write_str("("),
            TuCTokenKind::RParen => f.write_str(")"),
            TuCTokenKind::Semicolon => f.write_str(";"),
            TuCTokenKind::Comma => f.write_str(","),
            TuCTokenKind::Dot => f.write_str("."),
            TuCTokenKind::Plus => f.write_str("+"),
            TuCTokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TuCToken {
    pub kind: TuCTokenKind,
    pub line: usize,
    pub column: usize,
    /// Byte offsets of the token in the document.
    pub start: usize,
    pub end: usize,
}

impl TuCToken {
    /// Whether `next` starts exactly where this token ends.
    #[allow(non_snake_case)]
    pub fn TuFTouches(&self, next: &TuCToken) -> bool {
        self.end == next.start
    }

    #[allow(non_snake_case)]
    pub fn TuFError(&self, message: impl Into<String>) -> TuCError {
        TuCError::parse(self.line, self.column, message)
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> TuCError {
        TuCError::parse(self.line, self.column, message)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Tokenizes a whole document. The last token is always [`TuCTokenKind::Eof`].
#[allow(non_snake_case)]
pub fn TuFTokenize(src: &str) -> Result<Vec<TuCToken>> {
    let mut cur = Cursor {
        src,
        pos: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();

    loop {
        skip_trivia(&mut cur);
        let (line, column, start) = (cur.line, cur.column, cur.pos);
        let c = match cur.peek() {
            Some(c) => c,
            None => {
                tokens.push(TuCToken {
                    kind: TuCTokenKind::Eof,
                    line,
                    column,
                    start,
                    end: start,
                });
                return Ok(tokens);
            }
        };

        let kind = match c {
            '<' => lex_angle(&mut cur)?,
            '"' | '\'' => TuCTokenKind::Str(lex_string(&mut cur)?),
            '@' => {
                cur.bump();
                let word = take_while(&mut cur, |c| c.is_alphanumeric() || c == '-');
                if word.is_empty() {
                    return Err(TuCError::parse(line, column, "expected a word after '@'"));
                }
                TuCTokenKind::At(word)
            }
            '{' => single(&mut cur, TuCTokenKind::LBrace),
            '}' => single(&mut cur, TuCTokenKind::RBrace),
            '[' => single(&mut cur, TuCTokenKind::LBracket),
            ']' => single(&mut cur, TuCTokenKind::RBracket),
            '(' => single(&mut cur, TuCTokenKind::LParen),
            ')' => single(&mut cur, TuCTokenKind::RParen),
            ';' => single(&mut cur, TuCTokenKind::Semicolon),
            ',' => single(&mut cur, TuCTokenKind::Comma),
            '.' => single(&mut cur, TuCTokenKind::Dot),
            '+' if !cur.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                single(&mut cur, TuCTokenKind::Plus)
            }
            '+' | '-' if cur.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                TuCTokenKind::Number(lex_number(&mut cur))
            }
            c if c.is_ascii_digit() => TuCTokenKind::Number(lex_number(&mut cur)),
            ':' => {
                cur.bump();
                TuCTokenKind::PrefixedName {
                    prefix: String::new(),
                    local: lex_local(&mut cur),
                }
            }
            c if is_name_start(c) => {
                let name = take_while(&mut cur, is_name_char);
                if name == "_" && cur.peek() == Some(':') {
                    cur.bump();
                    TuCTokenKind::BlankLabel(lex_local(&mut cur))
                } else if cur.peek() == Some(':') {
                    cur.bump();
                    TuCTokenKind::PrefixedName {
                        prefix: name,
                        local: lex_local(&mut cur),
                    }
                } else {
                    TuCTokenKind::Name(name)
                }
            }
            other => {
                return Err(TuCError::parse(
                    line,
                    column,
                    format!("unexpected character '{}'", other),
                ))
            }
        };

        tokens.push(TuCToken {
            kind,
            line,
            column,
            start,
            end: cur.pos,
        });
    }
}

fn single(cur: &mut Cursor<'_>, kind: TuCTokenKind) -> TuCTokenKind {
    cur.bump();
    kind
}

fn skip_trivia(cur: &mut Cursor<'_>) {
    while let Some(c) = cur.peek() {
        if c.is_whitespace() {
            cur.bump();
        } else if c == '#' {
            while let Some(c) = cur.peek() {
                if c == '\n' {
                    break;
                }
                cur.bump();
            }
        } else {
            break;
        }
    }
}

fn take_while<F: Fn(char) -> bool>(cur: &mut Cursor<'_>, pred: F) -> String {
    let mut out = String::new();
    while let Some(c) = cur.peek() {
        if !pred(c) {
            break;
        }
        out.push(c);
        cur.bump();
    }
    out
}

/// Local part of a prefixed name. Dots are allowed inside but never last.
fn lex_local(cur: &mut Cursor<'_>) -> String {
    let mut out = String::new();
    while let Some(c) = cur.peek() {
        if is_name_char(c) {
            out.push(c);
            cur.bump();
        } else if c == '.' && cur.peek_at(1).is_some_and(is_name_char) {
            out.push(c);
            cur.bump();
        } else {
            break;
        }
    }
    out
}

fn lex_number(cur: &mut Cursor<'_>) -> String {
    let mut out = String::new();
    if let Some(sign @ ('+' | '-')) = cur.peek() {
        out.push(sign);
        cur.bump();
    }
    while let Some(c) = cur.peek() {
        if c.is_ascii_digit() {
            out.push(c);
            cur.bump();
        } else if c == '.' && cur.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
            out.push(c);
            cur.bump();
        } else {
            break;
        }
    }
    out
}

fn lex_angle(cur: &mut Cursor<'_>) -> Result<TuCTokenKind> {
    let open = cur.error("unterminated '<'");
    cur.bump();
    let mut out = String::new();
    let mut quote: Option<char> = None;
    loop {
        let c = cur.bump().ok_or_else(|| open.clone())?;
        match (quote, c) {
            (None, '>') => return Ok(TuCTokenKind::Angle(out)),
            (None, '\n') => return Err(open),
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                out.push(c);
            }
            (Some(q), c) if c == q => {
                quote = None;
                out.push(c);
            }
            (Some(_), '\\') => {
                out.push(c);
                if let Some(next) = cur.bump() {
                    out.push(next);
                }
            }
            (_, c) => out.push(c),
        }
    }
}

fn lex_string(cur: &mut Cursor<'_>) -> Result<String> {
    let unterminated = cur.error("unterminated string literal");
    let quote = cur.bump().ok_or_else(|| unterminated.clone())?;

    let mut out = String::new();
    loop {
        let c = cur.bump().ok_or_else(|| unterminated.clone())?;
        match c {
            '\\' => {
                let esc = cur.bump().ok_or_else(|| unterminated.clone())?;
                out.push(match esc {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '"' | '\'' | '\\' => esc,
                    other => {
                        return Err(cur.error(format!("unknown escape sequence '\\{}'", other)))
                    }
                });
            }
            '\n' => return Err(unterminated),
            c if c == quote => return Ok(out),
            c => out.push(c),
        }
    }
}
