//! Pull-based scanner for Marlowe contract source.
//!
//! The scanner never aborts on malformed source: anything it cannot
//! classify comes back as an [`TokenKind::Invalid`] token and scanning
//! resumes at the next character. Only a failure of the underlying
//! reader is fatal.

use std::collections::HashSet;
use std::fmt;
use std::io::{self, BufRead};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

use crate::error::ScanError;

/// Constructor names accepted as keywords. Matching is case-sensitive.
pub const KEYWORDS: &[&str] = &[
    // Contracts
    "Let", "When", "If", "Pay", "Assert", "Close",
    // Actions and their leaves
    "Deposit", "Notify", "Choice", "ChoiceId", "Bound", "Case",
    // Parties, tokens, payees
    "Role", "Address", "Token", "Account", "Party",
    // Values
    "AvailableMoney", "Constant", "NegValue", "AddValue", "SubValue", "MulValue", "DivValue",
    "ChoiceValue", "TimeIntervalValue", "TimeIntervalStart", "TimeIntervalEnd", "UseValue",
    "Cond",
    // Observations
    "AndObs", "OrObs", "NotObs", "ChoseSomething", "ValueGE", "ValueGT", "ValueLE", "ValueLT",
    "ValueEQ", "TrueObs", "FalseObs",
];

static KEYWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| KEYWORDS.iter().copied().collect());

pub fn is_keyword(word: &str) -> bool {
    KEYWORD_SET.contains(word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Eof,
    Invalid,
    /// `Pay`, `When`, `If`, ...
    Keyword,
    /// Quoted text, quotes included
    String,
    /// Digit run of any length
    Int,
    ParensL,
    ParensR,
    SquareL,
    SquareR,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Invalid => "INVALID",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::String => "STRING",
            TokenKind::Int => "INT",
            TokenKind::ParensL => "(",
            TokenKind::ParensR => ")",
            TokenKind::SquareL => "[",
            TokenKind::SquareR => "]",
            TokenKind::Comma => ",",
        };
        f.write_str(s)
    }
}

/// Line (1-based) and column of a consumed character.
///
/// Field order gives the derived `Ord` its lexicographic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 0 };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A scanned token. `position` is that of the token's last character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: Position,
}

/// A letter or punctuation mark (`P*`, structural punctuation included)
/// directly after a digit invalidates the integer.
fn breaks_integer(c: char) -> bool {
    matches!(
        c.general_category_group(),
        GeneralCategoryGroup::Letter | GeneralCategoryGroup::Punctuation
    )
}

pub struct Scanner<R> {
    reader: R,
    position: Position,
    peeked: Option<char>,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Scanner {
            reader,
            position: Position::START,
            peeked: None,
        }
    }

    /// Position of the last consumed character.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns the next token. Once input is exhausted every call returns
    /// an `EOF` token.
    pub fn scan(&mut self) -> Result<Token, ScanError> {
        let token = loop {
            let Some(c) = self.bump()? else {
                break self.token(TokenKind::Eof, String::new());
            };
            match c {
                '(' => break self.token(TokenKind::ParensL, "("),
                ')' => break self.token(TokenKind::ParensR, ")"),
                '[' => break self.token(TokenKind::SquareL, "["),
                ']' => break self.token(TokenKind::SquareR, "]"),
                ',' => break self.token(TokenKind::Comma, ","),
                '"' => {
                    let text = self.string()?;
                    break self.token(TokenKind::String, text);
                }
                c if c.is_whitespace() => continue,
                c if c.is_ascii_digit() => break self.integer(c)?,
                c if c.is_alphabetic() => break self.keyword(c)?,
                other => break self.token(TokenKind::Invalid, other.to_string()),
            }
        };

        if token.kind == TokenKind::Invalid {
            tracing::debug!(
                value = %token.value,
                line = token.position.line,
                column = token.position.column,
                "invalid token"
            );
        } else {
            tracing::trace!(
                kind = %token.kind,
                value = %token.value,
                line = token.position.line,
                column = token.position.column,
                "scanned token"
            );
        }
        Ok(token)
    }

    /// Iterator over the remaining tokens, ending after the first `EOF`.
    pub fn tokens(self) -> Tokens<R> {
        Tokens {
            scanner: self,
            finished: false,
        }
    }

    fn token(&self, kind: TokenKind, value: impl Into<String>) -> Token {
        Token {
            kind,
            value: value.into(),
            position: self.position,
        }
    }

    /// Digits up to the first non-digit. A trailing letter or punctuation
    /// mark invalidates the literal; either way that character is left unread.
    fn integer(&mut self, first: char) -> Result<Token, ScanError> {
        let mut digits = String::from(first);
        loop {
            match self.peek()? {
                Some(c) if c.is_ascii_digit() => {
                    self.bump()?;
                    digits.push(c);
                }
                Some(c) if breaks_integer(c) => {
                    return Ok(self.token(TokenKind::Invalid, digits));
                }
                _ => return Ok(self.token(TokenKind::Int, digits)),
            }
        }
    }

    fn keyword(&mut self, first: char) -> Result<Token, ScanError> {
        let mut word = String::from(first);
        while let Some(c) = self.peek()? {
            if !c.is_alphabetic() {
                break;
            }
            self.bump()?;
            word.push(c);
        }
        let kind = if is_keyword(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Invalid
        };
        Ok(self.token(kind, word))
    }

    /// Called after the opening quote. Captures through the closing quote,
    /// or to end of input if there is none.
    fn string(&mut self) -> Result<String, ScanError> {
        let mut text = String::from('"');
        while let Some(c) = self.bump()? {
            text.push(c);
            if c == '"' {
                break;
            }
        }
        Ok(text)
    }

    fn peek(&mut self) -> Result<Option<char>, ScanError> {
        if self.peeked.is_none() {
            self.peeked = self.read_char()?;
        }
        Ok(self.peeked)
    }

    fn bump(&mut self) -> Result<Option<char>, ScanError> {
        let c = match self.peeked.take() {
            Some(c) => Some(c),
            None => self.read_char()?,
        };
        if let Some(c) = c {
            if c == '\n' {
                self.position.line += 1;
                self.position.column = 0;
            } else {
                self.position.column += 1;
            }
        }
        Ok(c)
    }

    fn read_char(&mut self) -> Result<Option<char>, ScanError> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let width = match first {
            0x00..=0x7F => return Ok(Some(char::from(first))),
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(self.invalid_utf8()),
        };
        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?.ok_or_else(|| self.invalid_utf8())?;
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| self.invalid_utf8())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, ScanError> {
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScanError::Io {
                        position: self.position,
                        source,
                    })
                }
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.reader.consume(1);
            return Ok(Some(byte));
        }
    }

    fn invalid_utf8(&self) -> ScanError {
        ScanError::InvalidUtf8 {
            position: self.position,
        }
    }
}

/// See [`Scanner::tokens`].
pub struct Tokens<R> {
    scanner: Scanner<R>,
    finished: bool,
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let next = self.scanner.scan();
        match &next {
            Ok(token) if token.kind != TokenKind::Eof => {}
            _ => self.finished = true,
        }
        Some(next)
    }
}

/// Scans `src` to the end. The returned vector ends with the `EOF` token.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ScanError> {
    Scanner::new(src.as_bytes()).tokens().collect()
}
