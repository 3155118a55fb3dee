use serde::{Deserialize, Serialize};

use crate::lexer::{Position, Token, TokenKind};

/// A fatal scanner failure. Scanning cannot continue past one of these.
///
/// Malformed contract source is never reported here: it surfaces as
/// `INVALID` tokens in the stream instead (see [`ScanDiagnostic`]).
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The underlying reader failed for a reason other than end of input.
    #[error("read failed after {position}: {source}")]
    Io {
        position: Position,
        #[source]
        source: std::io::Error,
    },

    /// The input stream is not valid UTF-8.
    #[error("invalid UTF-8 sequence after {position}")]
    InvalidUtf8 { position: Position },
}

/// A recoverable diagnostic built from an `INVALID` token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanDiagnostic {
    pub value: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ScanDiagnostic {
    /// Returns a diagnostic for `token` if it is `INVALID`.
    pub fn from_token(token: &Token) -> Option<Self> {
        if token.kind != TokenKind::Invalid {
            return None;
        }
        let message = match token.value.chars().next() {
            Some(c) if c.is_ascii_digit() => {
                format!("invalid integer literal '{}'", token.value)
            }
            Some(c) if c.is_alphabetic() => format!("unknown keyword '{}'", token.value),
            _ => format!("unexpected character '{}'", token.value),
        };
        Some(ScanDiagnostic {
            value: token.value.clone(),
            line: token.position.line,
            column: token.position.column,
            message,
        })
    }

    /// Serialize with every field present, in a stable key order.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "line":    self.line,
            "column":  self.column,
            "value":   self.value,
            "message": self.message,
        })
    }
}

impl std::fmt::Display for ScanDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Collects a diagnostic for every `INVALID` token, in stream order.
pub fn diagnostics(tokens: &[Token]) -> Vec<ScanDiagnostic> {
    tokens.iter().filter_map(ScanDiagnostic::from_token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(value: &str, line: u32, column: u32) -> Token {
        Token {
            kind: TokenKind::Invalid,
            value: value.to_owned(),
            position: Position { line, column },
        }
    }

    #[test]
    fn valid_tokens_produce_no_diagnostic() {
        let tok = Token {
            kind: TokenKind::Keyword,
            value: "Close".to_owned(),
            position: Position { line: 1, column: 5 },
        };
        assert!(ScanDiagnostic::from_token(&tok).is_none());
    }

    #[test]
    fn diagnostic_messages_name_the_offending_text() {
        let diags = diagnostics(&[
            invalid("123", 1, 3),
            invalid("Bogus", 2, 5),
            invalid("$", 3, 1),
        ]);
        assert_eq!(diags.len(), 3);
        assert_eq!(diags[0].message, "invalid integer literal '123'");
        assert_eq!(diags[1].message, "unknown keyword 'Bogus'");
        assert_eq!(diags[2].message, "unexpected character '$'");
        assert_eq!(diags[1].to_string(), "2:5: unknown keyword 'Bogus'");
    }

    #[test]
    fn json_form_has_all_fields() {
        let diag = ScanDiagnostic::from_token(&invalid("x", 4, 2)).unwrap();
        let json = diag.to_json_value();
        assert_eq!(json["line"], 4);
        assert_eq!(json["column"], 2);
        assert_eq!(json["value"], "x");
        assert_eq!(json["message"], "unknown keyword 'x'");
    }
}
