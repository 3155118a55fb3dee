//! marlowe-core: the Marlowe contract algebra and source scanner.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Scanner`] / [`tokenize()`] -- turn contract source into [`Token`]s
//! - [`ScanError`] -- fatal reader failures; [`ScanDiagnostic`] -- invalid tokens
//! - Algebra: [`Contract`], [`Case`], [`Action`], [`Input`], [`Value`],
//!   [`Observation`] and their leaves ([`Party`], [`Asset`], [`ChoiceId`], ...)
//! - [`State`] and [`Environment`] records for an external evaluator
//!
//! The canonical JSON encoding lives in the `marlowe-interchange` crate.

pub mod address;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod state;

// ── Convenience re-exports: key types ────────────────────────────────

pub use address::AddressValidator;
pub use ast::{
    Account, AccountId, Action, Asset, Bound, Case, ChoiceId, ChoiceName, Contract, Input,
    Integer, Observation, Party, Payee, PosixTime, Timeout, Value, ValueId,
};
pub use error::{diagnostics, ScanDiagnostic, ScanError};
pub use lexer::{is_keyword, tokenize, Position, Scanner, Token, TokenKind, KEYWORDS};
pub use state::{Accounts, Environment, State, TimeInterval};
