//! The Marlowe contract algebra.
//!
//! `Value` and `Observation` are mutually recursive, as are `Contract` and
//! `Case`. Every family is a closed enum; consumers match exhaustively.
//! Names such as [`ValueId`] and [`ChoiceId`] are references resolved by an
//! evaluator against its state, never by pointer identity.

use std::fmt;

use num_bigint::BigInt;

/// Unbounded integer used for every amount and constant.
pub type Integer = BigInt;

/// Milliseconds since the Unix epoch.
pub type PosixTime = i64;
pub type Timeout = PosixTime;

pub type ChoiceName = String;

// ──────────────────────────────────────────────
// Leaves
// ──────────────────────────────────────────────

/// A contract participant: a fixed ledger address or a tradeable role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Party {
    Address(String),
    Role(String),
}

impl Party {
    pub fn role(name: impl Into<String>) -> Self {
        Party::Role(name.into())
    }

    pub fn address(address: impl Into<String>) -> Self {
        Party::Address(address.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Party::Address(_) => "Address",
            Party::Role(_) => "Role",
        }
    }
}

/// Internal accounts are owned by parties.
pub type AccountId = Party;

/// A currency symbol and token name pair. Both are opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Asset {
    pub currency_symbol: String,
    pub token_name: String,
}

impl Asset {
    pub fn new(currency_symbol: impl Into<String>, token_name: impl Into<String>) -> Self {
        Asset {
            currency_symbol: currency_symbol.into(),
            token_name: token_name.into(),
        }
    }

    /// The ledger's native asset, written with an empty symbol and name.
    pub fn native() -> Self {
        Asset::default()
    }

    pub fn is_native(&self) -> bool {
        self.currency_symbol.is_empty() && self.token_name.is_empty()
    }
}

/// Key of the accounts map: whose account, and which asset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Account {
    pub account_id: AccountId,
    pub asset: Asset,
}

impl Account {
    pub fn new(account_id: AccountId, asset: Asset) -> Self {
        Account { account_id, asset }
    }
}

/// Destination of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payee {
    /// Internal account of a party, kept inside the contract.
    Account(AccountId),
    /// Paid out to the party.
    Party(Party),
}

impl Payee {
    pub fn kind(&self) -> &'static str {
        match self {
            Payee::Account(_) => "Account",
            Payee::Party(_) => "Party",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChoiceId {
    pub name: ChoiceName,
    pub owner: Party,
}

impl ChoiceId {
    pub fn new(name: impl Into<ChoiceName>, owner: Party) -> Self {
        ChoiceId {
            name: name.into(),
            owner,
        }
    }
}

/// Inclusive range of acceptable choices. `upper >= lower` is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bound {
    pub upper: u64,
    pub lower: u64,
}

impl Bound {
    pub fn new(upper: u64, lower: u64) -> Self {
        Bound { upper, lower }
    }
}

/// Name under which `Let` stores a value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub String);

impl ValueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ValueId {
    fn from(s: &str) -> Self {
        ValueId(s.to_owned())
    }
}

impl From<String> for ValueId {
    fn from(s: String) -> Self {
        ValueId(s)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ──────────────────────────────────────────────
// Values and observations
// ──────────────────────────────────────────────

/// A term that evaluates to an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Amount of `asset` held in `account`.
    AvailableMoney { asset: Asset, account: AccountId },
    Constant(Integer),
    NegValue(Box<Value>),
    AddValue(Box<Value>, Box<Value>),
    SubValue(Box<Value>, Box<Value>),
    MulValue(Box<Value>, Box<Value>),
    /// Division truncates toward zero.
    DivValue(Box<Value>, Box<Value>),
    /// Most recent value chosen for the choice, zero if none.
    ChoiceValue(ChoiceId),
    TimeIntervalStart,
    TimeIntervalEnd,
    /// Most recent value bound by `Let`, zero if none.
    UseValue(ValueId),
    Cond(Box<Observation>, Box<Value>, Box<Value>),
}

impl Value {
    pub fn constant(n: impl Into<Integer>) -> Self {
        Value::Constant(n.into())
    }

    pub fn available_money(asset: Asset, account: AccountId) -> Self {
        Value::AvailableMoney { asset, account }
    }

    pub fn use_value(name: impl Into<ValueId>) -> Self {
        Value::UseValue(name.into())
    }

    pub fn neg_value(v: Value) -> Self {
        Value::NegValue(Box::new(v))
    }

    pub fn add_value(lhs: Value, rhs: Value) -> Self {
        Value::AddValue(Box::new(lhs), Box::new(rhs))
    }

    pub fn sub_value(lhs: Value, rhs: Value) -> Self {
        Value::SubValue(Box::new(lhs), Box::new(rhs))
    }

    pub fn mul_value(lhs: Value, rhs: Value) -> Self {
        Value::MulValue(Box::new(lhs), Box::new(rhs))
    }

    pub fn div_value(lhs: Value, rhs: Value) -> Self {
        Value::DivValue(Box::new(lhs), Box::new(rhs))
    }

    pub fn cond(obs: Observation, if_true: Value, if_false: Value) -> Self {
        Value::Cond(Box::new(obs), Box::new(if_true), Box::new(if_false))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::AvailableMoney { .. } => "AvailableMoney",
            Value::Constant(_) => "Constant",
            Value::NegValue(_) => "NegValue",
            Value::AddValue(..) => "AddValue",
            Value::SubValue(..) => "SubValue",
            Value::MulValue(..) => "MulValue",
            Value::DivValue(..) => "DivValue",
            Value::ChoiceValue(_) => "ChoiceValue",
            Value::TimeIntervalStart => "TimeIntervalStart",
            Value::TimeIntervalEnd => "TimeIntervalEnd",
            Value::UseValue(_) => "UseValue",
            Value::Cond(..) => "Cond",
        }
    }
}

/// A term that evaluates to a boolean.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Observation {
    AndObs(Box<Observation>, Box<Observation>),
    OrObs(Box<Observation>, Box<Observation>),
    NotObs(Box<Observation>),
    /// Whether the choice has been made so far.
    ChoseSomething(ChoiceId),
    ValueGE(Box<Value>, Box<Value>),
    ValueGT(Box<Value>, Box<Value>),
    ValueLT(Box<Value>, Box<Value>),
    ValueLE(Box<Value>, Box<Value>),
    ValueEQ(Box<Value>, Box<Value>),
    TrueObs,
    FalseObs,
}

impl Observation {
    pub fn and_obs(lhs: Observation, rhs: Observation) -> Self {
        Observation::AndObs(Box::new(lhs), Box::new(rhs))
    }

    pub fn or_obs(lhs: Observation, rhs: Observation) -> Self {
        Observation::OrObs(Box::new(lhs), Box::new(rhs))
    }

    pub fn not_obs(obs: Observation) -> Self {
        Observation::NotObs(Box::new(obs))
    }

    pub fn value_ge(lhs: Value, rhs: Value) -> Self {
        Observation::ValueGE(Box::new(lhs), Box::new(rhs))
    }

    pub fn value_gt(lhs: Value, rhs: Value) -> Self {
        Observation::ValueGT(Box::new(lhs), Box::new(rhs))
    }

    pub fn value_lt(lhs: Value, rhs: Value) -> Self {
        Observation::ValueLT(Box::new(lhs), Box::new(rhs))
    }

    pub fn value_le(lhs: Value, rhs: Value) -> Self {
        Observation::ValueLE(Box::new(lhs), Box::new(rhs))
    }

    pub fn value_eq(lhs: Value, rhs: Value) -> Self {
        Observation::ValueEQ(Box::new(lhs), Box::new(rhs))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Observation::AndObs(..) => "AndObs",
            Observation::OrObs(..) => "OrObs",
            Observation::NotObs(_) => "NotObs",
            Observation::ChoseSomething(_) => "ChoseSomething",
            Observation::ValueGE(..) => "ValueGE",
            Observation::ValueGT(..) => "ValueGT",
            Observation::ValueLT(..) => "ValueLT",
            Observation::ValueLE(..) => "ValueLE",
            Observation::ValueEQ(..) => "ValueEQ",
            Observation::TrueObs => "TrueObs",
            Observation::FalseObs => "FalseObs",
        }
    }
}

impl From<bool> for Observation {
    fn from(b: bool) -> Self {
        if b {
            Observation::TrueObs
        } else {
            Observation::FalseObs
        }
    }
}

// ──────────────────────────────────────────────
// Actions and inputs
// ──────────────────────────────────────────────

/// An external input a `When` case is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// `party` deposits `value` of `asset` into the `into` account.
    Deposit {
        into: AccountId,
        party: Party,
        asset: Asset,
        value: Value,
    },
    /// A choice for `id`, accepted if it lies in any of `bounds`.
    Choice { id: ChoiceId, bounds: Vec<Bound> },
    /// Matches when the observation is true.
    Notify(Observation),
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Deposit { .. } => "Deposit",
            Action::Choice { .. } => "Choice",
            Action::Notify(_) => "Notify",
        }
    }
}

/// The evaluated counterpart of an [`Action`], carried by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Input {
    IDeposit {
        into: AccountId,
        party: Party,
        asset: Asset,
        amount: Integer,
    },
    IChoice {
        id: ChoiceId,
        chosen: Integer,
    },
    INotify,
}

impl Input {
    pub fn kind(&self) -> &'static str {
        match self {
            Input::IDeposit { .. } => "IDeposit",
            Input::IChoice { .. } => "IChoice",
            Input::INotify => "INotify",
        }
    }
}

// ──────────────────────────────────────────────
// Contracts
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Case {
    pub action: Action,
    pub then: Contract,
}

impl Case {
    pub fn new(action: Action, then: Contract) -> Self {
        Case { action, then }
    }
}

/// Root of every document. `Close` is the only terminal variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Contract {
    Close,
    Pay {
        from: AccountId,
        to: Payee,
        asset: Asset,
        value: Value,
        then: Box<Contract>,
    },
    If {
        condition: Observation,
        then: Box<Contract>,
        otherwise: Box<Contract>,
    },
    When {
        cases: Vec<Case>,
        timeout: Timeout,
        timeout_continuation: Box<Contract>,
    },
    Let {
        name: ValueId,
        value: Value,
        then: Box<Contract>,
    },
    Assert {
        condition: Observation,
        then: Box<Contract>,
    },
}

impl Contract {
    pub fn pay(from: AccountId, to: Payee, asset: Asset, value: Value, then: Contract) -> Self {
        Contract::Pay {
            from,
            to,
            asset,
            value,
            then: Box::new(then),
        }
    }

    pub fn if_then_else(condition: Observation, then: Contract, otherwise: Contract) -> Self {
        Contract::If {
            condition,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn when(cases: Vec<Case>, timeout: Timeout, timeout_continuation: Contract) -> Self {
        Contract::When {
            cases,
            timeout,
            timeout_continuation: Box::new(timeout_continuation),
        }
    }

    pub fn let_value(name: impl Into<ValueId>, value: Value, then: Contract) -> Self {
        Contract::Let {
            name: name.into(),
            value,
            then: Box::new(then),
        }
    }

    pub fn assert_that(condition: Observation, then: Contract) -> Self {
        Contract::Assert {
            condition,
            then: Box::new(then),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Contract::Close => "Close",
            Contract::Pay { .. } => "Pay",
            Contract::If { .. } => "If",
            Contract::When { .. } => "When",
            Contract::Let { .. } => "Let",
            Contract::Assert { .. } => "Assert",
        }
    }

    /// Direct child contracts in field order. For `When`, the case
    /// continuations come before the timeout continuation.
    pub fn continuations(&self) -> Vec<&Contract> {
        match self {
            Contract::Close => Vec::new(),
            Contract::Pay { then, .. }
            | Contract::Let { then, .. }
            | Contract::Assert { then, .. } => vec![then.as_ref()],
            Contract::If {
                then, otherwise, ..
            } => vec![then.as_ref(), otherwise.as_ref()],
            Contract::When {
                cases,
                timeout_continuation,
                ..
            } => cases
                .iter()
                .map(|c| &c.then)
                .chain(std::iter::once(timeout_continuation.as_ref()))
                .collect(),
        }
    }
}
