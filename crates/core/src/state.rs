//! Passive records read by a contract evaluator.
//!
//! Nothing here mutates during evaluation; an evaluator builds a fresh
//! `State` per step. Maps are ordered so that exported snapshots are
//! canonical.

use std::collections::BTreeMap;

use num_bigint::BigUint;

use crate::ast::{Account, AccountId, Asset, ChoiceId, Integer, PosixTime, ValueId};

/// Balance of every internal account. Balances are never negative.
pub type Accounts = BTreeMap<Account, BigUint>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub accounts: Accounts,
    /// Most recent value chosen for each choice.
    pub choices: BTreeMap<ChoiceId, Integer>,
    /// Most recent value bound by `Let` for each name.
    pub bound_values: BTreeMap<ValueId, Integer>,
    /// Lower bound on the time used to refine time intervals.
    pub min_time: PosixTime,
}

impl State {
    pub fn new(min_time: PosixTime) -> Self {
        State {
            min_time,
            ..State::default()
        }
    }

    /// Balance of `asset` in the account of `account_id`, zero if absent.
    pub fn balance(&self, account_id: &AccountId, asset: &Asset) -> BigUint {
        self.accounts
            .get(&Account::new(account_id.clone(), asset.clone()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Validity window of a transaction: start exclusive, end inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: PosixTime,
    pub end: PosixTime,
}

impl TimeInterval {
    pub fn new(start: PosixTime, end: PosixTime) -> Self {
        TimeInterval { start, end }
    }

    pub fn contains(&self, t: PosixTime) -> bool {
        self.start < t && t <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    pub time_interval: TimeInterval,
}

impl Environment {
    pub fn new(time_interval: TimeInterval) -> Self {
        Environment { time_interval }
    }
}
