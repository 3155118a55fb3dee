//! Decoding of canonical JSON documents into the contract algebra.
//!
//! Each object variant is recognised by its leading key and must carry
//! exactly that variant's key set. Comparisons share the `"value"` key
//! and are told apart by their second key. Key order is not checked.

use std::collections::BTreeMap;

use marlowe_core::{
    Account, Action, Asset, Bound, Case, ChoiceId, Contract, Input, Integer, Observation, Party,
    Payee, State, Value, ValueId,
};
use num_bigint::BigUint;
use serde_json::{Map, Value as Json};

/// Errors while decoding a canonical document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// No variant of `context` matches the document's tag or key set.
    #[error("unknown {context}: {found}")]
    UnknownTag { context: &'static str, found: String },

    #[error("{variant}: missing field '{field}'")]
    MissingField {
        variant: &'static str,
        field: &'static str,
    },

    /// The document carries a key the variant does not declare.
    #[error("{variant}: unexpected field '{field}'")]
    UnexpectedField { variant: &'static str, field: String },

    #[error("{context}: expected {expected}, found {found}")]
    UnexpectedType {
        context: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A numeral that is not a plain base-10 integer.
    #[error("invalid integer literal '{literal}'")]
    InvalidInteger { literal: String },

    /// A well-formed integer outside the range of its field.
    #[error("{context}: integer {literal} out of range")]
    OutOfRange {
        context: &'static str,
        literal: String,
    },

    #[error("{context}: duplicate key {key}")]
    DuplicateKey { context: &'static str, key: String },

    /// The input text is not JSON at all.
    #[error("malformed JSON: {0}")]
    Json(String),
}

// ── Entry points ────────────────────────────────────────────────────

macro_rules! entry_point {
    ($(#[$meta:meta])* $name:ident, $inner:ident, $ty:ty, $what:literal) => {
        $(#[$meta])*
        pub fn $name(doc: &Json) -> Result<$ty, DecodeError> {
            $inner(doc).inspect_err(|e| tracing::debug!(error = %e, "{} decode failed", $what))
        }
    };
}

entry_point!(
    /// Decode a full contract document.
    decode_contract, contract, Contract, "contract"
);
entry_point!(decode_case, case, Case, "case");
entry_point!(decode_action, action, Action, "action");
entry_point!(decode_input, input, Input, "input");
entry_point!(decode_value, value, Value, "value");
entry_point!(decode_observation, observation, Observation, "observation");
entry_point!(decode_party, party, Party, "party");
entry_point!(decode_payee, payee, Payee, "payee");
entry_point!(decode_asset, asset, Asset, "asset");
entry_point!(decode_choice_id, choice_id, ChoiceId, "choice id");
entry_point!(decode_bound, bound, Bound, "bound");
entry_point!(
    /// Decode a state snapshot as written by `encode_state`.
    decode_state, state, State, "state"
);

// ── Field access ────────────────────────────────────────────────────

/// An object already checked to hold no keys beyond a variant's own.
struct Fields<'a> {
    variant: &'static str,
    obj: &'a Map<String, Json>,
}

impl<'a> Fields<'a> {
    fn exact(
        obj: &'a Map<String, Json>,
        variant: &'static str,
        keys: &[&'static str],
    ) -> Result<Self, DecodeError> {
        if let Some(extra) = obj.keys().find(|k| !keys.contains(&k.as_str())) {
            return Err(DecodeError::UnexpectedField {
                variant,
                field: extra.clone(),
            });
        }
        Ok(Fields { variant, obj })
    }

    fn get(&self, key: &'static str) -> Result<&'a Json, DecodeError> {
        self.obj.get(key).ok_or(DecodeError::MissingField {
            variant: self.variant,
            field: key,
        })
    }

    fn string(&self, key: &'static str) -> Result<String, DecodeError> {
        match self.get(key)? {
            Json::String(s) => Ok(s.clone()),
            other => Err(unexpected(self.variant, "a string", other)),
        }
    }

    fn array(&self, key: &'static str) -> Result<&'a Vec<Json>, DecodeError> {
        match self.get(key)? {
            Json::Array(items) => Ok(items),
            other => Err(unexpected(self.variant, "an array", other)),
        }
    }

    fn contract(&self, key: &'static str) -> Result<Box<Contract>, DecodeError> {
        contract(self.get(key)?).map(Box::new)
    }

    fn value(&self, key: &'static str) -> Result<Box<Value>, DecodeError> {
        value(self.get(key)?).map(Box::new)
    }

    fn observation(&self, key: &'static str) -> Result<Box<Observation>, DecodeError> {
        observation(self.get(key)?).map(Box::new)
    }

    fn party(&self, key: &'static str) -> Result<Party, DecodeError> {
        party(self.get(key)?)
    }

    fn asset(&self, key: &'static str) -> Result<Asset, DecodeError> {
        asset(self.get(key)?)
    }

    fn choice_id(&self, key: &'static str) -> Result<ChoiceId, DecodeError> {
        choice_id(self.get(key)?)
    }

    fn integer(&self, key: &'static str) -> Result<Integer, DecodeError> {
        integer(self.get(key)?, self.variant)
    }

    fn u64(&self, key: &'static str) -> Result<u64, DecodeError> {
        bounded(self.get(key)?, self.variant)
    }

    fn i64(&self, key: &'static str) -> Result<i64, DecodeError> {
        bounded(self.get(key)?, self.variant)
    }
}

/// Short description of a document for error messages.
fn describe(doc: &Json) -> String {
    match doc {
        Json::Null => "null".to_owned(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => format!("number {}", n),
        Json::String(s) => format!("string {:?}", s),
        Json::Array(items) => format!("array of {}", items.len()),
        Json::Object(obj) => {
            let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            format!("object {{{}}}", keys.join(", "))
        }
    }
}

fn unexpected(context: &'static str, expected: &'static str, found: &Json) -> DecodeError {
    DecodeError::UnexpectedType {
        context,
        expected,
        found: describe(found),
    }
}

fn unknown(context: &'static str, found: &Json) -> DecodeError {
    DecodeError::UnknownTag {
        context,
        found: describe(found),
    }
}

fn object<'a>(doc: &'a Json, context: &'static str) -> Result<&'a Map<String, Json>, DecodeError> {
    doc.as_object()
        .ok_or_else(|| unexpected(context, "an object", doc))
}

/// First of `tags` present in `obj`.
fn tag_of(obj: &Map<String, Json>, tags: &[&'static str]) -> Option<&'static str> {
    tags.iter().copied().find(|t| obj.contains_key(*t))
}

fn pair<'a>(doc: &'a Json, context: &'static str) -> Result<(&'a Json, &'a Json), DecodeError> {
    match doc.as_array().map(Vec::as_slice) {
        Some([a, b]) => Ok((a, b)),
        _ => Err(unexpected(context, "a two-element array", doc)),
    }
}

// ── Numbers ─────────────────────────────────────────────────────────

/// Accepts only numerals the encoder could have written: no fraction,
/// exponent, leading zero or signed zero. `literal` is the numeral as written.
fn numeral(literal: &str) -> Result<&str, DecodeError> {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && !(negative && digits == "0");
    if !canonical {
        return Err(DecodeError::InvalidInteger {
            literal: literal.to_owned(),
        });
    }
    Ok(literal)
}

fn integer(doc: &Json, context: &'static str) -> Result<Integer, DecodeError> {
    let Json::Number(n) = doc else {
        return Err(unexpected(context, "an integer", doc));
    };
    let literal = n.to_string();
    numeral(&literal)?
        .parse()
        .map_err(|_| DecodeError::InvalidInteger {
            literal: literal.clone(),
        })
}

fn natural(doc: &Json, context: &'static str) -> Result<BigUint, DecodeError> {
    integer(doc, context)?
        .to_biguint()
        .ok_or_else(|| DecodeError::OutOfRange {
            context,
            literal: describe(doc),
        })
}

fn bounded<T: TryFrom<Integer>>(doc: &Json, context: &'static str) -> Result<T, DecodeError> {
    let n = integer(doc, context)?;
    let literal = n.to_string();
    T::try_from(n).map_err(|_| DecodeError::OutOfRange { context, literal })
}

// ── Contracts ───────────────────────────────────────────────────────

const CONTRACT_TAGS: &[&str] = &["let", "if", "assert", "from_account", "when"];

fn contract(doc: &Json) -> Result<Contract, DecodeError> {
    let obj = match doc {
        Json::String(s) if s == "close" => return Ok(Contract::Close),
        Json::Object(obj) => obj,
        other => return Err(unknown("contract", other)),
    };
    match tag_of(obj, CONTRACT_TAGS) {
        Some("let") => {
            let f = Fields::exact(obj, "Let", &["let", "be", "then"])?;
            Ok(Contract::Let {
                name: ValueId(f.string("let")?),
                value: *f.value("be")?,
                then: f.contract("then")?,
            })
        }
        Some("if") => {
            let f = Fields::exact(obj, "If", &["if", "then", "else"])?;
            Ok(Contract::If {
                condition: *f.observation("if")?,
                then: f.contract("then")?,
                otherwise: f.contract("else")?,
            })
        }
        Some("assert") => {
            let f = Fields::exact(obj, "Assert", &["assert", "then"])?;
            Ok(Contract::Assert {
                condition: *f.observation("assert")?,
                then: f.contract("then")?,
            })
        }
        Some("from_account") => {
            let f = Fields::exact(obj, "Pay", &["from_account", "to", "token", "pay", "then"])?;
            Ok(Contract::Pay {
                from: f.party("from_account")?,
                to: payee(f.get("to")?)?,
                asset: f.asset("token")?,
                value: *f.value("pay")?,
                then: f.contract("then")?,
            })
        }
        Some("when") => {
            let f = Fields::exact(obj, "When", &["when", "timeout", "timeout_continuation"])?;
            let cases = f
                .array("when")?
                .iter()
                .map(case)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Contract::When {
                cases,
                timeout: f.i64("timeout")?,
                timeout_continuation: f.contract("timeout_continuation")?,
            })
        }
        _ => Err(unknown("contract", doc)),
    }
}

fn case(doc: &Json) -> Result<Case, DecodeError> {
    let f = Fields::exact(object(doc, "Case")?, "Case", &["case", "then"])?;
    Ok(Case {
        action: action(f.get("case")?)?,
        then: *f.contract("then")?,
    })
}

// ── Actions and inputs ──────────────────────────────────────────────

fn action(doc: &Json) -> Result<Action, DecodeError> {
    let obj = object(doc, "action")?;
    match tag_of(obj, &["into_account", "for_choice", "notify_if"]) {
        Some("into_account") => {
            let f = Fields::exact(
                obj,
                "Deposit",
                &["into_account", "party", "of_token", "deposits"],
            )?;
            Ok(Action::Deposit {
                into: f.party("into_account")?,
                party: f.party("party")?,
                asset: f.asset("of_token")?,
                value: *f.value("deposits")?,
            })
        }
        Some("for_choice") => {
            let f = Fields::exact(obj, "Choice", &["for_choice", "choose_between"])?;
            let bounds = f
                .array("choose_between")?
                .iter()
                .map(bound)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Action::Choice {
                id: f.choice_id("for_choice")?,
                bounds,
            })
        }
        Some("notify_if") => {
            let f = Fields::exact(obj, "Notify", &["notify_if"])?;
            Ok(Action::Notify(*f.observation("notify_if")?))
        }
        _ => Err(unknown("action", doc)),
    }
}

fn input(doc: &Json) -> Result<Input, DecodeError> {
    let obj = match doc {
        Json::String(s) if s == "input_notify" => return Ok(Input::INotify),
        Json::Object(obj) => obj,
        other => return Err(unknown("input", other)),
    };
    match tag_of(obj, &["input_from_party", "for_choice_id"]) {
        Some("input_from_party") => {
            let f = Fields::exact(
                obj,
                "IDeposit",
                &["into_account", "input_from_party", "of_token", "that_deposits"],
            )?;
            Ok(Input::IDeposit {
                into: f.party("into_account")?,
                party: f.party("input_from_party")?,
                asset: f.asset("of_token")?,
                amount: f.integer("that_deposits")?,
            })
        }
        Some("for_choice_id") => {
            let f = Fields::exact(obj, "IChoice", &["for_choice_id", "input_that_chooses_num"])?;
            Ok(Input::IChoice {
                id: f.choice_id("for_choice_id")?,
                chosen: f.integer("input_that_chooses_num")?,
            })
        }
        _ => Err(unknown("input", doc)),
    }
}

// ── Values and observations ─────────────────────────────────────────

const VALUE_TAGS: &[&str] = &[
    "amount_of_token",
    "value_of_choice",
    "use_value",
    "negate",
    "add",
    "minus",
    "multiply",
    "divide",
    "if",
];

fn value(doc: &Json) -> Result<Value, DecodeError> {
    let obj = match doc {
        Json::Number(_) => return integer(doc, "Constant").map(Value::Constant),
        Json::String(s) if s == "time_interval_start" => return Ok(Value::TimeIntervalStart),
        Json::String(s) if s == "time_interval_end" => return Ok(Value::TimeIntervalEnd),
        Json::Object(obj) => obj,
        other => return Err(unknown("value", other)),
    };
    let binary = |variant: &'static str,
                  lhs: &'static str,
                  rhs: &'static str,
                  build: fn(Box<Value>, Box<Value>) -> Value|
     -> Result<Value, DecodeError> {
        let f = Fields::exact(obj, variant, &[lhs, rhs])?;
        Ok(build(f.value(lhs)?, f.value(rhs)?))
    };
    match tag_of(obj, VALUE_TAGS) {
        Some("amount_of_token") => {
            let f = Fields::exact(obj, "AvailableMoney", &["amount_of_token", "in_account"])?;
            Ok(Value::AvailableMoney {
                asset: f.asset("amount_of_token")?,
                account: f.party("in_account")?,
            })
        }
        Some("value_of_choice") => {
            let f = Fields::exact(obj, "ChoiceValue", &["value_of_choice"])?;
            Ok(Value::ChoiceValue(f.choice_id("value_of_choice")?))
        }
        Some("use_value") => {
            let f = Fields::exact(obj, "UseValue", &["use_value"])?;
            Ok(Value::UseValue(ValueId(f.string("use_value")?)))
        }
        Some("negate") => {
            let f = Fields::exact(obj, "NegValue", &["negate"])?;
            Ok(Value::NegValue(f.value("negate")?))
        }
        Some("add") => binary("AddValue", "add", "and", Value::AddValue),
        Some("minus") => binary("SubValue", "minus", "value", Value::SubValue),
        Some("multiply") => binary("MulValue", "multiply", "times", Value::MulValue),
        Some("divide") => binary("DivValue", "divide", "by", Value::DivValue),
        Some("if") => {
            let f = Fields::exact(obj, "Cond", &["if", "then", "else"])?;
            Ok(Value::Cond(
                f.observation("if")?,
                f.value("then")?,
                f.value("else")?,
            ))
        }
        _ => Err(unknown("value", doc)),
    }
}

type Comparison = fn(Box<Value>, Box<Value>) -> Observation;

/// Second key of a `{"value": a, K: b}` comparison, and what it builds.
const COMPARISONS: &[(&str, &str, Comparison)] = &[
    ("ge_than", "ValueGE", Observation::ValueGE),
    ("gt", "ValueGT", Observation::ValueGT),
    ("lt", "ValueLT", Observation::ValueLT),
    ("le_than", "ValueLE", Observation::ValueLE),
    ("equal_to", "ValueEQ", Observation::ValueEQ),
];

fn observation(doc: &Json) -> Result<Observation, DecodeError> {
    let obj = match doc {
        Json::Bool(true) => return Ok(Observation::TrueObs),
        Json::Bool(false) => return Ok(Observation::FalseObs),
        Json::Object(obj) => obj,
        other => return Err(unknown("observation", other)),
    };
    match tag_of(obj, &["both", "either", "not", "chose_something_for", "value"]) {
        Some("both") => {
            let f = Fields::exact(obj, "AndObs", &["both", "and"])?;
            Ok(Observation::AndObs(f.observation("both")?, f.observation("and")?))
        }
        Some("either") => {
            let f = Fields::exact(obj, "OrObs", &["either", "or"])?;
            Ok(Observation::OrObs(f.observation("either")?, f.observation("or")?))
        }
        Some("not") => {
            let f = Fields::exact(obj, "NotObs", &["not"])?;
            Ok(Observation::NotObs(f.observation("not")?))
        }
        Some("chose_something_for") => {
            let f = Fields::exact(obj, "ChoseSomething", &["chose_something_for"])?;
            Ok(Observation::ChoseSomething(f.choice_id("chose_something_for")?))
        }
        Some("value") => {
            let Some(&(key, variant, build)) =
                COMPARISONS.iter().find(|(key, _, _)| obj.contains_key(*key))
            else {
                return Err(unknown("observation", doc));
            };
            let f = Fields::exact(obj, variant, &["value", key])?;
            Ok(build(f.value("value")?, f.value(key)?))
        }
        _ => Err(unknown("observation", doc)),
    }
}

// ── Leaves ──────────────────────────────────────────────────────────

fn party(doc: &Json) -> Result<Party, DecodeError> {
    let obj = object(doc, "party")?;
    match tag_of(obj, &["role_token", "address"]) {
        Some("role_token") => {
            let f = Fields::exact(obj, "Role", &["role_token"])?;
            Ok(Party::Role(f.string("role_token")?))
        }
        Some("address") => {
            let f = Fields::exact(obj, "Address", &["address"])?;
            Ok(Party::Address(f.string("address")?))
        }
        _ => Err(unknown("party", doc)),
    }
}

fn payee(doc: &Json) -> Result<Payee, DecodeError> {
    let obj = object(doc, "payee")?;
    match tag_of(obj, &["Party", "account"]) {
        Some("Party") => {
            let f = Fields::exact(obj, "Party", &["Party"])?;
            Ok(Payee::Party(f.party("Party")?))
        }
        Some("account") => {
            let f = Fields::exact(obj, "Account", &["account"])?;
            Ok(Payee::Account(f.party("account")?))
        }
        _ => Err(unknown("payee", doc)),
    }
}

fn asset(doc: &Json) -> Result<Asset, DecodeError> {
    let f = Fields::exact(
        object(doc, "Token")?,
        "Token",
        &["currency_symbol", "token_name"],
    )?;
    Ok(Asset {
        currency_symbol: f.string("currency_symbol")?,
        token_name: f.string("token_name")?,
    })
}

fn choice_id(doc: &Json) -> Result<ChoiceId, DecodeError> {
    let f = Fields::exact(
        object(doc, "ChoiceId")?,
        "ChoiceId",
        &["choice_name", "choice_owner"],
    )?;
    Ok(ChoiceId {
        name: f.string("choice_name")?,
        owner: f.party("choice_owner")?,
    })
}

fn bound(doc: &Json) -> Result<Bound, DecodeError> {
    let f = Fields::exact(object(doc, "Bound")?, "Bound", &["from", "to"])?;
    Ok(Bound {
        upper: f.u64("from")?,
        lower: f.u64("to")?,
    })
}

// ── State ───────────────────────────────────────────────────────────

fn state(doc: &Json) -> Result<State, DecodeError> {
    let f = Fields::exact(
        object(doc, "State")?,
        "State",
        &["accounts", "choices", "boundValues", "minTime"],
    )?;

    let mut accounts = BTreeMap::new();
    for entry in f.array("accounts")? {
        let (key, balance) = pair(entry, "accounts")?;
        let (owner, token) = pair(key, "accounts")?;
        let account = Account::new(party(owner)?, asset(token)?);
        let balance = natural(balance, "accounts")?;
        if accounts.contains_key(&account) {
            return Err(DecodeError::DuplicateKey {
                context: "accounts",
                key: describe(key),
            });
        }
        accounts.insert(account, balance);
    }

    let mut choices = BTreeMap::new();
    for entry in f.array("choices")? {
        let (id, chosen) = pair(entry, "choices")?;
        let id_key = choice_id(id)?;
        if choices.contains_key(&id_key) {
            return Err(DecodeError::DuplicateKey {
                context: "choices",
                key: describe(id),
            });
        }
        choices.insert(id_key, integer(chosen, "choices")?);
    }

    let mut bound_values = BTreeMap::new();
    for entry in f.array("boundValues")? {
        let (name, n) = pair(entry, "boundValues")?;
        let Json::String(name) = name else {
            return Err(unexpected("boundValues", "a string", name));
        };
        let name = ValueId(name.clone());
        if bound_values.contains_key(&name) {
            return Err(DecodeError::DuplicateKey {
                context: "boundValues",
                key: name.to_string(),
            });
        }
        bound_values.insert(name, integer(n, "boundValues")?);
    }

    Ok(State {
        accounts,
        choices,
        bound_values,
        min_time: f.i64("minTime")?,
    })
}
