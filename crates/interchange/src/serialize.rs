//! Encoding of the contract algebra into canonical JSON.
//!
//! Encoding is total. Recursive variants become objects whose keys appear
//! in declared field order; nullary variants become bare strings or
//! booleans. Integers are written as bare numerals of any length.

use marlowe_core::{
    Action, Asset, Bound, Case, ChoiceId, Contract, Input, Integer, Observation, Party, Payee,
    State, Value,
};
use num_bigint::BigUint;
use serde_json::{json, Number, Value as Json};

pub fn encode_contract(contract: &Contract) -> Json {
    match contract {
        Contract::Close => json!("close"),
        Contract::Pay {
            from,
            to,
            asset,
            value,
            then,
        } => json!({
            "from_account": encode_party(from),
            "to": encode_payee(to),
            "token": encode_asset(asset),
            "pay": encode_value(value),
            "then": encode_contract(then),
        }),
        Contract::If {
            condition,
            then,
            otherwise,
        } => json!({
            "if": encode_observation(condition),
            "then": encode_contract(then),
            "else": encode_contract(otherwise),
        }),
        Contract::When {
            cases,
            timeout,
            timeout_continuation,
        } => json!({
            "when": cases.iter().map(encode_case).collect::<Vec<_>>(),
            "timeout": timeout,
            "timeout_continuation": encode_contract(timeout_continuation),
        }),
        Contract::Let { name, value, then } => json!({
            "let": name.as_str(),
            "be": encode_value(value),
            "then": encode_contract(then),
        }),
        Contract::Assert { condition, then } => json!({
            "assert": encode_observation(condition),
            "then": encode_contract(then),
        }),
    }
}

pub fn encode_case(case: &Case) -> Json {
    json!({
        "case": encode_action(&case.action),
        "then": encode_contract(&case.then),
    })
}

pub fn encode_action(action: &Action) -> Json {
    match action {
        Action::Deposit {
            into,
            party,
            asset,
            value,
        } => json!({
            "into_account": encode_party(into),
            "party": encode_party(party),
            "of_token": encode_asset(asset),
            "deposits": encode_value(value),
        }),
        Action::Choice { id, bounds } => json!({
            "for_choice": encode_choice_id(id),
            "choose_between": bounds.iter().map(encode_bound).collect::<Vec<_>>(),
        }),
        Action::Notify(obs) => json!({ "notify_if": encode_observation(obs) }),
    }
}

pub fn encode_input(input: &Input) -> Json {
    match input {
        Input::IDeposit {
            into,
            party,
            asset,
            amount,
        } => json!({
            "into_account": encode_party(into),
            "input_from_party": encode_party(party),
            "of_token": encode_asset(asset),
            "that_deposits": encode_integer(amount),
        }),
        Input::IChoice { id, chosen } => json!({
            "for_choice_id": encode_choice_id(id),
            "input_that_chooses_num": encode_integer(chosen),
        }),
        Input::INotify => json!("input_notify"),
    }
}

pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::AvailableMoney { asset, account } => json!({
            "amount_of_token": encode_asset(asset),
            "in_account": encode_party(account),
        }),
        Value::Constant(n) => encode_integer(n),
        Value::NegValue(v) => json!({ "negate": encode_value(v) }),
        Value::AddValue(a, b) => json!({ "add": encode_value(a), "and": encode_value(b) }),
        // "value" is the wire name of the subtrahend, shared with comparisons.
        Value::SubValue(a, b) => json!({ "minus": encode_value(a), "value": encode_value(b) }),
        Value::MulValue(a, b) => json!({ "multiply": encode_value(a), "times": encode_value(b) }),
        Value::DivValue(a, b) => json!({ "divide": encode_value(a), "by": encode_value(b) }),
        Value::ChoiceValue(id) => json!({ "value_of_choice": encode_choice_id(id) }),
        Value::TimeIntervalStart => json!("time_interval_start"),
        Value::TimeIntervalEnd => json!("time_interval_end"),
        Value::UseValue(name) => json!({ "use_value": name.as_str() }),
        Value::Cond(obs, a, b) => json!({
            "if": encode_observation(obs),
            "then": encode_value(a),
            "else": encode_value(b),
        }),
    }
}

pub fn encode_observation(obs: &Observation) -> Json {
    let compare = |a: &Value, key: &str, b: &Value| {
        let mut map = serde_json::Map::new();
        map.insert("value".to_owned(), encode_value(a));
        map.insert(key.to_owned(), encode_value(b));
        Json::Object(map)
    };
    match obs {
        Observation::AndObs(a, b) => json!({
            "both": encode_observation(a),
            "and": encode_observation(b),
        }),
        Observation::OrObs(a, b) => json!({
            "either": encode_observation(a),
            "or": encode_observation(b),
        }),
        Observation::NotObs(o) => json!({ "not": encode_observation(o) }),
        Observation::ChoseSomething(id) => json!({ "chose_something_for": encode_choice_id(id) }),
        Observation::ValueGE(a, b) => compare(a, "ge_than", b),
        Observation::ValueGT(a, b) => compare(a, "gt", b),
        Observation::ValueLT(a, b) => compare(a, "lt", b),
        Observation::ValueLE(a, b) => compare(a, "le_than", b),
        Observation::ValueEQ(a, b) => compare(a, "equal_to", b),
        Observation::TrueObs => json!(true),
        Observation::FalseObs => json!(false),
    }
}

pub fn encode_party(party: &Party) -> Json {
    match party {
        Party::Address(address) => json!({ "address": address }),
        Party::Role(name) => json!({ "role_token": name }),
    }
}

pub fn encode_payee(payee: &Payee) -> Json {
    match payee {
        Payee::Account(account) => json!({ "account": encode_party(account) }),
        // Capitalized on the wire, as observed in deployed documents.
        Payee::Party(party) => json!({ "Party": encode_party(party) }),
    }
}

pub fn encode_asset(asset: &Asset) -> Json {
    json!({
        "currency_symbol": asset.currency_symbol,
        "token_name": asset.token_name,
    })
}

pub fn encode_choice_id(id: &ChoiceId) -> Json {
    json!({
        "choice_name": id.name,
        "choice_owner": encode_party(&id.owner),
    })
}

/// `"from"` carries the upper bound and `"to"` the lower one.
pub fn encode_bound(bound: &Bound) -> Json {
    json!({ "from": bound.upper, "to": bound.lower })
}

pub fn encode_integer(n: &Integer) -> Json {
    numeral(n.to_string())
}

pub fn encode_natural(n: &BigUint) -> Json {
    numeral(n.to_string())
}

fn numeral(digits: String) -> Json {
    // Invariant: `digits` is the Display form of a BigInt or BigUint, so it
    // matches `-?(0|[1-9][0-9]*)` and always parses as a JSON number. With
    // arbitrary_precision the parsed Number keeps the digits verbatim.
    let number: Number = digits
        .parse()
        .expect("decimal rendering of an integer is a valid JSON number");
    Json::Number(number)
}

/// Snapshot of a [`State`]. Map entries are written in ascending key order.
pub fn encode_state(state: &State) -> Json {
    let accounts: Vec<Json> = state
        .accounts
        .iter()
        .map(|(account, balance)| {
            json!([
                [encode_party(&account.account_id), encode_asset(&account.asset)],
                encode_natural(balance),
            ])
        })
        .collect();
    let choices: Vec<Json> = state
        .choices
        .iter()
        .map(|(id, n)| json!([encode_choice_id(id), encode_integer(n)]))
        .collect();
    let bound_values: Vec<Json> = state
        .bound_values
        .iter()
        .map(|(name, n)| json!([name.as_str(), encode_integer(n)]))
        .collect();
    json!({
        "accounts": accounts,
        "choices": choices,
        "boundValues": bound_values,
        "minTime": state.min_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlowe_core::ValueId;

    fn let_wrapped(v: Value) -> String {
        encode_contract(&Contract::let_value("testValue", v, Contract::Close)).to_string()
    }

    fn if_wrapped(o: Observation) -> String {
        encode_contract(&Contract::if_then_else(o, Contract::Close, Contract::Close)).to_string()
    }

    fn c(n: i64) -> Value {
        Value::constant(n)
    }

    #[test]
    fn close_is_a_bare_string() {
        assert_eq!(encode_contract(&Contract::Close).to_string(), r#""close""#);
    }

    #[test]
    fn let_contract() {
        let contract = Contract::let_value("Number", c(1), Contract::Close);
        assert_eq!(
            encode_contract(&contract).to_string(),
            r#"{"let":"Number","be":1,"then":"close"}"#
        );
    }

    #[test]
    fn if_and_assert_contracts() {
        let contract =
            Contract::if_then_else(Observation::value_gt(c(1), c(0)), Contract::Close, Contract::Close);
        assert_eq!(
            encode_contract(&contract).to_string(),
            r#"{"if":{"value":1,"gt":0},"then":"close","else":"close"}"#
        );

        let contract = Contract::assert_that(Observation::value_lt(c(0), c(1)), Contract::Close);
        assert_eq!(
            encode_contract(&contract).to_string(),
            r#"{"assert":{"value":0,"lt":1},"then":"close"}"#
        );
    }

    #[test]
    fn pay_contract() {
        let contract = Contract::pay(
            Party::role("debtor"),
            Payee::Party(Party::role("creditor")),
            Asset::native(),
            c(5_000_000),
            Contract::Close,
        );
        assert_eq!(
            encode_contract(&contract).to_string(),
            r#"{"from_account":{"role_token":"debtor"},"to":{"Party":{"role_token":"creditor"}},"token":{"currency_symbol":"","token_name":""},"pay":5000000,"then":"close"}"#
        );
    }

    #[test]
    fn when_contract_with_choice() {
        let contract = Contract::when(
            vec![Case::new(
                Action::Choice {
                    id: ChoiceId::new("option", Party::role("creditor")),
                    bounds: vec![Bound::new(3, 2)],
                },
                Contract::Close,
            )],
            1_666_078_977_926,
            Contract::Close,
        );
        assert_eq!(
            encode_contract(&contract).to_string(),
            r#"{"when":[{"case":{"for_choice":{"choice_name":"option","choice_owner":{"role_token":"creditor"}},"choose_between":[{"from":3,"to":2}]},"then":"close"}],"timeout":1666078977926,"timeout_continuation":"close"}"#
        );
    }

    #[test]
    fn deposit_and_notify_actions() {
        let deposit = Action::Deposit {
            into: Party::role("seller"),
            party: Party::role("buyer"),
            asset: Asset::native(),
            value: c(50_000_000),
        };
        assert_eq!(
            encode_action(&deposit).to_string(),
            r#"{"into_account":{"role_token":"seller"},"party":{"role_token":"buyer"},"of_token":{"currency_symbol":"","token_name":""},"deposits":50000000}"#
        );

        let notify = Action::Notify(Observation::value_gt(Value::use_value("val"), c(10)));
        assert_eq!(
            encode_action(&notify).to_string(),
            r#"{"notify_if":{"value":{"use_value":"val"},"gt":10}}"#
        );
    }

    #[test]
    fn value_shapes() {
        let owner = Party::role("buyer");
        assert_eq!(
            let_wrapped(Value::available_money(Asset::native(), Party::role("seller"))),
            r#"{"let":"testValue","be":{"amount_of_token":{"currency_symbol":"","token_name":""},"in_account":{"role_token":"seller"}},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::ChoiceValue(ChoiceId::new("name", owner))),
            r#"{"let":"testValue","be":{"value_of_choice":{"choice_name":"name","choice_owner":{"role_token":"buyer"}}},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::UseValue(ValueId::from("value"))),
            r#"{"let":"testValue","be":{"use_value":"value"},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::TimeIntervalStart),
            r#"{"let":"testValue","be":"time_interval_start","then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::TimeIntervalEnd),
            r#"{"let":"testValue","be":"time_interval_end","then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::neg_value(c(20))),
            r#"{"let":"testValue","be":{"negate":20},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::add_value(c(10), c(20))),
            r#"{"let":"testValue","be":{"add":10,"and":20},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::mul_value(c(10), c(20))),
            r#"{"let":"testValue","be":{"multiply":10,"times":20},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::sub_value(c(10), c(20))),
            r#"{"let":"testValue","be":{"minus":10,"value":20},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::div_value(c(20), c(10))),
            r#"{"let":"testValue","be":{"divide":20,"by":10},"then":"close"}"#
        );
        assert_eq!(
            let_wrapped(Value::cond(Observation::TrueObs, c(1), c(2))),
            r#"{"let":"testValue","be":{"if":true,"then":1,"else":2},"then":"close"}"#
        );
    }

    #[test]
    fn comparison_keys() {
        let cases = [
            (Observation::value_ge(c(10), c(20)), "ge_than"),
            (Observation::value_gt(c(10), c(20)), "gt"),
            (Observation::value_lt(c(10), c(20)), "lt"),
            (Observation::value_le(c(10), c(20)), "le_than"),
            (Observation::value_eq(c(10), c(20)), "equal_to"),
        ];
        for (obs, key) in cases {
            assert_eq!(
                if_wrapped(obs),
                format!(r#"{{"if":{{"value":10,"{key}":20}},"then":"close","else":"close"}}"#)
            );
        }
    }

    #[test]
    fn logical_observations() {
        let eq = || Observation::value_eq(c(10), c(20));
        assert_eq!(
            if_wrapped(Observation::not_obs(eq())),
            r#"{"if":{"not":{"value":10,"equal_to":20}},"then":"close","else":"close"}"#
        );
        assert_eq!(
            if_wrapped(Observation::and_obs(eq(), eq())),
            r#"{"if":{"both":{"value":10,"equal_to":20},"and":{"value":10,"equal_to":20}},"then":"close","else":"close"}"#
        );
        assert_eq!(
            if_wrapped(Observation::or_obs(eq(), eq())),
            r#"{"if":{"either":{"value":10,"equal_to":20},"or":{"value":10,"equal_to":20}},"then":"close","else":"close"}"#
        );
        assert_eq!(
            if_wrapped(Observation::ChoseSomething(ChoiceId::new("name", Party::role("role")))),
            r#"{"if":{"chose_something_for":{"choice_name":"name","choice_owner":{"role_token":"role"}}},"then":"close","else":"close"}"#
        );
        assert_eq!(
            if_wrapped(Observation::TrueObs),
            r#"{"if":true,"then":"close","else":"close"}"#
        );
        assert_eq!(
            if_wrapped(Observation::FalseObs),
            r#"{"if":false,"then":"close","else":"close"}"#
        );
    }

    #[test]
    fn huge_constants_stay_bare_numerals() {
        let n: Integer = "-98765432109876543210987654321".parse().unwrap();
        assert_eq!(
            encode_value(&Value::Constant(n)).to_string(),
            "-98765432109876543210987654321"
        );
    }

    #[test]
    fn inputs() {
        let deposit = Input::IDeposit {
            into: Party::role("seller"),
            party: Party::address("addr_test1qz"),
            asset: Asset::new("85bb65", "dollar"),
            amount: Integer::from(100),
        };
        assert_eq!(
            encode_input(&deposit).to_string(),
            r#"{"into_account":{"role_token":"seller"},"input_from_party":{"address":"addr_test1qz"},"of_token":{"currency_symbol":"85bb65","token_name":"dollar"},"that_deposits":100}"#
        );
        let choice = Input::IChoice {
            id: ChoiceId::new("option", Party::role("creditor")),
            chosen: Integer::from(2),
        };
        assert_eq!(
            encode_input(&choice).to_string(),
            r#"{"for_choice_id":{"choice_name":"option","choice_owner":{"role_token":"creditor"}},"input_that_chooses_num":2}"#
        );
        assert_eq!(encode_input(&Input::INotify).to_string(), r#""input_notify""#);
    }

    #[test]
    fn account_payee() {
        assert_eq!(
            encode_payee(&Payee::Account(Party::role("escrow"))).to_string(),
            r#"{"account":{"role_token":"escrow"}}"#
        );
    }

    #[test]
    fn state_snapshot_is_sorted() {
        use marlowe_core::Account;

        let mut state = State::new(1_666_000_000_000);
        state.accounts.insert(
            Account::new(Party::role("zed"), Asset::native()),
            BigUint::from(7u32),
        );
        state.accounts.insert(
            Account::new(Party::role("amy"), Asset::native()),
            BigUint::from(5u32),
        );
        state.bound_values.insert(ValueId::from("x"), Integer::from(-3));
        assert_eq!(
            encode_state(&state).to_string(),
            r#"{"accounts":[[[{"role_token":"amy"},{"currency_symbol":"","token_name":""}],5],[[{"role_token":"zed"},{"currency_symbol":"","token_name":""}],7]],"choices":[],"boundValues":[["x",-3]],"minTime":1666000000000}"#
        );
    }
}
