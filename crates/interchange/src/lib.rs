//! marlowe-interchange: canonical JSON encoding of Marlowe contracts.
//!
//! Every node of the contract algebra has exactly one canonical JSON form
//! (the wire format shared with other Marlowe tooling). [`serialize`]
//! produces it, [`deserialize`] accepts it back, and the [`Canonical`]
//! trait ties the two together per type.
//!
//! Field order inside emitted objects is fixed, and integers are written
//! as bare JSON numbers of any size, so `serde_json` is built with the
//! `preserve_order` and `arbitrary_precision` features.

pub mod deserialize;
pub mod serialize;

pub use deserialize::{
    decode_action, decode_asset, decode_bound, decode_case, decode_choice_id, decode_contract,
    decode_input, decode_observation, decode_party, decode_payee, decode_state, decode_value,
    DecodeError,
};
pub use serialize::{
    encode_action, encode_asset, encode_bound, encode_case, encode_choice_id, encode_contract,
    encode_input, encode_observation, encode_party, encode_payee, encode_state, encode_value,
};

use marlowe_core::{
    Action, Asset, Bound, Case, ChoiceId, Contract, Input, Observation, Party, Payee, State, Value,
};
use serde_json::Value as Json;

/// A type with a canonical JSON form.
///
/// `T::decode(&t.encode())` returns a value equal to `t`.
pub trait Canonical: Sized {
    fn encode(&self) -> Json;
    fn decode(doc: &Json) -> Result<Self, DecodeError>;
}

macro_rules! canonical {
    ($($ty:ty => $encode:ident, $decode:ident;)*) => {
        $(
            impl Canonical for $ty {
                fn encode(&self) -> Json {
                    $encode(self)
                }

                fn decode(doc: &Json) -> Result<Self, DecodeError> {
                    $decode(doc)
                }
            }
        )*
    };
}

canonical! {
    Contract => encode_contract, decode_contract;
    Case => encode_case, decode_case;
    Action => encode_action, decode_action;
    Input => encode_input, decode_input;
    Value => encode_value, decode_value;
    Observation => encode_observation, decode_observation;
    Party => encode_party, decode_party;
    Payee => encode_payee, decode_payee;
    Asset => encode_asset, decode_asset;
    ChoiceId => encode_choice_id, decode_choice_id;
    Bound => encode_bound, decode_bound;
    State => encode_state, decode_state;
}

/// Compact canonical text of `node`.
pub fn to_canonical_string<T: Canonical>(node: &T) -> String {
    node.encode().to_string()
}

/// Parse canonical text back into a node.
pub fn from_canonical_str<T: Canonical>(text: &str) -> Result<T, DecodeError> {
    let doc: Json = serde_json::from_str(text).map_err(|e| DecodeError::Json(e.to_string()))?;
    T::decode(&doc)
}
