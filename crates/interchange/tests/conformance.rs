//! Decoding then re-encoding each conformance contract reproduces the
//! document exactly, key order included.

use std::path::Path;

use marlowe_core::Contract;
use marlowe_interchange::{from_canonical_str, to_canonical_string, Canonical};

fn conformance_contracts() -> Vec<(String, serde_json::Value)> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance/contracts");
    let mut paths: Vec<_> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "json"))
        .collect();
    paths.sort();
    paths
        .into_iter()
        .map(|p| {
            let src = std::fs::read_to_string(&p).unwrap();
            (p.display().to_string(), serde_json::from_str(&src).unwrap())
        })
        .collect()
}

#[test]
fn contracts_reencode_byte_for_byte() {
    let contracts = conformance_contracts();
    assert!(!contracts.is_empty());
    for (path, doc) in contracts {
        let contract = Contract::decode(&doc)
            .unwrap_or_else(|e| panic!("{}: failed to decode: {}", path, e));
        assert_eq!(
            to_canonical_string(&contract),
            doc.to_string(),
            "{}: re-encoding differs",
            path
        );
    }
}

#[test]
fn compact_text_round_trips() {
    for (path, doc) in conformance_contracts() {
        let text = doc.to_string();
        let contract: Contract = from_canonical_str(&text).unwrap();
        assert_eq!(contract.encode(), doc, "{}", path);
    }
}

#[test]
fn zero_coupon_bond_shape() {
    let (_, doc) = conformance_contracts()
        .into_iter()
        .find(|(p, _)| p.ends_with("zero_coupon_bond.json"))
        .unwrap();
    match Contract::decode(&doc).unwrap() {
        Contract::When {
            cases, timeout, ..
        } => {
            assert_eq!(cases.len(), 1);
            assert_eq!(timeout, 1_704_067_200_000);
            assert_eq!(cases[0].then.kind(), "Pay");
        }
        other => panic!("expected When, got {:?}", other),
    }
}
