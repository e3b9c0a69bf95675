use super::*;
use crate::{sigmap::SignatureMapBuilder, testing::keys};

fn leaf_signature(tree: &KeySignature, path: &[usize]) -> Option<Vec<u8>> {
    let mut node = tree;
    for idx in path {
        node = &node.keys()[*idx];
    }
    node.signature().map(<[u8]>::to_vec)
}

/// alice, threshold(2, [bob, alice, contract]), charlie
fn tree() -> KeySignature {
    let key = CompositeKey::list(vec![
        keys::alice::key(),
        CompositeKey::threshold(
            2,
            vec![
                keys::bob::key(),
                keys::alice::key(),
                CompositeKey::contract(ContractId::new(0, 0, 9)),
            ],
        ),
        keys::charlie::key(),
    ]);
    KeySignature::from(&key)
}

#[test]
fn test_from_composite_key() {
    let key = CompositeKey::threshold(1, vec![keys::alice::key(), keys::bob::key()])
        .with_description("policy");
    let tree = KeySignature::from(&key);

    assert_eq!(tree.uuid, key.uuid);
    assert_eq!(tree.description, "policy");
    assert_eq!(tree.keys()[1].uuid, key.keys()[1].uuid);
    assert_eq!(tree.to_wire_key(), key.to_wire());
    assert_eq!(
        tree.unsigned_keys(),
        vec![keys::alice::pk(), keys::bob::pk()]
    );
    assert!(tree.signature_pairs().is_empty());
}

#[test]
fn test_set_is_idempotent_until_update() {
    let mut tree = KeySignature::list(vec![KeySignature::ed25519(&keys::alice::pk())]);

    assert!(tree.set_signature_for_key(&keys::alice::pk(), b"sig-a", false));
    assert!(!tree.set_signature_for_key(&keys::alice::pk(), b"sig-b", false));
    assert_eq!(leaf_signature(&tree, &[0]), Some(b"sig-a".to_vec()));

    assert!(tree.update_signature_for_key(&keys::alice::pk(), b"sig-b"));
    assert_eq!(leaf_signature(&tree, &[0]), Some(b"sig-b".to_vec()));
}

#[test]
fn test_update_requires_filled_slot() {
    let mut tree = tree();
    assert!(!tree.update_signature_for_key(&keys::bob::pk(), b"sig"));
    assert_eq!(leaf_signature(&tree, &[1, 0]), None);

    // Every filled occurrence is updated.
    assert!(tree.set_signature_for_key(&keys::alice::pk(), b"old", false));
    assert!(tree.update_signature_for_key(&keys::alice::pk(), b"new"));
    assert_eq!(leaf_signature(&tree, &[0]), Some(b"new".to_vec()));
    assert_eq!(leaf_signature(&tree, &[1, 1]), Some(b"new".to_vec()));
}

#[test]
fn test_stop_at_first() {
    let pk = keys::alice::pk();
    let make = || {
        KeySignature::list(vec![
            KeySignature::ed25519(&pk),
            KeySignature::ed25519(&keys::bob::pk()),
            KeySignature::ed25519(&pk),
        ])
    };

    let mut first = make();
    assert!(first.set_signature_for_key(&pk, b"sig", true));
    assert_eq!(leaf_signature(&first, &[0]), Some(b"sig".to_vec()));
    assert_eq!(leaf_signature(&first, &[1]), None);
    assert_eq!(leaf_signature(&first, &[2]), None);

    // The next call fills the next empty occurrence.
    assert!(first.set_signature_for_key(&pk, b"sig", true));
    assert_eq!(leaf_signature(&first, &[2]), Some(b"sig".to_vec()));
    assert!(!first.set_signature_for_key(&pk, b"sig", true));

    let mut all = make();
    assert!(all.set_signature_for_key(&pk, b"sig", false));
    assert_eq!(leaf_signature(&all, &[0]), Some(b"sig".to_vec()));
    assert_eq!(leaf_signature(&all, &[1]), None);
    assert_eq!(leaf_signature(&all, &[2]), Some(b"sig".to_vec()));
}

#[test]
fn test_stop_at_first_is_global() {
    // The first match lives in a nested subtree, the second in a later branch.
    let mut tree = tree();
    assert!(tree.set_signature_for_key(&keys::alice::pk(), b"once", true));
    assert_eq!(leaf_signature(&tree, &[0]), Some(b"once".to_vec()));
    assert_eq!(leaf_signature(&tree, &[1, 1]), None);

    let mut nested_first = KeySignature::list(vec![
        KeySignature::threshold(1, vec![KeySignature::ed25519(&keys::alice::pk())]),
        KeySignature::ed25519(&keys::alice::pk()),
    ]);
    assert!(nested_first.set_signature_for_key(&keys::alice::pk(), b"once", true));
    assert_eq!(leaf_signature(&nested_first, &[0, 0]), Some(b"once".to_vec()));
    assert_eq!(leaf_signature(&nested_first, &[1]), None);
}

#[test]
fn test_set_skips_filled_and_continues() {
    let mut tree = tree();
    assert!(tree.set_signature_for_key(&keys::alice::pk(), b"first", true));
    // The filled leaf is skipped and the nested occurrence is filled instead.
    assert!(tree.set_signature_for_key(&keys::alice::pk(), b"second", true));
    assert_eq!(leaf_signature(&tree, &[0]), Some(b"first".to_vec()));
    assert_eq!(leaf_signature(&tree, &[1, 1]), Some(b"second".to_vec()));
}

#[test]
fn test_uuid_overwrites() {
    let mut tree = tree();
    let bob_uuid = tree.keys()[1].keys()[0].uuid;

    assert!(tree.set_signature_for_key_uuid(&bob_uuid, b"first"));
    assert_eq!(leaf_signature(&tree, &[1, 0]), Some(b"first".to_vec()));
    assert!(tree.set_signature_for_key_uuid(&bob_uuid, b"second"));
    assert_eq!(leaf_signature(&tree, &[1, 0]), Some(b"second".to_vec()));

    assert!(!tree.set_signature_for_key_uuid(&Uuid::new_v4(), b"nope"));
    // Only primitive leaves are addressable.
    let threshold_uuid = tree.keys()[1].uuid;
    assert!(!tree.set_signature_for_key_uuid(&threshold_uuid, b"nope"));
}

#[test]
fn test_uuid_distinguishes_duplicates() {
    let mut tree = tree();
    let positions = tree.key_uuids(&keys::alice::pk());
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].description, "A");

    assert!(tree.set_signature_for_key_uuid(&positions[1].uuid, b"nested"));
    assert_eq!(leaf_signature(&tree, &[0]), None);
    assert_eq!(leaf_signature(&tree, &[1, 1]), Some(b"nested".to_vec()));

    assert!(tree.key_uuids(&keys::dave::pk()).is_empty());
}

#[test]
fn test_batch_operations() {
    let mut tree = tree();
    let pks = vec![keys::bob::pk(), keys::dave::pk()];
    let sigs = vec![b"bob".to_vec(), b"dave".to_vec()];
    assert!(tree.set_signature_for_keys(&pks, &sigs, false));
    assert_eq!(leaf_signature(&tree, &[1, 0]), Some(b"bob".to_vec()));

    assert!(!tree.set_signature_for_keys(&[keys::dave::pk()], &[b"x".to_vec()], false));

    assert!(tree.update_signature_for_keys(&pks, &[b"bob2".to_vec(), b"dave2".to_vec()]));
    assert_eq!(leaf_signature(&tree, &[1, 0]), Some(b"bob2".to_vec()));
    assert!(!tree.update_signature_for_keys(&[keys::charlie::pk()], &[b"c".to_vec()]));

    let charlie_uuid = tree.keys()[2].uuid;
    assert!(tree.set_signature_for_key_uuids(
        &[Uuid::new_v4(), charlie_uuid],
        &[b"none".to_vec(), b"charlie".to_vec()]
    ));
    assert_eq!(leaf_signature(&tree, &[2]), Some(b"charlie".to_vec()));

    // Unpaired entries are ignored.
    assert!(!tree.set_signature_for_key_uuids::<Vec<u8>>(&[charlie_uuid], &[]));
}

#[test]
fn test_wire_congruence() {
    let message = b"body";
    let mut tree = tree();

    // Partially signed trees still mirror every position.
    let partial = tree.to_wire_signature();
    assert!(CompositeSignature::from_wire(&partial)
        .unwrap()
        .same_shape(&tree.to_wire_key()));

    for kp in [
        keys::alice::keypair(),
        keys::bob::keypair(),
        keys::charlie::keypair(),
    ] {
        let sig = kp.sign(message).unwrap();
        tree.set_signature_for_key(kp.public_key_bytes(), sig.as_ref(), false);
    }
    assert!(tree.unsigned_keys().is_empty());

    let sig = CompositeSignature::from_wire(&tree.to_wire_signature()).unwrap();
    assert!(sig.same_shape(&tree.to_wire_key()));
    match sig {
        CompositeSignature::List(sigs) => match &sigs[1] {
            CompositeSignature::Threshold(inner) => {
                assert_eq!(inner.len(), 3);
                assert_eq!(inner[2], CompositeSignature::Contract);
            }
            other => panic!("unexpected signature: {:?}", other),
        },
        other => panic!("unexpected signature: {:?}", other),
    }
}

#[test]
fn test_unsigned_leaves_are_empty_on_wire() {
    let tree = KeySignature::list(vec![KeySignature::ed25519(&keys::alice::pk())]);
    let sig = tree.to_wire_signature();
    assert_eq!(
        sig,
        wire::Signature {
            signature: Some(wire::SignatureVariant::SignatureList(wire::SignatureList {
                sigs: vec![wire::Signature {
                    signature: Some(wire::SignatureVariant::Ed25519(vec![])),
                }],
            })),
        }
    );
}

#[test]
fn test_from_wire() {
    let mut tree = tree();
    tree.set_signature_for_key(&keys::bob::pk(), b"bob", false);

    let rebuilt = KeySignature::from_wire(&tree.to_wire_key(), &tree.to_wire_signature()).unwrap();
    assert_eq!(rebuilt, tree);
    assert_eq!(leaf_signature(&rebuilt, &[0]), None);
    assert_eq!(leaf_signature(&rebuilt, &[1, 0]), Some(b"bob".to_vec()));

    let other = KeySignature::list(vec![KeySignature::ed25519(&keys::alice::pk())]);
    assert!(matches!(
        KeySignature::from_wire(&tree.to_wire_key(), &other.to_wire_signature()),
        Err(Error::ShapeMismatch)
    ));
    assert!(matches!(
        KeySignature::from_wire(&wire::Key::default(), &other.to_wire_signature()),
        Err(Error::KeyNotSet)
    ));
    let ecdsa = wire::Key {
        key: Some(wire::KeyVariant::Ecdsa384(vec![1])),
    };
    assert!(matches!(
        KeySignature::from_wire(&ecdsa, &wire::Signature::default()),
        Err(Error::UnrecognizedKeyVariant("ECDSA_384"))
    ));
}

#[test]
fn test_add_delete() {
    let mut tree = KeySignature::threshold(1, vec![]);
    assert!(tree.add_key(KeySignature::ed25519(&keys::alice::pk())));
    assert!(tree.add_key(KeySignature::ed25519(&keys::bob::pk())));
    assert!(tree.delete_key(&KeySignature::ed25519(&keys::alice::pk())));
    assert_eq!(tree.unsigned_keys(), vec![keys::bob::pk()]);

    let mut leaf = KeySignature::ed25519(&keys::alice::pk());
    assert!(!leaf.add_key(KeySignature::ed25519(&keys::bob::pk())));
    assert!(!leaf.delete_key(&KeySignature::ed25519(&keys::bob::pk())));
}

#[test]
fn test_json_roundtrip() {
    let mut tree = tree().with_description("multisig");
    tree.set_signature_for_key(&keys::charlie::pk(), &[0xab; 64], false);

    let json = tree.to_json().unwrap();
    let parsed = KeySignature::from_json(&json).unwrap();
    assert_eq!(parsed, tree);
    assert_eq!(parsed.uuid, tree.uuid);
    assert_eq!(parsed.description, "multisig");
    assert_eq!(leaf_signature(&parsed, &[2]), Some(vec![0xab; 64]));
    assert_eq!(leaf_signature(&parsed, &[0]), None);

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["keys"][0].get("signature").is_none());
    assert!(value["keys"][2]["signature"].is_string());

    assert!(matches!(
        KeySignature::from_json(r#"{"type": "NOTSET"}"#),
        Err(Error::KeyNotSet)
    ));
    assert!(matches!(
        KeySignature::from_json(r#"{"keys": []}"#),
        Err(Error::Json(json::Error::MissingType))
    ));
}

#[test]
fn test_signature_map() {
    let mut tree = tree();
    tree.set_signature_for_key(&keys::alice::pk(), b"alice", false);
    tree.set_signature_for_key(&keys::charlie::pk(), b"charlie", false);

    assert_eq!(
        tree.signature_pairs(),
        vec![
            (keys::alice::pk(), b"alice".to_vec()),
            (keys::alice::pk(), b"alice".to_vec()),
            (keys::charlie::pk(), b"charlie".to_vec()),
        ]
    );
    assert_eq!(tree.unsigned_keys(), vec![keys::bob::pk()]);

    let builder = SignatureMapBuilder::from(&tree);
    assert_eq!(builder.len(), 2);
    let map = builder.to_wire();
    assert_eq!(
        crate::sigmap::find_signature(&map, &keys::charlie::pk()),
        Some(&b"charlie"[..])
    );
}
