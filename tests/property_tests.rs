//! Property-based tests for the unchained signer

use std::collections::HashSet;

use proptest::prelude::*;
use unchained_signer::*;

fn attestation_strategy() -> impl Strategy<Value = Attestation> {
    (
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 0..=255),
        prop::collection::vec(any::<u8>(), 0..=255),
        any::<bool>(),
    )
        .prop_map(|(timestamp, hash, topic, correct)| Attestation { timestamp, hash, topic, correct })
}

// Property test: attestation bytes decode back to the same attestation
proptest! {
    #[test]
    fn attestation_roundtrip(a in attestation_strategy()) {
        let bytes = encode_attestation(&a).unwrap();
        prop_assert_eq!(bytes.len(), 8 + 1 + a.hash.len() + 1 + a.topic.len() + 1);
        prop_assert_eq!(decode_attestation(&bytes).unwrap(), a);
    }
}

// Property test: QR payloads survive base64 transport unchanged
proptest! {
    #[test]
    fn qr_payload_roundtrip(a in attestation_strategy(), url in "[a-z]{1,20}://[a-z0-9.]{1,40}(:[0-9]{1,5})?/[0-9.]{0,10}") {
        let q = QrData { data: a, url };
        prop_assert_eq!(decode_qr_data(&encode_qr_data(&q).unwrap()).unwrap(), q.clone());
        prop_assert_eq!(qr_data_from_base64(&qr_data_to_base64(&q).unwrap()).unwrap(), q);
    }
}

// Property test: over-long fields fail instead of truncating
proptest! {
    #[test]
    fn over_long_field_is_rejected(extra in 1usize..512, in_topic in any::<bool>()) {
        let long = vec![0u8; 255 + extra];
        let a = if in_topic {
            Attestation::new(0, vec![], long, false)
        } else {
            Attestation::new(0, long, vec![], false)
        };
        let field = if in_topic { "topic" } else { "hash" };
        prop_assert_eq!(
            encode_attestation(&a),
            Err(WireError::FieldTooLong { field, len: 255 + extra })
        );
    }
}

// Property test: any strict prefix or extension of a record fails to decode
proptest! {
    #[test]
    fn truncated_or_extended_qr_fails(a in attestation_strategy(), cut in 1usize..16, tail in prop::collection::vec(any::<u8>(), 1..8)) {
        let q = QrData { data: a, url: "wss://broker.example/0.11.21".into() };
        let bytes = encode_qr_data(&q).unwrap();
        let cut = cut.min(bytes.len());
        prop_assert!(decode_qr_data(&bytes[..bytes.len() - cut]).is_err());
        let mut longer = bytes.clone();
        longer.extend_from_slice(&tail);
        prop_assert_eq!(decode_qr_data(&longer), Err(WireError::TrailingBytes(tail.len())));
    }
}

// Property test: arbitrary input never panics the decoders
proptest! {
    #[test]
    fn decoders_are_total(data in prop::collection::vec(any::<u8>(), 0..600)) {
        let _ = decode_qr_data(&data);
        let _ = decode_attestation_report(&data);
        let _ = decode_hello(&data);
        let _ = parse_inbound(&OpcodeTable::V6, &data);
    }
}

// Property test: signatures are deterministic and verify
proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn signature_determinism(message in prop::collection::vec(any::<u8>(), 0..128)) {
        let key = PrivateKey::generate();
        let s1 = sign(&message, &key);
        let s2 = sign(&message, &key);
        prop_assert_eq!(s1, s2);
        prop_assert!(verify(&message, &s1, &key.public_key()).unwrap());
    }
}

#[test]
fn random_scalars_are_below_modulus_and_distinct() {
    let mut seen = HashSet::with_capacity(10_000);
    for _ in 0..10_000 {
        let s = generate_secure_random_scalar();
        assert_eq!(s.len(), 64);
        let bytes: [u8; 32] = hex::decode(&s).unwrap().try_into().unwrap();
        assert!(bytes < SCALAR_MODULUS);
        assert!(seen.insert(s));
    }
}
