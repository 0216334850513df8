//! Field-level encryption and recursive decryption of JSON values.
//!
//! The two traversals are deliberately asymmetric:
//!
//! - [`encrypt_fields`] only touches the top level of an object. Each value,
//!   whatever its shape, is serialised and sealed as one opaque ciphertext.
//! - [`decrypt_tree`] recurses through objects, decrypts every string it can
//!   classify as ciphertext, and then recurses into the decrypted value.
//!
//! Existing ciphertext depends on this shape, so encrypting nested fields
//! individually would change the wire format.

use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use super::cipher::{encrypt, CipherError};
use super::tag::{classify, Classified};

/// Replace every top-level value of `fields` with the ciphertext of its JSON
/// text.
///
/// Keys and their order are preserved.
///
/// # Errors
///
/// Fails as a whole on the first field that cannot be encrypted, typically
/// [`CipherError::PayloadTooLarge`]. No partial result is returned.
pub fn encrypt_fields(
    fields: &Map<String, Value>,
    key: &RsaPublicKey,
) -> Result<Map<String, Value>, CipherError> {
    fields
        .iter()
        .map(|(name, value)| {
            let text = Zeroizing::new(serde_json::to_string(value)?);
            let sealed = encrypt(text.as_bytes(), key)?;
            Ok((name.clone(), Value::String(sealed)))
        })
        .collect()
}

/// Recursively decrypt every ciphertext string reachable through objects.
///
/// This function is total. A string that does not decrypt under `key` is
/// returned unchanged, which means corrupted or foreign ciphertext passes
/// through silently as if it were plaintext.
pub fn decrypt_tree(value: Value, key: &RsaPrivateKey) -> Value {
    match value {
        Value::String(s) => decrypt_string(s, key),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(name, child)| (name, decrypt_tree(child, key)))
                .collect(),
        ),
        // Arrays are not traversed: elements, ciphertext or not, stay as-is.
        Value::Array(items) => Value::Array(items),
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(b),
        Value::Number(n) => Value::Number(n),
    }
}

fn decrypt_string(s: String, key: &RsaPrivateKey) -> Value {
    let plaintext = match classify(&s, key) {
        Classified::Ciphertext(plaintext) => plaintext,
        Classified::Plaintext => return Value::String(s),
    };

    match serde_json::from_slice::<Value>(&plaintext) {
        Ok(parsed) => decrypt_tree(parsed, key),
        // Sealed with the raw string cipher rather than `encrypt_fields`.
        Err(_) => match std::str::from_utf8(&plaintext) {
            Ok(text) => Value::String(text.to_owned()),
            Err(_) => Value::String(s),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::cipher::{decrypt, MARKER};
    use crate::crypto::tag::is_ciphertext;
    use crate::test_support::{primary, secondary};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn mapping_round_trip() {
        let keys = &primary().keys;
        let original = json!({
            "a": "test",
            "b": {"b1": "test1"},
            "c": 42,
            "d": null,
            "e": [1, "two", false],
            "f": true
        });
        let sealed = encrypt_fields(&object(original.clone()), keys.public()).unwrap();
        for value in sealed.values() {
            assert!(is_ciphertext(value.as_str().unwrap(), keys.private()));
        }
        let restored = decrypt_tree(Value::Object(sealed), keys.private());
        assert_eq!(restored, original);
    }

    #[test]
    fn nested_value_is_sealed_as_one_blob() {
        let keys = &primary().keys;
        let sealed = encrypt_fields(&object(json!({"a": {"x": 1, "y": 2}})), keys.public()).unwrap();
        assert_eq!(sealed.len(), 1);
        let ciphertext = sealed["a"].as_str().unwrap();
        let plaintext = decrypt(ciphertext, keys.private()).unwrap();
        assert_eq!(plaintext, br#"{"x":1,"y":2}"#);

        let restored = decrypt_tree(Value::Object(sealed), keys.private());
        assert_eq!(restored, json!({"a": {"x": 1, "y": 2}}));
    }

    #[test]
    fn key_order_is_preserved() {
        let keys = &primary().keys;
        let original = json!({"zeta": 1, "alpha": 2, "mid": 3});
        let sealed = encrypt_fields(&object(original.clone()), keys.public()).unwrap();
        let names: Vec<_> = sealed.keys().cloned().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        let restored = decrypt_tree(Value::Object(sealed), keys.private());
        assert_eq!(
            serde_json::to_string(&restored).unwrap(),
            r#"{"zeta":1,"alpha":2,"mid":3}"#
        );
    }

    #[test]
    fn empty_object_round_trip() {
        let keys = &primary().keys;
        let sealed = encrypt_fields(&Map::new(), keys.public()).unwrap();
        assert!(sealed.is_empty());
        assert_eq!(decrypt_tree(Value::Object(sealed), keys.private()), json!({}));
    }

    #[test]
    fn oversized_field_fails_whole_operation() {
        let keys = &primary().keys;
        let big = "x".repeat(200);
        let err = encrypt_fields(&object(json!({"ok": "small", "big": big})), keys.public())
            .unwrap_err();
        assert!(matches!(err, CipherError::PayloadTooLarge { .. }));
    }

    #[test]
    fn field_at_exact_limit_fits() {
        let keys = &primary().keys;
        // Serialised as a JSON string: two quote characters plus the body.
        let body = "y".repeat(190 - MARKER.len() - 2);
        let original = json!({ "edge": body });
        let sealed = encrypt_fields(&object(original.clone()), keys.public()).unwrap();
        assert_eq!(decrypt_tree(Value::Object(sealed), keys.private()), original);
    }

    #[test]
    fn plaintext_passes_through() {
        let keys = &primary().keys;
        let value = json!({"a": "plain text", "b": 42});
        assert_eq!(decrypt_tree(value.clone(), keys.private()), value);
    }

    #[test]
    fn scalars_pass_through() {
        let keys = &primary().keys;
        for value in [json!(null), json!(true), json!(3.5), json!("hello")] {
            assert_eq!(decrypt_tree(value.clone(), keys.private()), value);
        }
    }

    #[test]
    fn arrays_are_not_traversed() {
        let keys = &primary().keys;
        let ciphertext = encrypt(b"\"inside\"", keys.public()).unwrap();
        let value = json!({"list": [ciphertext.clone()]});
        let restored = decrypt_tree(value, keys.private());
        assert_eq!(restored, json!({"list": [ciphertext]}));
    }

    #[test]
    fn nested_objects_are_traversed() {
        let keys = &primary().keys;
        let ciphertext = encrypt(b"\"deep\"", keys.public()).unwrap();
        let value = json!({"outer": {"inner": ciphertext, "n": 1}});
        assert_eq!(
            decrypt_tree(value, keys.private()),
            json!({"outer": {"inner": "deep", "n": 1}})
        );
    }

    #[test]
    fn ciphertext_cannot_be_sealed_again() {
        let keys = &primary().keys;
        // A 2048-bit ciphertext is 344 base64 characters, well past the limit.
        let inner = encrypt(b"\"secret\"", keys.public()).unwrap();
        let err = encrypt_fields(&object(json!({"w": {"s": inner}})), keys.public()).unwrap_err();
        assert!(matches!(err, CipherError::PayloadTooLarge { .. }));
    }

    #[test]
    fn decrypted_object_keeps_plain_strings() {
        let keys = &primary().keys;
        let original = json!({"user": {"name": "Alice", "tags": ["x", "y"]}});
        let sealed = encrypt_fields(&object(original.clone()), keys.public()).unwrap();
        assert_eq!(decrypt_tree(Value::Object(sealed), keys.private()), original);
    }

    #[test]
    fn raw_string_ciphertext_decrypts_to_string() {
        let keys = &primary().keys;
        let ciphertext = encrypt(b"not json at all", keys.public()).unwrap();
        assert_eq!(
            decrypt_tree(json!({ "v": ciphertext }), keys.private()),
            json!({"v": "not json at all"})
        );
    }

    #[test]
    fn foreign_ciphertext_passes_through() {
        let ciphertext = encrypt(b"1", secondary().keys.public()).unwrap();
        let value = json!({ "v": ciphertext });
        assert_eq!(decrypt_tree(value.clone(), primary().keys.private()), value);
    }

    mod properties {
        use crate::crypto::cipher::{CipherError, MARKER};
        use crate::crypto::tree::{decrypt_tree, encrypt_fields};
        use crate::test_support::primary;
        use proptest::prelude::*;
        use serde_json::{Map, Value};

        fn leaf() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::from),
                "\\PC{0,12}".prop_map(Value::String),
            ]
        }

        fn field_value() -> impl Strategy<Value = Value> {
            leaf().prop_recursive(2, 6, 3, |inner| {
                prop_oneof![
                    proptest::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
                    proptest::collection::vec(("[a-z]{1,6}", inner), 0..3)
                        .prop_map(|entries| Value::Object(entries.into_iter().collect())),
                ]
            })
        }

        fn fits(value: &Value) -> bool {
            serde_json::to_string(value)
                .map(|text| MARKER.len() + text.len() <= 190)
                .unwrap_or(false)
        }

        /// Objects whose every field fits in one RSA block.
        fn mapping() -> impl Strategy<Value = Map<String, Value>> {
            proptest::collection::vec(("[a-zA-Z_]{1,10}", field_value()), 0..5)
                .prop_map(|entries| entries.into_iter().collect::<Map<String, Value>>())
                .prop_filter("every field fits one RSA block", |m| m.values().all(fits))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn mapping_round_trip(m in mapping()) {
                let keys = &primary().keys;
                let sealed = encrypt_fields(&m, keys.public()).unwrap();
                prop_assert_eq!(sealed.len(), m.len());
                prop_assert!(sealed.values().all(Value::is_string));
                prop_assert_eq!(decrypt_tree(Value::Object(sealed), keys.private()), Value::Object(m));
            }

            #[test]
            fn one_oversized_field_fails_the_mapping(mut m in mapping(), extra in 185usize..400) {
                m.insert("oversized".into(), Value::String("x".repeat(extra)));
                let rejected = matches!(
                    encrypt_fields(&m, primary().keys.public()),
                    Err(CipherError::PayloadTooLarge { .. })
                );
                prop_assert!(rejected);
            }
        }
    }
}
