//! Integration property tests for resource-fields.
//!
//! These tests validate naming, round-trip and authorization invariants
//! across field kinds using property-based testing.

use std::sync::{Arc, Once};

use resource_fields::{
    AuthorizationAdapter, Ctx, Error, FieldAdapter, FieldType, Model, PropertyField, Record,
    RequestMeta, ResourceSchema, UriListAdapter, UriListField, Value, WireMap,
    delimited_string_to_list, to_camel_case,
};
use proptest::prelude::*;
use serde_json::json;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

fn ctx() -> Ctx {
    Ctx::new(RequestMeta::new("req-prop"))
}

// Strategy: Generate snake_case property names
fn arb_property_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,6}(_[a-z]{1,6}){0,3}").unwrap()
}

// Strategy: Generate a direct field's value together with its type
fn arb_typed_value() -> impl Strategy<Value = (FieldType, Value)> {
    prop_oneof![
        any::<bool>().prop_map(|b| (FieldType::Bool, Value::Bool(b))),
        any::<i64>().prop_map(|i| (FieldType::Int, Value::Int(i))),
        prop::string::string_regex("[ -~]{0,20}")
            .unwrap()
            .prop_map(|s| (FieldType::Text, Value::Text(s))),
    ]
}

proptest! {
    /// Property: Derived wire keys never contain underscores and keep the
    /// first segment lowercase
    #[test]
    fn proptest_camel_case_naming(name in arb_property_name()) {
        let key = to_camel_case(&name);
        prop_assert!(!key.contains('_'));
        let first = name.split('_').next().unwrap();
        prop_assert!(key.starts_with(first));
        prop_assert_eq!(key.len(), name.len() - name.matches('_').count());
    }

    /// Property: Without an override, a direct field's wire key is the
    /// camelCase form of its property
    #[test]
    fn proptest_field_uses_derived_key(name in arb_property_name()) {
        let field = PropertyField::new(&name, FieldType::Int).unwrap();
        prop_assert_eq!(field.json_key(), to_camel_case(&name));
    }

    /// Property: An override key is always used verbatim
    #[test]
    fn proptest_override_key_wins(
        name in arb_property_name(),
        key in prop::string::string_regex("[a-zA-Z_]{1,12}").unwrap(),
        value in any::<i64>(),
    ) {
        let field = PropertyField::new(&name, FieldType::Int)
            .unwrap()
            .with_json_property(key.clone());
        let mut wire = WireMap::new();
        field
            .handle_outgoing(&ctx(), &Record::new().with(&name, value), &mut wire)
            .unwrap();
        prop_assert_eq!(wire.len(), 1);
        prop_assert_eq!(wire.get(&key), Some(&json!(value)));
    }

    /// Property: Outgoing then incoming copies a direct field unchanged
    #[test]
    fn proptest_direct_round_trip(
        name in arb_property_name(),
        (field_type, value) in arb_typed_value(),
    ) {
        let schema = ResourceSchema::new("thing")
            .field(PropertyField::new(&name, field_type).unwrap());
        let source = Record::new().with(&name, value.clone());

        let wire = schema.serialize(&ctx(), &source).unwrap();
        let mut copy = Record::new();
        schema.deserialize(&ctx(), &wire, &mut copy).unwrap();

        prop_assert_eq!(copy.get(&name), Ok(value));
    }

    /// Property: The list adapter's comparison ignores order on both sides
    #[test]
    fn proptest_uri_list_order_independent(
        pks in prop::collection::btree_set(0i64..1000, 0..8),
        seed in any::<u64>(),
    ) {
        init_tracing();
        let field = UriListField::new("tags", Arc::new(ResourceSchema::new("tag"))).unwrap();
        let pks: Vec<i64> = pks.into_iter().collect();

        // Rotate the proposed list so it rarely matches backing order
        let mut proposed: Vec<String> = pks.iter().map(|pk| format!("/tag/{}", pk)).collect();
        if !proposed.is_empty() {
            let by = (seed as usize) % proposed.len();
            proposed.rotate_left(by);
        }
        let target = Record::new().with_collection(
            "tags",
            pks.iter().rev().map(|pk| Record::new().with("pk", *pk)).collect::<Vec<_>>(),
        );
        let mut source = WireMap::new();
        source.insert("tags".to_string(), json!(proposed));

        let triple = UriListAdapter.triple(&field, &ctx(), &source, &target).unwrap();
        prop_assert!(triple.is_unchanged());
    }

    /// Property: Splitting a comma-joined list recovers the parts
    #[test]
    fn proptest_delimited_split(parts in prop::collection::vec("[a-z0-9 ]{0,5}", 1..6)) {
        let joined = parts.join(",");
        let expected = Value::List(parts.into_iter().map(Value::Text).collect());
        prop_assert_eq!(delimited_string_to_list(Value::Text(joined)), expected);
    }

    /// Property: Integer fields reject text that does not parse
    #[test]
    fn proptest_int_rejects_words(word in "[a-z]{1,8}") {
        let result = FieldType::Int.coerce(Value::Text(word));
        let is_conversion_error = matches!(result, Err(Error::Conversion { .. }));
        prop_assert!(is_conversion_error);
    }
}

#[test]
fn model_trait_objects_are_usable_across_threads() {
    fn assert_send<T: Send>() {}
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send::<Box<dyn Model>>();
    assert_send_sync::<ResourceSchema>();
    assert_send_sync::<resource_fields::Field>();
}
