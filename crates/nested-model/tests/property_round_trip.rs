use nested_model::{materialize, to_plain, Node, RawValue};
use proptest::prelude::*;

fn arb_primitive() -> impl Strategy<Value = RawValue> {
    prop_oneof![
        Just(RawValue::Undefined),
        Just(RawValue::Null),
        any::<bool>().prop_map(RawValue::Bool),
        any::<i64>().prop_map(RawValue::Integer),
        any::<f64>().prop_map(RawValue::Float),
        "[a-z]{0,8}".prop_map(RawValue::Str),
    ]
}

fn arb_raw() -> impl Strategy<Value = RawValue> {
    arb_primitive().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(RawValue::Sequence),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                .prop_map(|entries| RawValue::Record(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn primitives_are_returned_unchanged(value in arb_primitive()) {
        let node = materialize(Some(&value), None, false).unwrap();
        prop_assert!(matches!(node, Node::Leaf(_)));
        prop_assert!(to_plain(&node).same_value(&value));
    }

    #[test]
    fn plain_data_round_trips(value in arb_raw(), bubble in any::<bool>()) {
        let node = materialize(Some(&value), None, bubble).unwrap();
        prop_assert_eq!(node.is_container(), !value.is_primitive());
        prop_assert!(to_plain(&node).same_value(&value));
    }
}
