use crate::{
    INLINE_CAPACITY,
    range::Range,
    value::{BorrowKind, StorageTag, StringOrder, Value},
};
use floedb_pack::{Builder, Slice};
use proptest::prelude::*;
use serde_json::json;
use std::{
    cmp::Ordering,
    collections::HashSet,
    hash::{BuildHasher, BuildHasherDefault, DefaultHasher},
};

// ---- helpers -----------------------------------------------------------

fn encode(value: &serde_json::Value) -> Vec<u8> {
    Builder::from_serialize(value)
        .expect("json value should encode")
        .finish()
        .expect("builder should be closed")
}

fn owned(value: &serde_json::Value) -> Value<'static> {
    Value::from_serialize(value).expect("json value should encode")
}

fn decode(value: &Value<'_>) -> serde_json::Value {
    value.deserialize().expect("value should decode")
}

fn hash_of(value: &Value<'_>) -> u64 {
    BuildHasherDefault::<DefaultHasher>::default().hash_one(value)
}

fn cmp(left: &Value<'_>, right: &Value<'_>) -> Ordering {
    Value::compare(left, right, StringOrder::Binary)
}

// ---- layout ------------------------------------------------------------

#[test]
fn value_is_sixteen_bytes() {
    assert_eq!(std::mem::size_of::<Value<'_>>(), 16);
}

#[test]
fn value_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Value<'static>>();
}

#[test]
fn default_value_is_none() {
    let value = Value::default();
    assert!(value.is_none());
    assert!(!value.is_null());
    assert_eq!(value.storage(), StorageTag::Internal);
    assert_eq!(value.type_name(), "none");
}

// ---- construction ------------------------------------------------------

#[test]
fn small_encodings_are_inline() {
    assert_eq!(Value::from_bool(true).storage(), StorageTag::Internal);
    assert_eq!(Value::from_i64(-1_000_000).storage(), StorageTag::Internal);
    assert_eq!(Value::from_f64(0.1).storage(), StorageTag::Internal);
    assert_eq!(Value::null().storage(), StorageTag::Internal);
    assert_eq!(owned(&json!([])).storage(), StorageTag::Internal);
    assert_eq!(owned(&json!({})).storage(), StorageTag::Internal);
}

#[test]
fn inline_capacity_boundary() {
    // one header byte plus the text
    let fits = "x".repeat(INLINE_CAPACITY - 1);
    let spills = "x".repeat(INLINE_CAPACITY);

    let inline = Value::from_text(&fits);
    assert_eq!(inline.storage(), StorageTag::Internal);
    assert_eq!(inline.slice().byte_size(), INLINE_CAPACITY);
    assert_eq!(inline.slice().get_str(), Some(fits.as_str()));

    let external = Value::from_text(&spills);
    assert_eq!(external.storage(), StorageTag::External);
    assert_eq!(external.slice().get_str(), Some(spills.as_str()));
}

#[test]
fn from_builder_copies_the_item() {
    let mut builder = Builder::new();
    builder
        .open_object()
        .add_key("name")
        .add_str("a fairly long string value")
        .close();

    let value = Value::from_builder(&builder).unwrap();
    drop(builder);

    assert_eq!(value.storage(), StorageTag::External);
    assert_eq!(decode(&value), json!({"name": "a fairly long string value"}));
}

#[test]
fn from_buffer_keeps_only_the_first_item() {
    let mut bytes = encode(&json!("a string longer than fifteen bytes"));
    let len = bytes.len();
    bytes.extend_from_slice(&[0x01, 0x02]);

    let value = Value::from_buffer(bytes).unwrap();
    assert_eq!(value.storage(), StorageTag::External);
    assert_eq!(value.slice().byte_size(), len);

    assert!(Value::from_buffer(vec![0x19]).is_err());
    assert!(Value::from_buffer(Vec::new()).is_err());
}

#[test]
fn borrowed_values_never_copy() {
    let bytes = encode(&json!({"k": "some value stored elsewhere"}));
    let slice = Slice::new(&bytes).unwrap();

    let reference = Value::reference(slice);
    let sticky = Value::document(slice);

    assert_eq!(reference.storage(), StorageTag::Reference);
    assert_eq!(sticky.storage(), StorageTag::ReferenceSticky);
    assert_eq!(reference.slice().as_bytes().as_ptr(), bytes.as_ptr());
    assert_eq!(sticky.slice().as_bytes().as_ptr(), bytes.as_ptr());
    assert_eq!(
        Value::from_slice_with(slice, BorrowKind::Sticky).storage(),
        StorageTag::ReferenceSticky
    );
}

// ---- round trip --------------------------------------------------------

#[test]
fn scalars_round_trip() {
    for json in [
        json!(null),
        json!(true),
        json!(false),
        json!(0),
        json!(-17),
        json!(u64::MAX),
        json!(1.25),
        json!(""),
        json!("short"),
        json!("a string that is definitely longer than fifteen bytes"),
    ] {
        let bytes = encode(&json);
        let value = Value::from_slice(Slice::new(&bytes).unwrap());
        assert_eq!(decode(&value), json, "round trip of {json}");
    }
}

// ---- ownership ---------------------------------------------------------

#[test]
fn clone_of_external_is_independent() {
    let original = Value::from_text("an external buffer holding some text");
    let copy = original.clone();

    assert_eq!(copy.storage(), StorageTag::External);
    assert_ne!(
        original.slice().as_bytes().as_ptr(),
        copy.slice().as_bytes().as_ptr()
    );
    assert_eq!(original, copy);

    drop(original);
    assert_eq!(
        copy.slice().get_str(),
        Some("an external buffer holding some text")
    );
}

#[test]
fn clone_of_range_duplicates_the_interval() {
    let original = Value::from_range(3, 7);
    let copy = original.clone();
    drop(original);

    assert_eq!(copy.range(), &Range::new(3, 7));
}

#[test]
fn clone_of_reference_shares_the_pointer() {
    let bytes = encode(&json!([1, 2, 3]));
    let reference = Value::reference(Slice::new(&bytes).unwrap());
    let copy = reference.clone();

    assert_eq!(copy.storage(), StorageTag::Reference);
    assert_eq!(copy.slice().as_bytes().as_ptr(), bytes.as_ptr());
    assert_eq!(copy, reference);
}

#[test]
fn take_leaves_source_none() {
    let mut source = Value::from_text("moved out of the source value here");
    let moved = source.take();

    assert!(source.is_none());
    assert_eq!(source.storage(), StorageTag::Internal);
    assert_eq!(moved.storage(), StorageTag::External);
    assert_eq!(
        moved.slice().get_str(),
        Some("moved out of the source value here")
    );

    let mut range = Value::from_range(1, 2);
    let moved = range.take();
    assert!(range.is_none());
    assert!(moved.is_range());
}

#[test]
fn erase_releases_storage() {
    let mut value = Value::from_range(1, 100);
    value.erase();

    assert!(value.is_none());
    assert!(!value.is_range());
}

#[test]
fn to_owned_value_detaches_borrowed_values() {
    let owned_value = {
        let bytes = encode(&json!({"a": [1, 2, 3], "b": "long enough to spill"}));
        let reference = Value::reference(Slice::new(&bytes).unwrap());
        reference.to_owned_value()
    };

    assert_eq!(owned_value.storage(), StorageTag::External);
    assert_eq!(
        decode(&owned_value),
        json!({"a": [1, 2, 3], "b": "long enough to spill"})
    );
    assert!(Value::from_range(1, 3).to_owned_value().is_range());
}

// ---- range -------------------------------------------------------------

#[test]
fn range_behaves_as_array() {
    let value = Value::from_range(3, 7);

    assert!(value.is_array());
    assert!(value.is_range());
    assert!(!value.is_none());
    assert_eq!(value.type_name(), "array");
    assert_eq!(value.length(), 5);
    assert_eq!(value.at(0).to_i64(), 3);
    assert_eq!(value.at(4).to_i64(), 7);
    assert_eq!(value.at(0).storage(), StorageTag::Internal);
    assert!(value.at(5).is_none());
    assert_eq!(value.at(-1).to_i64(), 7);
    assert!(value.at(-6).is_none());
    assert!(value.slice().is_none());
    assert_eq!(value.to_string(), "3..7");
}

#[test]
fn empty_range_is_still_true() {
    let value = Value::from_range(5, 1);

    assert_eq!(value.length(), 0);
    assert!(value.at(0).is_none());
    assert!(value.is_true());
}

#[test]
fn range_materializes_to_integer_array() {
    let value = Value::from_range(3, 7);

    let materialized = value.materialize().unwrap();
    assert!(!materialized.is_range());
    assert_eq!(decode(&materialized), json!([3, 4, 5, 6, 7]));
    assert_eq!(decode(&value), json!([3, 4, 5, 6, 7]));

    let mut builder = Builder::new();
    builder.open_array();
    value.write_to(&mut builder);
    Value::from_i64(8).write_to(&mut builder);
    builder.close();
    let nested = Value::from_builder(&builder).unwrap();
    assert_eq!(decode(&nested), json!([[3, 4, 5, 6, 7], 8]));
}

#[test]
#[should_panic(expected = "range accessor called on internal value")]
fn range_accessor_on_non_range_panics() {
    let _ = Value::from_i64(1).range();
}

// ---- navigation --------------------------------------------------------

#[test]
fn at_and_get_borrow_from_the_container() {
    let value = owned(&json!({"a": {"b": [10, 20, 30]}, "c": "text"}));

    let a = value.get("a");
    assert_eq!(a.storage(), StorageTag::Reference);
    assert!(a.is_object());

    let list = value.get_path(&["a", "b"]);
    assert!(list.is_array());
    assert_eq!(list.length(), 3);
    assert_eq!(list.at(1).to_i64(), 20);
    assert_eq!(list.at(1).storage(), StorageTag::Reference);
    assert_eq!(list.at(-3).to_i64(), 10);
    assert!(list.at(3).is_none());

    assert!(value.has_key("c"));
    assert!(value.get("missing").is_none());
    assert!(value.get_path(&["a", "missing", "b"]).is_none());
    assert!(Value::from_i64(1).get("a").is_none());
    assert!(Value::from_i64(1).at(0).is_none());
    assert_eq!(Value::from_text("abc").length(), 0);
}

#[test]
fn type_predicates() {
    assert!(Value::null().is_null());
    assert!(Value::null().is_null_or_none());
    assert!(Value::none().is_null_or_none());
    assert!(Value::from_bool(false).is_bool());
    assert!(Value::from_f64(1.5).is_number());
    assert!(Value::from_u64(u64::MAX).is_number());
    assert!(Value::from_text("x").is_string());
    assert!(owned(&json!([1])).is_array());
    assert!(owned(&json!({"a": 1})).is_object());

    assert_eq!(Value::from_f64(1.5).type_name(), "number");
    assert_eq!(owned(&json!({})).type_name(), "object");
}

// ---- coercion ----------------------------------------------------------

#[test]
fn truthiness_table() {
    let falsy = [
        Value::none(),
        Value::null(),
        Value::from_bool(false),
        Value::from_i64(0),
        Value::from_f64(0.0),
        Value::from_text(""),
        owned(&json!([])),
        owned(&json!({})),
    ];
    for value in &falsy {
        assert!(value.is_false(), "{value:?} should be false");
    }

    let truthy = [
        Value::from_bool(true),
        Value::from_i64(-1),
        Value::from_f64(0.5),
        Value::from_text("0"),
        owned(&json!([0])),
        owned(&json!({"a": null})),
        Value::from_range(1, 0),
    ];
    for value in &truthy {
        assert!(value.is_true(), "{value:?} should be true");
    }
}

#[test]
fn numeric_coercion_table() {
    let cases = [
        (Value::none(), 0.0),
        (Value::null(), 0.0),
        (Value::from_bool(true), 1.0),
        (Value::from_i64(-4), -4.0),
        (Value::from_f64(2.5), 2.5),
        (Value::from_text("  12.5 "), 12.5),
        (Value::from_text("1e3"), 1000.0),
        (Value::from_text("abc"), 0.0),
        (Value::from_text(""), 0.0),
        (Value::from_text("inf"), 0.0),
        (owned(&json!([7])), 7.0),
        (owned(&json!([["3"]])), 3.0),
        (owned(&json!([1, 2])), 0.0),
        (owned(&json!({"a": 1})), 0.0),
        (Value::from_range(4, 4), 4.0),
        (Value::from_range(4, 5), 0.0),
    ];

    for (value, expected) in &cases {
        assert!(
            (value.to_f64() - expected).abs() < f64::EPSILON,
            "{value:?} should read as {expected}"
        );
    }
}

#[test]
fn integer_coercion_table() {
    assert_eq!(Value::from_f64(2.9).to_i64(), 2);
    assert_eq!(Value::from_f64(-2.9).to_i64(), -2);
    assert_eq!(Value::from_f64(1e300).to_i64(), i64::MAX);
    assert_eq!(Value::from_u64(u64::MAX).to_i64(), i64::MAX);
    assert_eq!(Value::from_text(" 42 ").to_i64(), 42);
    assert_eq!(Value::from_text("7.8").to_i64(), 7);
    assert_eq!(Value::from_text("x").to_i64(), 0);
    assert_eq!(Value::from_bool(true).to_i64(), 1);
    assert_eq!(owned(&json!(["-5"])).to_i64(), -5);
    assert_eq!(Value::from_range(9, 9).to_i64(), 9);
}

// ---- hash / eq ---------------------------------------------------------

#[test]
fn inline_values_hash_by_content() {
    let a = Value::from_i64(42);
    let b = Value::from_i64(42);

    assert_eq!(a, b);
    assert_eq!(a.fast_hash(), b.fast_hash());
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_ne!(a, Value::from_i64(43));
}

#[test]
fn references_hash_by_identity() {
    let left = encode(&json!([1, 2, 3]));
    let right = left.clone();

    let a = Value::reference(Slice::new(&left).unwrap());
    let a_again = Value::reference(Slice::new(&left).unwrap());
    let b = Value::reference(Slice::new(&right).unwrap());

    // same bytes, different memory
    assert_ne!(a, b);
    assert_eq!(a, a_again);
    assert_eq!(a.fast_hash(), a_again.fast_hash());

    // same memory, different strategy
    let sticky = Value::document(Slice::new(&left).unwrap());
    assert_ne!(a, sticky);

    // same content, different storage
    assert_ne!(a, Value::from_slice(Slice::new(&left).unwrap()));
}

#[test]
fn external_and_range_clones_are_equal() {
    let external = Value::from_text("a long text value that spills over");
    let copy = external.clone();
    assert_eq!(external, copy);
    assert_eq!(external.fast_hash(), copy.fast_hash());

    let range = Value::from_range(-3, 3);
    assert_eq!(range, range.clone());
    assert_eq!(range.fast_hash(), range.clone().fast_hash());
    assert_ne!(range, Value::from_range(-3, 4));
}

#[test]
fn values_work_as_set_keys() {
    let mut set = HashSet::new();
    set.insert(Value::from_i64(1));
    set.insert(Value::from_i64(1));
    set.insert(Value::from_text("one"));
    set.insert(Value::from_range(1, 1));

    assert_eq!(set.len(), 3);
    assert!(set.contains(&Value::from_range(1, 1)));
}

// ---- comparator --------------------------------------------------------

// Comparison used to be a stub that reported every pair as equal; these
// tables pin down the total order that replaced it.

#[test]
fn comparator_orders_across_types() {
    let ascending = [
        Value::null(),
        Value::from_bool(false),
        Value::from_bool(true),
        Value::from_i64(-10),
        Value::from_f64(1.5),
        Value::from_i64(2),
        Value::from_text("B"),
        Value::from_text("a"),
        Value::from_text("ab"),
        owned(&json!([])),
        owned(&json!([1])),
        owned(&json!([1, 2])),
        Value::from_range(1, 3),
        owned(&json!([2])),
        owned(&json!({})),
        // a missing "a" reads as null
        owned(&json!({"b": 0})),
        owned(&json!({"a": 1})),
        owned(&json!({"a": 2})),
    ];

    for (i, left) in ascending.iter().enumerate() {
        for (j, right) in ascending.iter().enumerate() {
            assert_eq!(cmp(left, right), i.cmp(&j), "{left} vs {right}");
        }
    }
}

#[test]
fn comparator_equalities() {
    assert_eq!(cmp(&Value::none(), &Value::null()), Ordering::Equal);
    assert_eq!(cmp(&Value::from_i64(2), &Value::from_f64(2.0)), Ordering::Equal);
    assert_eq!(cmp(&Value::from_f64(-0.0), &Value::from_f64(0.0)), Ordering::Equal);
    assert_eq!(
        cmp(&Value::from_range(3, 5), &owned(&json!([3, 4, 5]))),
        Ordering::Equal
    );
    // missing members read as null
    assert_eq!(
        cmp(&owned(&json!({"a": 1})), &owned(&json!({"a": 1, "b": null}))),
        Ordering::Equal
    );
    // member order does not matter
    assert_eq!(
        cmp(&owned(&json!({"a": 1, "b": 2})), &owned(&json!({"b": 2, "a": 1}))),
        Ordering::Equal
    );
}

#[test]
fn integers_and_doubles_compare_exactly() {
    let exact = Value::from_i64(1 << 53);
    let above = Value::from_i64((1 << 53) + 1);
    let double = Value::from_f64(9_007_199_254_740_992.0);

    assert_eq!(cmp(&exact, &above), Ordering::Less);
    assert_eq!(cmp(&exact, &double), Ordering::Equal);
    assert_eq!(cmp(&double, &above), Ordering::Less);
    assert_eq!(cmp(&above, &double), Ordering::Greater);

    // 2^64 as a double sits just above the largest integer
    let max = Value::from_u64(u64::MAX);
    let two_pow_64 = Value::from_f64(1.844_674_407_370_955_2e19);
    assert_eq!(cmp(&max, &two_pow_64), Ordering::Less);
    assert_eq!(cmp(&two_pow_64, &max), Ordering::Greater);

    assert_eq!(
        cmp(&Value::from_i64(i64::MIN), &Value::from_f64(-9.223_372_036_854_776e18)),
        Ordering::Equal
    );
    assert_eq!(cmp(&Value::from_i64(0), &Value::from_f64(-0.5)), Ordering::Greater);
    assert_eq!(cmp(&Value::from_i64(-1), &Value::from_f64(-1.5)), Ordering::Greater);
    assert_eq!(cmp(&Value::from_i64(1), &Value::from_f64(1.5)), Ordering::Less);
    assert_eq!(cmp(&Value::from_i64(i64::MAX), &Value::from_f64(f64::INFINITY)), Ordering::Less);
    assert_eq!(
        cmp(&Value::from_i64(i64::MIN), &Value::from_f64(f64::NEG_INFINITY)),
        Ordering::Greater
    );
    assert_eq!(cmp(&Value::from_i64(i64::MAX), &Value::from_f64(f64::NAN)), Ordering::Less);
}

#[test]
fn comparator_ignores_storage_kind() {
    let bytes = encode(&json!({"name": "value long enough to spill"}));
    let reference = Value::reference(Slice::new(&bytes).unwrap());
    let external = Value::from_slice(Slice::new(&bytes).unwrap());

    assert_eq!(cmp(&reference, &external), Ordering::Equal);
    assert_ne!(reference, external);
}

#[test]
fn comparator_large_integers_stay_exact() {
    let big = Value::from_u64(u64::MAX);
    let smaller = Value::from_u64(u64::MAX - 1);

    assert_eq!(cmp(&smaller, &big), Ordering::Less);
    assert_eq!(cmp(&Value::from_i64(i64::MIN), &big), Ordering::Less);
}

#[test]
fn collated_strings_fold_case_first() {
    let lower = Value::from_text("a");
    let upper_b = Value::from_text("B");
    let upper_a = Value::from_text("A");

    assert_eq!(cmp(&upper_b, &lower), Ordering::Less);
    assert_eq!(
        Value::compare(&lower, &upper_b, StringOrder::Collated),
        Ordering::Less
    );
    assert_eq!(
        Value::compare(&upper_a, &lower, StringOrder::Collated),
        Ordering::Less
    );
    assert_eq!(
        Value::compare(&lower, &lower.clone(), StringOrder::Collated),
        Ordering::Equal
    );
    assert_eq!(lower.canonical_cmp(&upper_b), Ordering::Greater);
}

// ---- display -----------------------------------------------------------

#[test]
fn display_and_debug() {
    let value = owned(&json!({"a": [1, "x"]}));
    assert_eq!(value.to_string(), r#"{"a":[1,"x"]}"#);
    assert_eq!(Value::none().to_string(), "none");
    assert_eq!(
        format!("{:?}", Value::from_i64(3)),
        r#"Value { storage: "internal", value: 3 }"#
    );
}

// ---- properties --------------------------------------------------------

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        (-1.0e9f64..1.0e9).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,40}".prop_map(serde_json::Value::String),
    ];

    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

// Integers and doubles clustered where doubles stop being exact.
#[allow(clippy::cast_precision_loss)]
fn arb_number() -> impl Strategy<Value = Value<'static>> {
    const EDGE: i64 = 1 << 53;

    prop_oneof![
        (EDGE - 4..EDGE + 4).prop_map(Value::from_i64),
        (EDGE - 4..EDGE + 4).prop_map(|i| Value::from_f64(i as f64)),
        (-4i64..4).prop_map(Value::from_i64),
        (-8i64..8).prop_map(|i| Value::from_f64(i as f64 / 2.0)),
    ]
}

proptest! {
    #[test]
    fn number_order_is_transitive(a in arb_number(), b in arb_number(), c in arb_number()) {
        if cmp(&a, &b).is_le() && cmp(&b, &c).is_le() {
            prop_assert!(cmp(&a, &c).is_le(), "{a} <= {b} <= {c}");
        }

        let mut sorted = [a, b, c];
        sorted.sort_by(|l, r| cmp(l, r));

        prop_assert_ne!(cmp(&sorted[0], &sorted[1]), Ordering::Greater);
        prop_assert_ne!(cmp(&sorted[1], &sorted[2]), Ordering::Greater);
        prop_assert_ne!(cmp(&sorted[0], &sorted[2]), Ordering::Greater);
    }

    #[test]
    fn from_slice_round_trips(json in arb_json()) {
        let bytes = encode(&json);
        let value = Value::from_slice(Slice::new(&bytes).unwrap());

        prop_assert_eq!(value.slice().as_bytes(), bytes.as_slice());
        prop_assert_eq!(decode(&value), json);
    }

    #[test]
    fn clones_are_equal_with_equal_hashes(json in arb_json()) {
        let value = owned(&json);
        let copy = value.clone();

        prop_assert_eq!(&value, &copy);
        prop_assert_eq!(value.fast_hash(), copy.fast_hash());
    }

    #[test]
    fn comparator_is_antisymmetric(left in arb_json(), right in arb_json()) {
        let (l, r) = (owned(&left), owned(&right));

        prop_assert_eq!(cmp(&l, &r), cmp(&r, &l).reverse());
        prop_assert_eq!(cmp(&l, &l), Ordering::Equal);
    }

    #[test]
    fn owned_copy_compares_equal_to_reference(json in arb_json()) {
        let bytes = encode(&json);
        let reference = Value::reference(Slice::new(&bytes).unwrap());

        prop_assert_eq!(cmp(&reference, &reference.to_owned_value()), Ordering::Equal);
    }

    #[test]
    fn range_elements_match_iteration(low in -1000i64..1000, len in 0i64..50) {
        let value = Value::from_range(low, low + len - 1);

        prop_assert_eq!(value.length(), usize::try_from(len).unwrap());
        for (i, expected) in (low..low + len).enumerate() {
            prop_assert_eq!(value.at(i64::try_from(i).unwrap()).to_i64(), expected);
        }
    }
}
