use floedb_core::{
    host::JsonHost,
    prelude::*,
};
use serde_json::json;
use std::collections::{HashMap, HashSet};

fn encode(value: &serde_json::Value) -> Vec<u8> {
    Builder::from_serialize(value)
        .expect("json value should encode")
        .finish()
        .expect("builder should be closed")
}

#[test]
fn documents_flow_through_blocks_sort_and_host() {
    let documents: Vec<Vec<u8>> = [
        json!({"name": "carol", "age": 41, "tags": ["ops"]}),
        json!({"name": "alice", "age": 29, "tags": ["dev", "ops"]}),
        json!({"name": "bob", "age": 35, "tags": []}),
    ]
    .iter()
    .map(encode)
    .collect();

    // scan: borrow every document into a block
    let mut block = RowBlock::new(documents.len(), 2);
    for (row, bytes) in documents.iter().enumerate() {
        let doc = Value::document(Slice::new(bytes).expect("valid document"));
        block.set_value(row, 1, doc.get("age").to_owned_value());
        block.set_value(row, 0, doc);
    }

    // sort rows by name
    let mut rows: Vec<usize> = (0..block.rows()).collect();
    rows.sort_by(|a, b| {
        Value::compare(
            &block.value(*a, 0).get("name"),
            &block.value(*b, 0).get("name"),
            StringOrder::Binary,
        )
    });
    let names: Vec<String> = rows
        .iter()
        .map(|row| block.value(*row, 0).get("name").to_string())
        .collect();
    assert_eq!(names, vec![r#""alice""#, r#""bob""#, r#""carol""#]);

    // collapse the age register into one owned array
    let ages = Value::from_blocks_register(std::slice::from_ref(&block), 1).unwrap();
    drop(block);
    assert_eq!(ages.to_host(&JsonHost), json!([41, 29, 35]));

    // project a single attribute for the host
    let doc = Value::reference(Slice::new(&documents[1]).unwrap());
    let wanted: HashSet<String> = ["tags".to_string()].into_iter().collect();
    assert_eq!(
        doc.to_host_partial(&JsonHost, &wanted),
        json!({"tags": ["dev", "ops"]})
    );
}

#[test]
fn values_group_in_hash_maps() {
    let mut counts: HashMap<Value<'static>, usize> = HashMap::new();
    for value in [
        Value::from_i64(1),
        Value::from_text("x"),
        Value::from_i64(1),
        Value::from_range(1, 2),
        Value::from_range(1, 2),
        Value::from_text("a longer key that lives outside the value"),
        Value::from_text("a longer key that lives outside the value"),
    ] {
        *counts.entry(value).or_default() += 1;
    }

    assert_eq!(counts.len(), 4);
    assert_eq!(counts[&Value::from_i64(1)], 2);
    assert_eq!(counts[&Value::from_range(1, 2)], 2);
    assert_eq!(
        counts[&Value::from_text("a longer key that lives outside the value")],
        2
    );
}

#[test]
fn ranges_expand_for_output() {
    let range = Value::from_range(-2, 2);

    let mut builder = Builder::new();
    builder.open_object().add_key("r");
    range.write_to(&mut builder);
    builder.close();

    let wrapped = Value::from_builder(&builder).unwrap();
    assert_eq!(wrapped.to_host(&JsonHost), json!({"r": [-2, -1, 0, 1, 2]}));
    assert_eq!(wrapped.get("r").length(), range.length());
}
