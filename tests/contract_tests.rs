//! Contract builder tests: route annotation, method lookup, and schema
//! pass-through.

use serde_json::{json, Value};
use wirepact::{contract, Method, ResponseContract, RouteDefinition, Schema};

fn schema(doc: Value) -> Schema {
    Schema::new(doc).unwrap()
}

fn definition() -> RouteDefinition {
    RouteDefinition::new(ResponseContract::success(schema(json!({"type": "object"}))))
}

#[test]
fn every_entry_is_annotated_with_path_and_method() {
    let built = contract(
        "/api/users/[id]",
        [
            (Method::Get, definition()),
            (Method::Put, definition()),
            (Method::Delete, definition()),
        ],
    );

    assert_eq!(built.path(), "/api/users/[id]");
    assert_eq!(built.len(), 3);
    for method in [Method::Get, Method::Put, Method::Delete] {
        let entry = built.get(method).unwrap();
        assert_eq!(entry.method, method);
        assert_eq!(entry.path, "/api/users/[id]");
    }
    assert!(built.get(Method::Post).is_none());
    assert!(built.get(Method::Patch).is_none());
}

#[test]
fn schemas_are_carried_through_unaltered() {
    let body_doc = json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "required": ["name"]
    });
    let built = contract(
        "/api/users",
        [(
            Method::Post,
            definition().with_body(schema(body_doc.clone())),
        )],
    );

    let entry = built.get(Method::Post).unwrap();
    let carried = entry.definition.body.as_ref().unwrap();
    assert_eq!(*carried.document(), body_doc);
    assert!(entry.definition.query.is_none());
    assert!(entry.definition.params.is_none());
    assert!(entry.definition.headers.is_none());
}

#[test]
fn duplicate_methods_keep_the_last_definition() {
    let first = definition();
    let second = definition().with_query(schema(json!({"type": "object"})));
    let built = contract("/api/dup", [(Method::Get, first), (Method::Get, second)]);

    assert_eq!(built.len(), 1);
    assert!(built.get(Method::Get).unwrap().definition.query.is_some());
}

#[test]
fn empty_contract_is_representable() {
    let built = contract("/api/nothing", []);
    assert!(built.is_empty());
    assert!(built.get(Method::Get).is_none());
}

#[test]
fn method_round_trips_through_str() {
    for (method, text) in [
        (Method::Get, "GET"),
        (Method::Post, "POST"),
        (Method::Put, "PUT"),
        (Method::Delete, "DELETE"),
        (Method::Patch, "PATCH"),
    ] {
        assert_eq!(method.as_str(), text);
        assert_eq!(text.parse::<Method>().unwrap(), method);
    }
    assert!("OPTIONS".parse::<Method>().is_err());
}
