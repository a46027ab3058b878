use serde::de::DeserializeSeed;
use serde_json::json;
use variant_core::{BuildLimits, Container, Null, TreeSeed, Value};

type Scalars = (Null, bool, i64, f64, String);
type Json = Container<Scalars>;

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn nested_documents_serialize_in_insertion_order() {
    let mut c = Json::default();
    c["a"] = Json::new(1i64);
    c["b"] = Json::array([Json::new(true), Json::new(2.0), Json::new("x")]);
    assert_eq!(serde_json::to_string(&c).unwrap(), r#"{"a":1,"b":[true,2.0,"x"]}"#);
}

#[test]
fn flat_values_serialize_as_their_payload() {
    type Flat = Value<(Null, bool, u8, String)>;
    assert_eq!(serde_json::to_value(Flat::new(200u8)).unwrap(), json!(200));
    assert_eq!(serde_json::to_value(Flat::new("s")).unwrap(), json!("s"));
    assert_eq!(serde_json::to_value(Flat::default()).unwrap(), json!(null));
}

#[test]
fn empty_collections_serialize_as_empty() {
    assert_eq!(serde_json::to_string(&Json::array(None)).unwrap(), "[]");
    assert_eq!(serde_json::to_string(&Json::object(None)).unwrap(), "{}");
}

// ============================================================================
// Deserialization
// ============================================================================

#[test]
fn parsed_documents_match_built_ones() {
    let parsed: Json = serde_json::from_str(r#"{"a":1,"b":[true,2.0,"x"],"c":null}"#).unwrap();
    let mut built = Json::default();
    built["a"] = Json::new(1i64);
    built["b"] = Json::array([Json::new(true), Json::new(2.0), Json::new("x")]);
    built["c"] = Json::default();
    assert_eq!(parsed, built);
}

#[test]
fn json_integers_select_by_value() {
    let parsed: Json = serde_json::from_value(json!([5, -5, u64::MAX])).unwrap();
    assert!(parsed[0].is::<i64>());
    assert!(parsed[1].is::<i64>());
    assert!(parsed[2].is::<f64>());
}

#[test]
fn scalars_outside_the_set_are_rejected() {
    type Flags = Container<(Null, bool)>;
    let err = serde_json::from_str::<Flags>(r#"[true, "text"]"#).unwrap_err();
    assert!(err.to_string().contains("cannot construct"), "{err}");
}

#[test]
fn object_keys_keep_document_order() {
    let parsed: Json = serde_json::from_str(r#"{"z":1,"m":2,"a":3}"#).unwrap();
    let keys: Vec<&str> = parsed.get_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "m", "a"]);
}

#[test]
fn round_trip_through_text() {
    let text = r#"{"name":"svc","ports":[80,443],"ratio":0.25,"tags":{"env":"prod"},"off":false}"#;
    let parsed: Json = serde_json::from_str(text).unwrap();
    assert_eq!(serde_json::to_string(&parsed).unwrap(), text);
}

// ============================================================================
// Nesting limits
// ============================================================================

#[test]
fn seed_accepts_documents_within_the_limit() {
    let mut de = serde_json::Deserializer::from_str("[[1]]");
    let tree = TreeSeed::<Scalars>::new(BuildLimits::with_max_depth(2))
        .deserialize(&mut de)
        .unwrap();
    assert_eq!(tree.depth(), 2);
}

#[test]
fn seed_rejects_deeper_documents() {
    let mut de = serde_json::Deserializer::from_str(r#"{"a":{"b":{"c":1}}}"#);
    let err = TreeSeed::<Scalars>::new(BuildLimits::with_max_depth(2))
        .deserialize(&mut de)
        .unwrap_err();
    assert!(err.to_string().contains("limit 2"), "{err}");
}
