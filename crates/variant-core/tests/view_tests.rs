use variant_core::{Container, Null, VariantError, View};

type Scalars = (Null, bool, i32, f64, String);
type Json = Container<Scalars>;

fn config() -> Json {
    let mut c = Json::default();
    c["server"]["host"] = Json::new("localhost");
    c["server"]["port"] = Json::new(8080);
    c["server"]["tls"] = Json::new(false);
    c["weights"] = Json::array([Json::new(0.5), Json::new(1.5)]);
    c
}

// ============================================================================
// Navigation never fails
// ============================================================================

#[test]
fn present_paths_read_their_payload() {
    let c = config();
    let server = c.view().at("server");
    assert_eq!(server.at("host").get_or(String::new()), "localhost");
    assert_eq!(server.at("port").get_or(0), 8080);
    assert!(!server.at("tls").get_or(true));
    assert_eq!(c.view().at("weights").at(1).get_or(0.0), 1.5);
}

#[test]
fn absent_paths_are_empty_at_any_depth() {
    let c = config();
    let view = c.view();
    for missing in [
        view.at("nope"),
        view.at("nope").at("deeper").at(0),
        view.at("weights").at(2),
        view.at("weights").at("key"),
        view.at("server").at(0),
        view.at("server").at("port").at("digits"),
    ] {
        assert!(missing.is_empty());
        assert_eq!(missing.len(), 0);
        assert!(missing.container().is_none());
    }
}

#[test]
fn views_do_not_modify_the_tree() {
    let c = config();
    let before = c.clone();
    let _ = c.view().at("a").at("b").at("c");
    assert_eq!(c, before);
    assert_eq!(c.len(), 2);
}

// ============================================================================
// Typed reads
// ============================================================================

#[test]
fn wrong_type_falls_back_like_absence() {
    let c = config();
    let port = c.view().at("server").at("port");
    assert_eq!(port.get_or(String::from("fallback")), "fallback");
    assert_eq!(port.get::<String>(), Ok(String::new()));
    assert_eq!(port.get::<i32>(), Ok(8080));
    assert_eq!(port.get_ref::<f64>(), None);
}

#[test]
fn missing_defaults_are_bad_access() {
    type Chars = Container<(Null, char)>;
    let c = Chars::default();
    assert_eq!(
        c.view().at(0).get::<char>(),
        Err(VariantError::BadViewAccess { requested: "char" })
    );
    assert_eq!(c.view().at(0).get_or('?'), '?');
}

#[test]
fn views_see_the_active_alternative() {
    let c = config();
    assert!(c.view().at("server").at("tls").is::<bool>());
    assert!(c.view().is::<variant_core::Object<Scalars>>());
    assert!(!View::<Scalars>::empty().is::<Null>());
    assert!(View::<Scalars>::default().is_empty());
}

// ============================================================================
// Iteration
// ============================================================================

#[test]
fn object_iteration_yields_keys_in_insertion_order() {
    let c = config();
    let entries: Vec<(String, bool)> = c
        .view()
        .at("server")
        .iter()
        .map(|child| (child.key().cloned().unwrap_or_default(), child.is::<String>()))
        .collect();
    assert_eq!(
        entries,
        [
            ("host".to_owned(), true),
            ("port".to_owned(), false),
            ("tls".to_owned(), false),
        ]
    );
}

#[test]
fn array_iteration_yields_elements() {
    let c = config();
    let weights = c.view().at("weights");
    assert_eq!(weights.iter().len(), 2);
    let total: f64 = weights.into_iter().map(|w| w.get_or(0.0)).sum();
    assert_eq!(total, 2.0);
}

#[test]
fn scalars_and_empty_views_iterate_nothing() {
    let c = config();
    assert_eq!(c.view().at("server").at("host").iter().count(), 0);
    assert_eq!(c.view().at("absent").into_iter().count(), 0);
}
