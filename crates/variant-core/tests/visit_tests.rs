use std::fmt::Debug;

use variant_core::{
    apply, apply_mut, apply_with, Array, Container, Handlers, Null, Object, Tree, Value, Visit, VisitMut, Visitor,
};

type Scalars = (Null, bool, i32, f64, String);
type Json = Container<Scalars>;

/// `{"z": 1, "b": [true, 2.0, "x"]}`, with keys out of sorted order.
fn document() -> Json {
    Json::object([
        ("z".to_owned(), Json::new(1)),
        (
            "b".to_owned(),
            Json::array([Json::new(true), Json::new(2.0), Json::new("x")]),
        ),
    ])
}

/// Records every node in pre-order, with its path from the root.
#[derive(Default)]
struct Trace {
    path: Vec<String>,
    events: Vec<String>,
}

impl Trace {
    fn here(&self) -> String {
        format!("/{}", self.path.join("/"))
    }

    fn leaf(&mut self, value: &dyn Debug) {
        let event = format!("{} = {value:?}", self.here());
        self.events.push(event);
    }
}

impl Visitor for Trace {
    type Output = ();
}

macro_rules! trace_leaf {
    ($($t:ty),*) => {$(
        impl Visit<$t> for Trace {
            fn visit(&mut self, value: &$t, _: ()) {
                self.leaf(value);
            }
        }
    )*};
}

trace_leaf!(Null, bool, i32, f64, String);

impl Visit<Array<Scalars>> for Trace {
    fn visit(&mut self, items: &Array<Scalars>, _: ()) {
        let event = format!("{} : array({})", self.here(), items.len());
        self.events.push(event);
        for (index, item) in items.iter().enumerate() {
            self.path.push(index.to_string());
            apply(item, self);
            self.path.pop();
        }
    }
}

impl Visit<Object<Scalars>> for Trace {
    fn visit(&mut self, entries: &Object<Scalars>, _: ()) {
        let event = format!("{} : object({})", self.here(), entries.len());
        self.events.push(event);
        for (key, item) in entries {
            self.path.push(key.clone());
            apply(item, self);
            self.path.pop();
        }
    }
}

// ============================================================================
// Recursive traversal
// ============================================================================

#[test]
fn recursive_visitors_walk_in_pre_order() {
    let doc = document();
    let mut trace = Trace::default();
    apply(&doc, &mut trace);
    assert_eq!(
        trace.events,
        [
            "/ : object(2)",
            "/z = 1",
            "/b : array(3)",
            "/b/0 = true",
            "/b/1 = 2.0",
            "/b/2 = \"x\"",
        ]
    );
    assert!(trace.path.is_empty());
}

#[test]
fn scalar_roots_visit_once() {
    let mut trace = Trace::default();
    Json::default().visit(&mut trace);
    assert_eq!(trace.events, ["/ = Null"]);
}

// ============================================================================
// Visitors with extra arguments
// ============================================================================

/// Hands back the level it was called with.
struct Level;

impl Visitor for Level {
    type Output = usize;
}

impl<T: 'static> Visit<T, usize> for Level {
    fn visit(&mut self, _: &T, level: usize) -> usize {
        level
    }
}

#[test]
fn extra_arguments_thread_through_dispatch() {
    type Flat = Value<Scalars>;
    assert_eq!(apply_with(&Flat::new("s"), &mut Level, 3), 3);
    assert_eq!(apply_with(&Flat::new(1), &mut Level, 0), 0);
}

/// Sums integers, scaling each by a caller-provided factor.
struct ScaledSum;

impl Visitor for ScaledSum {
    type Output = i64;
}

macro_rules! ignore_scaled {
    ($($t:ty),*) => {$(
        impl Visit<$t, i64> for ScaledSum {
            fn visit(&mut self, _: &$t, _: i64) -> i64 {
                0
            }
        }
    )*};
}

ignore_scaled!(Null, bool, f64, String);

impl Visit<i32, i64> for ScaledSum {
    fn visit(&mut self, n: &i32, factor: i64) -> i64 {
        i64::from(*n) * factor
    }
}

impl Visit<Array<Scalars>, i64> for ScaledSum {
    fn visit(&mut self, items: &Array<Scalars>, factor: i64) -> i64 {
        items.iter().map(|item| apply_with(item, self, factor)).sum()
    }
}

impl Visit<Object<Scalars>, i64> for ScaledSum {
    fn visit(&mut self, entries: &Object<Scalars>, factor: i64) -> i64 {
        entries.values().map(|item| apply_with(item, self, factor * 10)).sum()
    }
}

#[test]
fn recursive_visitors_forward_arguments() {
    let doc = Json::array([
        Json::new(1),
        Json::object([("k".to_owned(), Json::new(2))]),
        Json::new("skip"),
    ]);
    assert_eq!(apply_with(&doc, &mut ScaledSum, 1), 1 + 20);
    assert_eq!(apply_with(&doc, &mut ScaledSum, 2), 2 + 40);
}

// ============================================================================
// Mutable dispatch
// ============================================================================

/// Increments every integer in place and counts the edits.
struct Bump;

impl Visitor for Bump {
    type Output = usize;
}

macro_rules! bump_skip {
    ($($t:ty),*) => {$(
        impl VisitMut<$t> for Bump {
            fn visit_mut(&mut self, _: &mut $t, _: ()) -> usize {
                0
            }
        }
    )*};
}

bump_skip!(Null, bool, f64, String);

impl VisitMut<i32> for Bump {
    fn visit_mut(&mut self, n: &mut i32, _: ()) -> usize {
        *n += 1;
        1
    }
}

impl VisitMut<Array<Scalars>> for Bump {
    fn visit_mut(&mut self, items: &mut Array<Scalars>, _: ()) -> usize {
        items.iter_mut().map(|item| apply_mut(item, self)).sum()
    }
}

impl VisitMut<Object<Scalars>> for Bump {
    fn visit_mut(&mut self, entries: &mut Object<Scalars>, _: ()) -> usize {
        entries.values_mut().map(|item| apply_mut(item, self)).sum()
    }
}

#[test]
fn mutable_visitors_edit_whole_trees() {
    let mut doc = document();
    doc["b"].push(Json::new(41));
    assert_eq!(apply_mut(&mut doc, &mut Bump), 2);
    assert_eq!(doc["z"].get::<i32>(), Ok(&2));
    assert_eq!(doc["b"][3].get::<i32>(), Ok(&42));
    assert_eq!(doc["b"][1].get::<f64>(), Ok(&2.0));
}

#[test]
fn mutable_visitors_keep_the_discriminant() {
    let mut doc = Json::new(7);
    let before = doc.discriminant();
    doc.visit_mut(&mut Bump);
    assert_eq!(doc.discriminant(), before);
    assert_eq!(doc.get::<i32>(), Ok(&8));
}

// ============================================================================
// Handler tables
// ============================================================================

#[test]
fn handlers_cover_tree_alternatives() {
    let mut kind = Handlers::<Tree<Scalars>, &str>::new()
        .on(|_: &Array<Scalars>| "array")
        .on(|_: &Object<Scalars>| "object")
        .otherwise(|_| "scalar");
    let doc = document();
    assert_eq!(kind.apply(&doc), Some("object"));
    assert_eq!(kind.apply(&doc["b"]), Some("array"));
    assert_eq!(kind.apply(&doc["z"]), Some("scalar"));
}

#[test]
fn handlers_may_borrow_local_state() {
    let mut total = 0;
    {
        let mut sum = Handlers::<Scalars, ()>::new().on(|n: &i32| total += n);
        for n in [1, 2, 3] {
            sum.apply(&Value::new(n));
        }
        sum.apply(&Value::new("ignored"));
    }
    assert_eq!(total, 6);
}
